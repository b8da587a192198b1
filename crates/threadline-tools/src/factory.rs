use chrono::FixedOffset;
use std::sync::Arc;

use crate::calendar::{CalendarSource, GetCalendarTool};
use crate::error::ToolError;
use crate::notion::{CreateNotionPageTool, QueryNotionDatabaseTool, TaskDatabase};
use crate::tool::ToolRegistry;

/// Tool sets enabled when nothing is configured
pub const DEFAULT_TOOL_SETS: &[&str] = &["notion"];

/// Builds a registry from named dependencies (`notion`, `calendar`)
pub struct ToolFactory {
    task_database: Option<Arc<dyn TaskDatabase>>,
    calendar: Option<Arc<dyn CalendarSource>>,
    default_offset: FixedOffset,
}

impl ToolFactory {
    pub fn new(default_offset: FixedOffset) -> Self {
        Self {
            task_database: None,
            calendar: None,
            default_offset,
        }
    }

    pub fn with_task_database(mut self, database: Arc<dyn TaskDatabase>) -> Self {
        self.task_database = Some(database);
        self
    }

    pub fn with_calendar(mut self, source: Arc<dyn CalendarSource>) -> Self {
        self.calendar = Some(source);
        self
    }

    pub fn create_default_tools(&self) -> Result<ToolRegistry, ToolError> {
        self.create_tools(DEFAULT_TOOL_SETS)
    }

    /// Unknown names are skipped with a warning; a known set whose backing
    /// client is missing is an error.
    pub fn create_tools<S: AsRef<str>>(&self, deps: &[S]) -> Result<ToolRegistry, ToolError> {
        let mut registry = ToolRegistry::new();

        for dep in deps {
            match dep.as_ref() {
                "notion" => {
                    let db = self
                        .task_database
                        .clone()
                        .ok_or_else(|| ToolError::NotConfigured("notion".to_string()))?;
                    registry.register(Arc::new(QueryNotionDatabaseTool::new(db.clone())));
                    registry.register(Arc::new(CreateNotionPageTool::new(db)));
                }
                "calendar" => {
                    let source = self
                        .calendar
                        .clone()
                        .ok_or_else(|| ToolError::NotConfigured("calendar".to_string()))?;
                    registry.register(Arc::new(GetCalendarTool::new(source, self.default_offset)));
                }
                other => tracing::warn!(tool_set = %other, "Ignoring unknown tool set"),
            }
        }

        tracing::debug!(tools = ?registry.names(), "Tool registry built");
        Ok(registry)
    }
}
