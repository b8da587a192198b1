use async_trait::async_trait;
use chrono::{FixedOffset, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::client::CalendarSource;
use super::range::{EventWindow, TimeRange};
use crate::error::ToolError;
use crate::tool::Tool;

#[derive(Debug, Default, Deserialize)]
struct CalendarInput {
    #[serde(default)]
    time_range: String,
    #[serde(default)]
    timezone: String,
}

/// Reads calendar events for a named time range
pub struct GetCalendarTool {
    source: Arc<dyn CalendarSource>,
    default_offset: FixedOffset,
}

impl GetCalendarTool {
    pub fn new(source: Arc<dyn CalendarSource>, default_offset: FixedOffset) -> Self {
        Self { source, default_offset }
    }
}

#[async_trait]
impl Tool for GetCalendarTool {
    fn name(&self) -> &str {
        "get_calendar"
    }

    fn description(&self) -> &str {
        "Retrieves calendar events for the specified time range"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "time_range": {
                    "type": "string",
                    "description": "Time range like 'today', 'this week', 'next week', 'next 7 days'"
                },
                "timezone": {
                    "type": "string",
                    "description": "Timezone like 'Asia/Tokyo' or '+09:00'"
                }
            }
        })
    }

    async fn call(&self, input: Value) -> Result<String, ToolError> {
        let input: CalendarInput = if input.is_null() {
            CalendarInput::default()
        } else {
            serde_json::from_value(input).map_err(|e| ToolError::invalid_input(e.to_string()))?
        };

        let window = EventWindow::new(
            TimeRange::parse(&input.time_range),
            &input.timezone,
            self.default_offset,
            Utc::now(),
        );
        let events = self.source.list_events(&window).await?;

        let offset = window.offset();
        Ok(events
            .iter()
            .map(|e| format!("{}\n", e.format_line(offset)))
            .collect())
    }
}
