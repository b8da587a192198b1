use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;

use super::client::{NotionPage, TaskDatabase};
use crate::error::ToolError;
use crate::tool::Tool;

#[derive(Debug, Deserialize)]
struct QueryInput {
    database_id: String,
    #[serde(default)]
    filter: Option<Value>,
}

#[derive(Debug, Deserialize)]
struct CreateInput {
    database_id: String,
    properties: Value,
}

fn parse<T: serde::de::DeserializeOwned>(input: Value) -> Result<T, ToolError> {
    serde_json::from_value(input).map_err(|e| ToolError::invalid_input(e.to_string()))
}

fn format_pages(pages: &[NotionPage]) -> String {
    pages
        .iter()
        .map(|p| format!("{} (ID: {})\n", p.title, p.id))
        .collect()
}

/// Lists pages of a Notion database matching an optional filter
pub struct QueryNotionDatabaseTool {
    database: Arc<dyn TaskDatabase>,
}

impl QueryNotionDatabaseTool {
    pub fn new(database: Arc<dyn TaskDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Tool for QueryNotionDatabaseTool {
    fn name(&self) -> &str {
        "query_notion_database"
    }

    fn description(&self) -> &str {
        "Queries a Notion database and returns the pages matching the filter"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "database_id": { "type": "string", "description": "Notion database ID" },
                "filter": { "type": "object", "description": "Notion query filter object" }
            },
            "required": ["database_id"]
        })
    }

    async fn call(&self, input: Value) -> Result<String, ToolError> {
        let input: QueryInput = parse(input)?;
        let pages = self.database.query_database(&input.database_id, input.filter).await?;
        Ok(format_pages(&pages))
    }
}

/// Creates a page (task entry) in a Notion database
pub struct CreateNotionPageTool {
    database: Arc<dyn TaskDatabase>,
}

impl CreateNotionPageTool {
    pub fn new(database: Arc<dyn TaskDatabase>) -> Self {
        Self { database }
    }
}

#[async_trait]
impl Tool for CreateNotionPageTool {
    fn name(&self) -> &str {
        "create_notion_page"
    }

    fn description(&self) -> &str {
        "Creates a new page in a Notion database"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "database_id": { "type": "string", "description": "Notion database ID" },
                "properties": { "type": "object", "description": "Page properties in Notion format" }
            },
            "required": ["database_id", "properties"]
        })
    }

    async fn call(&self, input: Value) -> Result<String, ToolError> {
        let input: CreateInput = parse(input)?;
        if !input.properties.is_object() {
            return Err(ToolError::invalid_input("properties must be an object"));
        }
        let page_id = self.database.create_page(&input.database_id, input.properties).await?;
        Ok(format!("Page created with ID: {}", page_id))
    }
}
