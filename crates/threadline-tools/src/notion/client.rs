use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Map, Value};

use crate::error::ToolError;

pub const NOTION_API_BASE: &str = "https://api.notion.com/v1";
pub const NOTION_VERSION: &str = "2022-06-28";

#[derive(Debug, Clone, PartialEq)]
pub struct NotionPage {
    pub id: String,
    pub title: String,
    pub properties: Map<String, Value>,
}

/// Task database backing the Notion tools
#[async_trait]
pub trait TaskDatabase: Send + Sync {
    async fn query_database(&self, database_id: &str, filter: Option<Value>) -> Result<Vec<NotionPage>, ToolError>;

    /// Returns the id of the created page
    async fn create_page(&self, database_id: &str, properties: Value) -> Result<String, ToolError>;
}

pub struct NotionClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl NotionClient {
    pub fn new(token: &str) -> Result<Self, ToolError> {
        Self::with_base_url(token, NOTION_API_BASE)
    }

    pub fn with_base_url(token: &str, base_url: impl Into<String>) -> Result<Self, ToolError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert("Notion-Version", HeaderValue::from_static(NOTION_VERSION));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|_| ToolError::invalid_input("Notion token contains invalid characters"))?,
        );

        let http_client = reqwest::Client::builder().default_headers(headers).build()?;
        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, ToolError> {
        let response = self
            .http_client
            .post(format!("{}{}", self.base_url, path))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolError::Api {
                service: "Notion",
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    #[serde(default)]
    results: Vec<PageObject>,
}

#[derive(Debug, Deserialize)]
struct PageObject {
    id: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

/// Plain text of the page's `title`-typed property
pub(crate) fn extract_title(properties: &Map<String, Value>) -> String {
    properties
        .values()
        .find(|p| p.get("type").and_then(Value::as_str) == Some("title"))
        .and_then(|p| p.get("title"))
        .and_then(Value::as_array)
        .map(|parts| {
            parts
                .iter()
                .filter_map(|part| part.get("plain_text").and_then(Value::as_str))
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[async_trait]
impl TaskDatabase for NotionClient {
    async fn query_database(&self, database_id: &str, filter: Option<Value>) -> Result<Vec<NotionPage>, ToolError> {
        let mut body = Map::new();
        if let Some(filter) = filter.filter(|f| f.as_object().map_or(!f.is_null(), |o| !o.is_empty())) {
            body.insert("filter".to_string(), filter);
        }

        let raw = self
            .post(&format!("/databases/{}/query", database_id), Value::Object(body))
            .await?;
        let parsed: QueryResponse =
            serde_json::from_value(raw).map_err(|e| ToolError::UnexpectedResponse(e.to_string()))?;

        Ok(parsed
            .results
            .into_iter()
            .map(|page| NotionPage {
                title: extract_title(&page.properties),
                id: page.id,
                properties: page.properties,
            })
            .collect())
    }

    async fn create_page(&self, database_id: &str, properties: Value) -> Result<String, ToolError> {
        let body = json!({
            "parent": { "database_id": database_id },
            "properties": properties,
        });
        let raw = self.post("/pages", body).await?;
        raw.get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| ToolError::UnexpectedResponse("created page has no id".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_comes_from_title_typed_property() {
        let properties = json!({
            "Status": { "type": "select", "select": { "name": "Todo" } },
            "Task": {
                "type": "title",
                "title": [
                    { "plain_text": "Write " },
                    { "plain_text": "report" }
                ]
            }
        });
        assert_eq!(extract_title(properties.as_object().unwrap()), "Write report");
    }

    #[test]
    fn missing_title_is_empty() {
        let properties = json!({ "Done": { "type": "checkbox", "checkbox": true } });
        assert_eq!(extract_title(properties.as_object().unwrap()), "");
    }

    #[test]
    fn rejects_token_with_newline() {
        assert!(NotionClient::new("secret\nvalue").is_err());
    }
}
