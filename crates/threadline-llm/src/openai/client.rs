// OpenAI-compatible chat completions client. Gemini is reached through the same
// wire format via its OpenAI-compatible endpoint.

use crate::traits::{ChatClient, ChatOptions, ChatRequest, ChatResponse, TokenUsage};
use crate::types::{Message, ToolCall};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use serde_json::{json, Map, Value};

pub const OPENAI_API_BASE: &str = "https://api.openai.com/v1";

/// Chat client speaking the `/chat/completions` protocol over plain HTTP
pub struct OpenAIClient {
    http_client: reqwest::Client,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        Self::with_base_url(api_key, OPENAI_API_BASE)
    }

    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .context("Invalid API key format")?,
        );

        let http_client = reqwest::Client::builder()
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn build_chat_request(&self, model: &str, messages: &[Message], options: &ChatOptions) -> Result<Value> {
        let wire_messages: Vec<Value> = messages
            .iter()
            .map(convert_message)
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .flatten()
            .collect();

        let mut request = Map::new();
        request.insert("model".to_string(), json!(model));
        request.insert("messages".to_string(), Value::Array(wire_messages));

        if let Some(temp) = options.temperature {
            request.insert("temperature".to_string(), json!(temp));
        }
        if let Some(max_tokens) = options.max_tokens {
            request.insert("max_tokens".to_string(), json!(max_tokens));
        }
        if !options.tools.is_empty() {
            request.insert("tools".to_string(), serde_json::to_value(&options.tools)?);
            if let Some(choice) = options.tool_choice {
                request.insert("tool_choice".to_string(), serde_json::to_value(choice)?);
            }
        }

        Ok(Value::Object(request))
    }
}

/// Convert one turn into wire messages. A tool turn fans out into one `tool`
/// message per response so every call id gets its own answer.
fn convert_message(message: &Message) -> Result<Vec<Value>> {
    let converted = match message {
        Message::System { content } => vec![json!({ "role": "system", "content": content })],
        Message::Human { content } => vec![json!({ "role": "user", "content": content })],
        Message::AI { content, tool_calls } => {
            let mut obj = Map::new();
            obj.insert("role".to_string(), json!("assistant"));
            obj.insert("content".to_string(), json!(content));
            if !tool_calls.is_empty() {
                obj.insert("tool_calls".to_string(), serde_json::to_value(tool_calls)?);
            }
            vec![Value::Object(obj)]
        }
        Message::Tool { responses } => responses
            .iter()
            .map(|r| {
                json!({
                    "role": "tool",
                    "tool_call_id": r.tool_call_id,
                    "name": r.name,
                    "content": r.content,
                })
            })
            .collect(),
    };
    Ok(converted)
}

#[async_trait]
impl ChatClient for OpenAIClient {
    async fn chat(&self, request: ChatRequest) -> Result<ChatResponse> {
        let payload = self.build_chat_request(&request.model, &request.messages, &request.options)?;

        tracing::debug!(
            model = %request.model,
            turns = request.messages.len(),
            tools = request.options.tools.len(),
            "Sending chat completion request"
        );

        let response = self
            .http_client
            .post(format!("{}/chat/completions", self.base_url))
            .json(&payload)
            .send()
            .await
            .context("Failed to send request")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            anyhow::bail!("Chat completion API error ({}): {}", status, error_text);
        }

        let raw: ChatCompletionResponse = response
            .json()
            .await
            .context("Failed to parse response")?;

        Ok(raw.into_chat_response())
    }
}

// ============================================================================
// WIRE RESPONSE TYPES
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    model: Option<String>,
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
    #[serde(default)]
    total_tokens: u32,
}

impl ChatCompletionResponse {
    fn into_chat_response(self) -> ChatResponse {
        let (content, tool_calls, finish_reason) = match self.choices.into_iter().next() {
            Some(choice) => (
                choice.message.content,
                choice.message.tool_calls.unwrap_or_default(),
                choice.finish_reason,
            ),
            None => (None, Vec::new(), None),
        };

        ChatResponse {
            content,
            tool_calls,
            usage: self.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
            response_id: self.id,
            model: self.model,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Tool, ToolChoice, ToolResponse};

    #[test]
    fn tool_turn_expands_into_one_wire_message_per_response() {
        let turn = Message::tool_results(vec![
            ToolResponse::new("call_1", "query_notion_database", "Task A (ID: 1)"),
            ToolResponse::new("call_2", "missing", "Error: Tool missing not found"),
        ]);

        let wire = convert_message(&turn).unwrap();
        assert_eq!(wire.len(), 2);
        assert_eq!(wire[0]["role"], "tool");
        assert_eq!(wire[0]["tool_call_id"], "call_1");
        assert_eq!(wire[1]["content"], "Error: Tool missing not found");
    }

    #[test]
    fn assistant_turn_keeps_tool_call_markers() {
        let call = ToolCall::new("call_1", "get_calendar", json!({"time_range": "today"}));
        let wire = convert_message(&Message::ai_with_tools(None, vec![call])).unwrap();

        assert_eq!(wire[0]["role"], "assistant");
        assert_eq!(wire[0]["tool_calls"][0]["function"]["name"], "get_calendar");
        assert!(wire[0]["content"].is_null());
    }

    #[test]
    fn request_payload_includes_tools_only_when_present() {
        let client = OpenAIClient::new("test-key").unwrap();
        let messages = vec![Message::system("be brief"), Message::human("hello")];

        let bare = client
            .build_chat_request("gpt-4o-mini", &messages, &ChatOptions::new())
            .unwrap();
        assert!(bare.get("tools").is_none());
        assert_eq!(bare["messages"].as_array().unwrap().len(), 2);

        let options = ChatOptions::new()
            .temperature(0.2)
            .tools(vec![Tool::new("get_calendar", "Read events", json!({"type": "object"}))])
            .tool_choice(ToolChoice::Auto);
        let full = client.build_chat_request("gpt-4o-mini", &messages, &options).unwrap();
        assert_eq!(full["tools"][0]["function"]["name"], "get_calendar");
        assert_eq!(full["tool_choice"], "auto");
    }

    #[test]
    fn wire_response_maps_to_chat_response() {
        let raw: ChatCompletionResponse = serde_json::from_value(json!({
            "id": "chatcmpl-1",
            "model": "gpt-4o-mini",
            "choices": [{
                "index": 0,
                "message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "get_calendar", "arguments": "{}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let response = raw.into_chat_response();
        assert!(response.has_tool_calls());
        assert_eq!(response.response_id.as_deref(), Some("chatcmpl-1"));
        assert_eq!(response.finish_reason.as_deref(), Some("tool_calls"));
        assert_eq!(response.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let client = OpenAIClient::with_base_url("k", "http://localhost:8080/v1/").unwrap();
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
    }
}
