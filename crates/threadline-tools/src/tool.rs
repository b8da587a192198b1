//! Tool trait and the ordered registry the agent loop dispatches through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use threadline_llm::{Message, ToolCall, ToolResponse};

use crate::error::ToolError;

/// A named callable the model may request. Input is a JSON object described
/// by `parameters`; output is plain text.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON Schema of the input object
    fn parameters(&self) -> Value;

    async fn call(&self, input: Value) -> Result<String, ToolError>;

    fn definition(&self) -> threadline_llm::Tool {
        threadline_llm::Tool::new(self.name(), self.description(), self.parameters())
    }
}

/// One executed tool request. Lives only for the duration of an agent turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCallRecord {
    pub name: String,
    pub input: Value,
    pub result: String,
    pub turn_index: usize,
}

/// Tools in registration order.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. A tool with the same name is replaced in place.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        match self.tools.iter().position(|t| t.name() == tool.name()) {
            Some(idx) => self.tools[idx] = tool,
            None => self.tools.push(tool),
        }
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        self.register(tool);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.iter().find(|t| t.name() == name)
    }

    pub fn definitions(&self) -> Vec<threadline_llm::Tool> {
        self.tools.iter().map(|t| t.definition()).collect()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute every request of one model turn and batch the results into a
    /// single tool turn. Never fails: unknown tools, bad arguments and tool
    /// errors become `Error: ..` result text for the model to read.
    pub async fn dispatch(&self, calls: &[ToolCall], turn_index: usize) -> (Message, Vec<ToolCallRecord>) {
        let mut responses = Vec::with_capacity(calls.len());
        let mut records = Vec::with_capacity(calls.len());

        for call in calls {
            let name = call.name();
            let input = call.arguments_value().unwrap_or_else(|_| Value::String(call.function.arguments.clone()));

            let result = match self.get(name) {
                None => {
                    tracing::warn!(tool = %name, turn = turn_index, "Model requested unknown tool");
                    format!("Error: Tool {} not found", name)
                }
                Some(tool) => match call.arguments_value() {
                    Err(e) => {
                        tracing::warn!(tool = %name, turn = turn_index, error = %e, "Tool arguments are not valid JSON");
                        format!("Error: invalid arguments: {}", e)
                    }
                    Ok(args) => match tool.call(args).await {
                        Ok(output) => {
                            tracing::debug!(tool = %name, turn = turn_index, bytes = output.len(), "Tool call succeeded");
                            output
                        }
                        Err(e) => {
                            tracing::warn!(tool = %name, turn = turn_index, error = %e, "Tool call failed");
                            format!("Error: {}", e)
                        }
                    },
                },
            };

            responses.push(ToolResponse::new(call.id.clone(), name, result.clone()));
            records.push(ToolCallRecord {
                name: name.to_string(),
                input,
                result,
                turn_index,
            });
        }

        (Message::tool_results(responses), records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str { "echo" }
        fn description(&self) -> &str { "Echoes back the input" }
        fn parameters(&self) -> Value {
            json!({
                "type": "object",
                "properties": { "text": { "type": "string" } },
                "required": ["text"]
            })
        }
        async fn call(&self, input: Value) -> Result<String, ToolError> {
            input["text"]
                .as_str()
                .map(str::to_string)
                .ok_or_else(|| ToolError::invalid_input("text is required"))
        }
    }

    struct NamedTool(&'static str, &'static str);

    #[async_trait]
    impl Tool for NamedTool {
        fn name(&self) -> &str { self.0 }
        fn description(&self) -> &str { self.1 }
        fn parameters(&self) -> Value { json!({"type": "object"}) }
        async fn call(&self, _input: Value) -> Result<String, ToolError> {
            Ok(self.1.to_string())
        }
    }

    fn responses(turn: &Message) -> &[ToolResponse] {
        match turn {
            Message::Tool { responses } => responses,
            other => panic!("expected tool turn, got {:?}", other),
        }
    }

    #[test]
    fn registry_keeps_registration_order_and_replaces_in_place() {
        let registry = ToolRegistry::new()
            .with_tool(Arc::new(NamedTool("b", "first b")))
            .with_tool(Arc::new(NamedTool("a", "a")))
            .with_tool(Arc::new(NamedTool("b", "second b")));

        assert_eq!(registry.names(), vec!["b", "a"]);
        assert_eq!(registry.definitions()[0].function.description.as_deref(), Some("second b"));
    }

    #[tokio::test]
    async fn dispatch_batches_results_into_one_turn() {
        let registry = ToolRegistry::new().with_tool(Arc::new(EchoTool));
        let calls = vec![
            ToolCall::new("call_1", "echo", json!({"text": "one"})),
            ToolCall::new("call_2", "echo", json!({"text": "two"})),
        ];

        let (turn, records) = registry.dispatch(&calls, 0).await;
        let responses = responses(&turn);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].tool_call_id, "call_1");
        assert_eq!(responses[1].content, "two");
        assert_eq!(records[1].input, json!({"text": "two"}));
    }

    #[tokio::test]
    async fn unknown_tool_becomes_error_text() {
        let registry = ToolRegistry::new();
        let (turn, records) = registry
            .dispatch(&[ToolCall::new("call_1", "teleport", json!({}))], 2)
            .await;

        assert_eq!(responses(&turn)[0].content, "Error: Tool teleport not found");
        assert_eq!(records[0].turn_index, 2);
    }

    #[tokio::test]
    async fn tool_failure_embeds_reason() {
        let registry = ToolRegistry::new().with_tool(Arc::new(EchoTool));
        let (turn, _) = registry
            .dispatch(&[ToolCall::new("call_1", "echo", json!({}))], 0)
            .await;

        assert_eq!(responses(&turn)[0].content, "Error: invalid input: text is required");
    }

    #[tokio::test]
    async fn malformed_arguments_do_not_abort_dispatch() {
        let registry = ToolRegistry::new().with_tool(Arc::new(EchoTool));
        let mut bad = ToolCall::new("call_1", "echo", json!({}));
        bad.function.arguments = "{oops".into();
        let good = ToolCall::new("call_2", "echo", json!({"text": "ok"}));

        let (turn, records) = registry.dispatch(&[bad, good], 0).await;
        let responses = responses(&turn);
        assert!(responses[0].content.starts_with("Error: invalid arguments"));
        assert_eq!(responses[1].content, "ok");
        assert_eq!(records[0].input, Value::String("{oops".into()));
    }
}
