use std::sync::Arc;
use threadline_llm::{ChatClient, ChatOptions, ChatRequest, ChatResponse, Message, Tool, ToolChoice};

use crate::config::AgentConfig;

/// One model invocation over the running transcript.
pub struct ModelTurn {
    client: Arc<dyn ChatClient>,
    model: String,
    options: ChatOptions,
}

impl ModelTurn {
    pub fn new(client: Arc<dyn ChatClient>, config: &AgentConfig, tools: Vec<Tool>) -> Self {
        let mut options = ChatOptions::new();
        if !tools.is_empty() {
            options = options.tools(tools).tool_choice(ToolChoice::Auto);
        }
        if let Some(temp) = config.temperature {
            options = options.temperature(temp);
        }
        if let Some(max_tokens) = config.max_tokens {
            options = options.max_tokens(max_tokens);
        }

        Self {
            client,
            model: config.model.clone(),
            options,
        }
    }

    /// Invoke the model once. On success the model's own turn, tool request
    /// markers included, is appended to `transcript` before returning.
    pub async fn invoke(&self, transcript: &mut Vec<Message>) -> anyhow::Result<ChatResponse> {
        let request = ChatRequest::new(self.model.clone(), transcript.clone()).with_options(self.options.clone());
        let response = self.client.chat(request).await?;
        transcript.push(response.to_message());
        Ok(response)
    }
}
