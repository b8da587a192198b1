#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use threadline_agent::{AgentConfig, AgentService};
use threadline_llm::{ChatClient, ChatRequest, ChatResponse, ToolCall};
use threadline_persist::{ChatStore, InMemoryChatStore, Message, MessageStatus, NewMessage, NewThread};
use threadline_tools::{Tool, ToolError, ToolRegistry};

/// Model stub replaying a fixed list of answers and recording every request
#[derive(Default)]
pub struct ScriptedClient {
    script: Mutex<VecDeque<Result<ChatResponse, String>>>,
    requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedClient {
    pub fn new(script: Vec<Result<ChatResponse, String>>) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            requests: Mutex::new(Vec::new()),
        })
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn request(&self, idx: usize) -> ChatRequest {
        self.requests.lock().unwrap()[idx].clone()
    }
}

#[async_trait]
impl ChatClient for ScriptedClient {
    async fn chat(&self, request: ChatRequest) -> anyhow::Result<ChatResponse> {
        self.requests.lock().unwrap().push(request);
        match self.script.lock().unwrap().pop_front() {
            Some(Ok(response)) => Ok(response),
            Some(Err(reason)) => Err(anyhow::anyhow!(reason)),
            None => Err(anyhow::anyhow!("script exhausted")),
        }
    }
}

pub fn tool_request(id: &str, name: &str, args: Value) -> Result<ChatResponse, String> {
    Ok(ChatResponse::with_tool_calls(vec![ToolCall::new(id, name, args)]))
}

pub fn answer(text: &str) -> Result<ChatResponse, String> {
    Ok(ChatResponse::text(text))
}

pub struct EchoTool;

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> &str {
        "Echoes the text argument"
    }

    fn parameters(&self) -> Value {
        json!({"type": "object", "properties": {"text": {"type": "string"}}})
    }

    async fn call(&self, input: Value) -> Result<String, ToolError> {
        Ok(input["text"].as_str().unwrap_or_default().to_string())
    }
}

pub fn registry() -> ToolRegistry {
    ToolRegistry::new().with_tool(Arc::new(EchoTool))
}

pub async fn thread(store: &InMemoryChatStore, id: &str) -> String {
    store
        .create_thread(NewThread::new("user-1").with_id(id))
        .await
        .unwrap()
        .id
}

pub async fn user_message(store: &InMemoryChatStore, thread_id: &str, content: &str) -> String {
    store.save_message(NewMessage::user(thread_id, content)).await.unwrap()
}

pub async fn user_message_at(
    store: &InMemoryChatStore,
    thread_id: &str,
    content: &str,
    status: MessageStatus,
    at: DateTime<Utc>,
) -> String {
    store
        .save_message(
            NewMessage::user(thread_id, content)
                .with_status(status)
                .with_created_at(at),
        )
        .await
        .unwrap()
}

pub async fn assistant_message(store: &InMemoryChatStore, thread_id: &str, content: &str) -> String {
    store.save_message(NewMessage::assistant(thread_id, content)).await.unwrap()
}

pub fn service(store: &InMemoryChatStore, client: Arc<ScriptedClient>, config: AgentConfig) -> AgentService {
    AgentService::builder()
        .store(Arc::new(store.clone()))
        .client(client)
        .tools(registry())
        .config(config)
        .build()
        .unwrap()
}

pub async fn messages(store: &InMemoryChatStore, thread_id: &str) -> Vec<Message> {
    store.get_messages(thread_id).await.unwrap()
}

pub async fn status_of(store: &InMemoryChatStore, thread_id: &str, message_id: &str) -> Option<MessageStatus> {
    messages(store, thread_id)
        .await
        .into_iter()
        .find(|m| m.id == message_id)
        .and_then(|m| m.status)
}
