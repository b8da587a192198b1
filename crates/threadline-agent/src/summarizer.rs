use chrono::Utc;
use std::sync::Arc;
use threadline_llm::{ChatClient, ChatOptions, ChatRequest, Message as Turn};
use threadline_persist::{ChatStore, PersistError, ThreadMemory};

use crate::context::build_turns;
use crate::error::AgentError;

pub const DEFAULT_SUMMARIZATION_PROMPT: &str = "You maintain the long-term memory of a conversation between a user and an assistant.
Previous summary:
<previous_summary>

Merge the previous summary with the new messages that follow into one concise summary.
Keep names, dates, decisions, open tasks and user preferences. Drop small talk.
Write the summary in the language the user writes in.";

/// Folds messages after the thread watermark into the rolling summary.
pub struct MemoryCompactor {
    store: Arc<dyn ChatStore>,
    client: Arc<dyn ChatClient>,
    model: String,
    prompt: String,
}

impl MemoryCompactor {
    pub fn new(store: Arc<dyn ChatStore>, client: Arc<dyn ChatClient>, model: impl Into<String>) -> Self {
        Self {
            store,
            client,
            model: model.into(),
            prompt: DEFAULT_SUMMARIZATION_PROMPT.to_string(),
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    /// Returns `Ok(None)` when nothing new exists past the watermark. Otherwise
    /// stores and returns the new summary with the watermark moved to the
    /// newest folded message.
    pub async fn compact(&self, thread_id: &str) -> Result<Option<ThreadMemory>, AgentError> {
        let thread = self
            .store
            .get_thread(thread_id)
            .await
            .map_err(|source| AgentError::HistoryFetchFailed {
                thread_id: thread_id.to_string(),
                source,
            })?
            .ok_or_else(|| AgentError::Persist {
                stage: "load thread for compaction",
                source: PersistError::ThreadNotFound(thread_id.to_string()),
            })?;

        let fetched = match thread.memorized_until() {
            Some(watermark) => self.store.get_messages_after(thread_id, watermark).await,
            None => self.store.get_messages(thread_id).await,
        };
        let messages = fetched.map_err(|source| AgentError::HistoryFetchFailed {
            thread_id: thread_id.to_string(),
            source,
        })?;

        let Some(newest) = messages.iter().map(|m| m.created_at).max() else {
            tracing::debug!(thread_id = %thread_id, "Nothing to compact");
            return Ok(None);
        };
        let memorized_until = newest.min(Utc::now());

        let system = self
            .prompt
            .replace("<previous_summary>", thread.summary().unwrap_or("None"));
        let mut turns = build_turns(None, &messages, &system);
        turns.push(Turn::human("Write the updated summary now."));

        let request = ChatRequest::new(self.model.clone(), turns).with_options(ChatOptions::new().temperature(0.0));
        let response = self
            .client
            .chat(request)
            .await
            .map_err(|source| AgentError::ModelInvocationFailed { turn: 0, source })?;

        let summary = response
            .content
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AgentError::ModelInvocationFailed {
                turn: 0,
                source: anyhow::anyhow!("model returned no summary"),
            })?;

        self.store
            .update_memory(thread_id, summary.clone(), memorized_until)
            .await
            .map_err(|source| AgentError::Persist {
                stage: "update thread memory",
                source,
            })?;

        tracing::info!(
            thread_id = %thread_id,
            folded = messages.len(),
            memorized_until = %memorized_until.to_rfc3339(),
            "Thread memory compacted"
        );

        Ok(Some(ThreadMemory { summary, memorized_until }))
    }
}
