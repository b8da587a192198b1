use serde::Serialize;
use std::sync::Arc;
use threadline_llm::{ChatClient, ChatResponse};
use threadline_persist::{
    AiMetadata, AiUsage, ChatStore, Message, MessageStatus, NewMessage, PersistError, Thread,
};
use threadline_tools::{ToolCallRecord, ToolRegistry};

use crate::config::AgentConfig;
use crate::context::build_turns;
use crate::error::AgentError;
use crate::pending::PendingMessageSelector;
use crate::turn::ModelTurn;

/// Result of one completed invocation
#[derive(Debug, Clone, Serialize)]
pub struct AgentOutcome {
    pub thread_id: String,
    pub trigger_message_id: String,
    pub reply_message_id: String,
    pub reply: String,
    pub model_calls: usize,
    /// The turn budget ran out and the fallback reply was saved
    pub budget_exhausted: bool,
    pub tool_calls: Vec<ToolCallRecord>,
}

/// Drives context building, model turns and tool dispatch for one thread,
/// and owns the trigger message's `unread -> generating -> completed | error`
/// transitions.
#[derive(Clone)]
pub struct AgentService {
    pub(crate) store: Arc<dyn ChatStore>,
    pub(crate) client: Arc<dyn ChatClient>,
    pub(crate) tools: Arc<ToolRegistry>,
    pub(crate) selector: Arc<dyn PendingMessageSelector>,
    pub(crate) config: Arc<AgentConfig>,
}

impl AgentService {
    pub fn builder() -> crate::builder::AgentServiceBuilder {
        crate::builder::AgentServiceBuilder::new()
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ChatStore> {
        &self.store
    }

    /// Answer the pending user message of `thread_id`.
    ///
    /// Saves at most one assistant message, and only on the completed path.
    pub async fn chat(&self, thread_id: &str) -> Result<AgentOutcome, AgentError> {
        tracing::info!(thread_id = %thread_id, "Agent turn started");

        let (thread, history) = self.load(thread_id).await?;

        let trigger = self
            .selector
            .select(&history)
            .ok_or_else(|| AgentError::NoPendingMessage {
                thread_id: thread_id.to_string(),
            })?
            .clone();

        let window = context_window(&thread, &history, &trigger.id);
        tracing::debug!(
            thread_id = %thread_id,
            message_id = %trigger.id,
            history = history.len(),
            window = window.len(),
            "Context assembled"
        );
        let mut transcript = build_turns(
            thread.summary(),
            &window,
            &self.config.system_prompt,
        );

        self.claim(thread_id, &trigger.id).await?;

        let model_turn = ModelTurn::new(self.client.clone(), &self.config, self.tools.definitions());
        let mut tool_calls = Vec::new();
        let mut model_calls = 0;
        let mut final_response: Option<ChatResponse> = None;

        for turn in 0..self.config.max_turns {
            model_calls += 1;
            tracing::debug!(thread_id = %thread_id, turn, "Generating");

            let response = match model_turn.invoke(&mut transcript).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!(thread_id = %thread_id, message_id = %trigger.id, turn, error = %e, "Model invocation failed");
                    self.mark_error(thread_id, &trigger.id).await;
                    return Err(AgentError::ModelInvocationFailed { turn, source: e });
                }
            };

            if !response.has_tool_calls() {
                final_response = Some(response);
                break;
            }

            tracing::info!(
                thread_id = %thread_id,
                turn,
                requested = response.tool_calls.len(),
                "Model requested tools"
            );
            let (tool_turn, records) = self.tools.dispatch(&response.tool_calls, turn).await;
            transcript.push(tool_turn);
            tool_calls.extend(records);
        }

        let budget_exhausted = final_response.is_none();
        let (reply, metadata) = match final_response {
            Some(response) => {
                let text = response.content.clone().unwrap_or_default();
                let reply = if text.trim().is_empty() {
                    tracing::warn!(thread_id = %thread_id, "Model returned an empty answer");
                    self.config.fallback_reply.clone()
                } else {
                    text
                };
                (reply, Some(ai_metadata(&response, &self.config.model)))
            }
            None => {
                tracing::warn!(
                    thread_id = %thread_id,
                    max_turns = self.config.max_turns,
                    "Turn budget exhausted without a final answer"
                );
                (self.config.fallback_reply.clone(), None)
            }
        };

        let mut new_message = NewMessage::assistant(thread_id, reply.clone());
        if let Some(metadata) = metadata {
            new_message = new_message.with_ai_metadata(metadata);
        }
        let reply_message_id = match self.store.save_message(new_message).await {
            Ok(id) => id,
            Err(source) => return Err(self.release(thread_id, &trigger.id, source).await),
        };

        if let Err(source) = self
            .store
            .update_message_status(thread_id, &trigger.id, MessageStatus::Completed)
            .await
        {
            tracing::error!(
                thread_id = %thread_id,
                message_id = %trigger.id,
                reply_id = %reply_message_id,
                error = %source,
                "Reply saved but trigger not marked completed"
            );
            return Err(AgentError::Unreconciled {
                message_id: trigger.id,
                stage: "mark trigger completed",
                source,
            });
        }

        tracing::info!(
            thread_id = %thread_id,
            message_id = %trigger.id,
            reply_id = %reply_message_id,
            model_calls,
            tool_calls = tool_calls.len(),
            budget_exhausted,
            "Agent turn completed"
        );

        Ok(AgentOutcome {
            thread_id: thread_id.to_string(),
            trigger_message_id: trigger.id,
            reply_message_id,
            reply,
            model_calls,
            budget_exhausted,
            tool_calls,
        })
    }

    async fn load(&self, thread_id: &str) -> Result<(Thread, Vec<Message>), AgentError> {
        let fetch_failed = |source| AgentError::HistoryFetchFailed {
            thread_id: thread_id.to_string(),
            source,
        };

        let thread = self
            .store
            .get_thread(thread_id)
            .await
            .map_err(fetch_failed)?
            .ok_or_else(|| fetch_failed(PersistError::ThreadNotFound(thread_id.to_string())))?;
        let history = self.store.get_messages(thread_id).await.map_err(fetch_failed)?;
        Ok((thread, history))
    }

    /// `unread -> generating`. Losing the race fails fast; any other store
    /// failure is logged and the loop proceeds.
    async fn claim(&self, thread_id: &str, message_id: &str) -> Result<(), AgentError> {
        match self
            .store
            .transition_status(thread_id, message_id, MessageStatus::Unread, MessageStatus::Generating)
            .await
        {
            Ok(()) => Ok(()),
            Err(PersistError::StatusConflict { actual, .. }) => {
                tracing::warn!(
                    thread_id = %thread_id,
                    message_id = %message_id,
                    status = ?actual,
                    "Trigger already claimed"
                );
                Err(AgentError::AlreadyClaimed {
                    message_id: message_id.to_string(),
                })
            }
            Err(e) => {
                tracing::warn!(
                    thread_id = %thread_id,
                    message_id = %message_id,
                    error = %e,
                    "Failed to mark message generating, continuing"
                );
                Ok(())
            }
        }
    }

    /// Put the trigger back to `unread` after the reply could not be saved.
    async fn release(&self, thread_id: &str, message_id: &str, source: PersistError) -> AgentError {
        tracing::error!(thread_id = %thread_id, message_id = %message_id, error = %source, "Failed to save reply");
        match self
            .store
            .transition_status(thread_id, message_id, MessageStatus::Generating, MessageStatus::Unread)
            .await
        {
            Ok(())
            | Err(PersistError::StatusConflict {
                actual: Some(MessageStatus::Unread),
                ..
            }) => AgentError::Persist {
                stage: "save reply",
                source,
            },
            Err(e) => {
                tracing::error!(
                    thread_id = %thread_id,
                    message_id = %message_id,
                    error = %e,
                    "Failed to release trigger, leaving it generating"
                );
                AgentError::Unreconciled {
                    message_id: message_id.to_string(),
                    stage: "save reply",
                    source,
                }
            }
        }
    }

    async fn mark_error(&self, thread_id: &str, message_id: &str) {
        if let Err(e) = self
            .store
            .update_message_status(thread_id, message_id, MessageStatus::Error)
            .await
        {
            tracing::error!(thread_id = %thread_id, message_id = %message_id, error = %e, "Failed to mark message as error");
        }
    }
}

/// Messages not yet folded into the thread summary. The trigger is always
/// kept, even when a summary already covers it.
fn context_window(thread: &Thread, history: &[Message], trigger_id: &str) -> Vec<Message> {
    match thread.memorized_until() {
        Some(watermark) => history
            .iter()
            .filter(|m| m.created_at > watermark || m.id == trigger_id)
            .cloned()
            .collect(),
        None => history.to_vec(),
    }
}

fn ai_metadata(response: &ChatResponse, configured_model: &str) -> AiMetadata {
    let usage = response.usage.unwrap_or_default();
    AiMetadata {
        model: response.model.clone().unwrap_or_else(|| configured_model.to_string()),
        usage: AiUsage {
            prompt_tokens: usage.prompt_tokens,
            completion_tokens: usage.completion_tokens,
            total_tokens: usage.total_tokens,
        },
        finish_reason: response.finish_reason.clone().unwrap_or_default(),
        response_id: response.response_id.clone().unwrap_or_default(),
    }
}
