use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Message, MessageStatus, NewMessage, NewThread, Thread};

/// Storage for threads and their ordered messages.
///
/// Implementations provide database-specific operations; the agent only
/// depends on this trait.
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// `Ok(None)` when the thread does not exist
    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>>;

    async fn create_thread(&self, thread: NewThread) -> Result<Thread>;

    /// All messages of a thread, oldest first
    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>>;

    /// Messages created strictly after `after`, oldest first
    async fn get_messages_after(&self, thread_id: &str, after: DateTime<Utc>) -> Result<Vec<Message>>;

    /// Store a message and return its generated, time-sortable id
    async fn save_message(&self, message: NewMessage) -> Result<String>;

    /// Unconditional status write
    async fn update_message_status(
        &self,
        thread_id: &str,
        message_id: &str,
        status: MessageStatus,
    ) -> Result<()>;

    /// Atomic `from -> to` transition. Fails with `PersistError::StatusConflict`
    /// when the stored status is not `from`.
    async fn transition_status(
        &self,
        thread_id: &str,
        message_id: &str,
        from: MessageStatus,
        to: MessageStatus,
    ) -> Result<()>;

    /// Replace the thread summary and advance its watermark.
    /// Fails with `PersistError::InvalidWatermark` if the watermark would move
    /// backwards or past the current time.
    async fn update_memory(
        &self,
        thread_id: &str,
        summary: String,
        memorized_until: DateTime<Utc>,
    ) -> Result<()>;

    /// Cheap reachability probe
    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
