//! In-memory store, used by tests and local runs without a database.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::{PersistError, Result};
use crate::ids::{new_message_id, new_thread_id};
use crate::models::{
    validate_watermark, Message, MessageRole, MessageStatus, NewMessage, NewThread, Thread,
    ThreadMemory,
};
use crate::store::ChatStore;

/// Store operations, used for call logging and failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOp {
    GetThread,
    CreateThread,
    GetMessages,
    GetMessagesAfter,
    SaveMessage,
    UpdateStatus,
    TransitionStatus,
    UpdateMemory,
}

#[derive(Default)]
struct State {
    threads: HashMap<String, Thread>,
    messages: HashMap<String, Vec<Message>>,
}

#[derive(Clone, Default)]
pub struct InMemoryChatStore {
    state: Arc<RwLock<State>>,
    failures: Arc<RwLock<HashSet<StoreOp>>>,
    calls: Arc<RwLock<Vec<StoreOp>>>,
}

impl InMemoryChatStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every later call of `op` fail with a connection error
    pub async fn fail_on(&self, op: StoreOp) {
        self.failures.write().await.insert(op);
    }

    pub async fn clear_failures(&self) {
        self.failures.write().await.clear();
    }

    /// Every operation attempted so far, in call order
    pub async fn calls(&self) -> Vec<StoreOp> {
        self.calls.read().await.clone()
    }

    pub async fn call_count(&self, op: StoreOp) -> usize {
        self.calls.read().await.iter().filter(|c| **c == op).count()
    }

    /// Insert a fully-formed message, bypassing id generation
    pub async fn insert_message(&self, message: Message) {
        let mut state = self.state.write().await;
        state
            .messages
            .entry(message.thread_id.clone())
            .or_default()
            .push(message);
    }

    async fn enter(&self, op: StoreOp) -> Result<()> {
        self.calls.write().await.push(op);
        if self.failures.read().await.contains(&op) {
            return Err(PersistError::Connection(format!("injected {:?} failure", op)));
        }
        Ok(())
    }
}

fn find_message<'a>(
    state: &'a mut State,
    thread_id: &str,
    message_id: &str,
) -> Result<&'a mut Message> {
    state
        .messages
        .get_mut(thread_id)
        .and_then(|msgs| msgs.iter_mut().find(|m| m.id == message_id))
        .ok_or_else(|| PersistError::MessageNotFound(message_id.to_string()))
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        self.enter(StoreOp::GetThread).await?;
        Ok(self.state.read().await.threads.get(thread_id).cloned())
    }

    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
        self.enter(StoreOp::CreateThread).await?;
        let now = Utc::now();
        let created = Thread {
            id: thread.id.unwrap_or_else(new_thread_id),
            user_id: thread.user_id,
            first_message: String::new(),
            reply_count: 0,
            is_private: thread.is_private,
            is_archived: false,
            memory: None,
            created_at: now,
            updated_at: now,
        };
        let mut state = self.state.write().await;
        if state.threads.contains_key(&created.id) {
            return Err(PersistError::Internal(format!("thread {} already exists", created.id)));
        }
        state.threads.insert(created.id.clone(), created.clone());
        Ok(created)
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        self.enter(StoreOp::GetMessages).await?;
        Ok(self
            .state
            .read()
            .await
            .messages
            .get(thread_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn get_messages_after(&self, thread_id: &str, after: DateTime<Utc>) -> Result<Vec<Message>> {
        self.enter(StoreOp::GetMessagesAfter).await?;
        let state = self.state.read().await;
        let mut messages: Vec<Message> = state
            .messages
            .get(thread_id)
            .map(|msgs| msgs.iter().filter(|m| m.created_at > after).cloned().collect())
            .unwrap_or_default();
        messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(messages)
    }

    async fn save_message(&self, message: NewMessage) -> Result<String> {
        self.enter(StoreOp::SaveMessage).await?;
        let mut state = self.state.write().await;
        let thread = state
            .threads
            .get_mut(&message.thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(message.thread_id.clone()))?;

        match message.role {
            MessageRole::User if thread.first_message.is_empty() => {
                thread.first_message = message.content.clone();
            }
            MessageRole::Assistant => thread.reply_count += 1,
            _ => {}
        }
        thread.updated_at = Utc::now();

        let id = new_message_id();
        let stored = message.into_message(id.clone());
        state
            .messages
            .entry(stored.thread_id.clone())
            .or_default()
            .push(stored);
        Ok(id)
    }

    async fn update_message_status(
        &self,
        thread_id: &str,
        message_id: &str,
        status: MessageStatus,
    ) -> Result<()> {
        self.enter(StoreOp::UpdateStatus).await?;
        let mut state = self.state.write().await;
        find_message(&mut state, thread_id, message_id)?.status = Some(status);
        Ok(())
    }

    async fn transition_status(
        &self,
        thread_id: &str,
        message_id: &str,
        from: MessageStatus,
        to: MessageStatus,
    ) -> Result<()> {
        self.enter(StoreOp::TransitionStatus).await?;
        let mut state = self.state.write().await;
        let message = find_message(&mut state, thread_id, message_id)?;
        if message.status != Some(from) {
            return Err(PersistError::StatusConflict {
                message_id: message_id.to_string(),
                expected: from,
                actual: message.status,
            });
        }
        message.status = Some(to);
        Ok(())
    }

    async fn update_memory(
        &self,
        thread_id: &str,
        summary: String,
        memorized_until: DateTime<Utc>,
    ) -> Result<()> {
        self.enter(StoreOp::UpdateMemory).await?;
        let mut state = self.state.write().await;
        let thread = state
            .threads
            .get_mut(thread_id)
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?;
        let now = Utc::now();
        validate_watermark(thread.memorized_until(), memorized_until, now)?;
        thread.memory = Some(ThreadMemory { summary, memorized_until });
        thread.updated_at = now;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    async fn store_with_thread() -> (InMemoryChatStore, String) {
        let store = InMemoryChatStore::new();
        let thread = store.create_thread(NewThread::new("user-1")).await.unwrap();
        (store, thread.id)
    }

    #[tokio::test]
    async fn save_assigns_ids_in_creation_order() {
        let (store, thread_id) = store_with_thread().await;
        let first = store.save_message(NewMessage::user(&thread_id, "hello")).await.unwrap();
        let second = store.save_message(NewMessage::assistant(&thread_id, "hi")).await.unwrap();
        assert!(first < second);

        let messages = store.get_messages(&thread_id).await.unwrap();
        assert_eq!(messages.iter().map(|m| m.id.clone()).collect::<Vec<_>>(), vec![first, second]);

        let thread = store.get_thread(&thread_id).await.unwrap().unwrap();
        assert_eq!(thread.first_message, "hello");
        assert_eq!(thread.reply_count, 1);
    }

    #[tokio::test]
    async fn save_into_missing_thread_fails() {
        let store = InMemoryChatStore::new();
        let err = store.save_message(NewMessage::user("nope", "hi")).await.unwrap_err();
        assert!(matches!(err, PersistError::ThreadNotFound(_)));
    }

    #[tokio::test]
    async fn transition_is_compare_and_swap() {
        let (store, thread_id) = store_with_thread().await;
        let id = store.save_message(NewMessage::user(&thread_id, "hello")).await.unwrap();

        store
            .transition_status(&thread_id, &id, MessageStatus::Unread, MessageStatus::Generating)
            .await
            .unwrap();

        let err = store
            .transition_status(&thread_id, &id, MessageStatus::Unread, MessageStatus::Generating)
            .await
            .unwrap_err();
        match err {
            PersistError::StatusConflict { actual, .. } => {
                assert_eq!(actual, Some(MessageStatus::Generating))
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn messages_after_watermark_are_strictly_newer() {
        let (store, thread_id) = store_with_thread().await;
        let base = Utc::now() - Duration::hours(1);
        for (i, text) in ["a", "b", "c"].iter().enumerate() {
            store
                .save_message(
                    NewMessage::user(&thread_id, *text).with_created_at(base + Duration::minutes(i as i64)),
                )
                .await
                .unwrap();
        }

        let after = store
            .get_messages_after(&thread_id, base + Duration::minutes(1))
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
        assert_eq!(after[0].content, "c");
    }

    #[tokio::test]
    async fn memory_watermark_is_monotonic() {
        let (store, thread_id) = store_with_thread().await;
        let now = Utc::now();

        store.update_memory(&thread_id, "s1".into(), now).await.unwrap();
        let err = store
            .update_memory(&thread_id, "s0".into(), now - Duration::seconds(10))
            .await
            .unwrap_err();
        assert!(matches!(err, PersistError::InvalidWatermark(_)));

        let thread = store.get_thread(&thread_id).await.unwrap().unwrap();
        assert_eq!(thread.summary(), Some("s1"));
    }

    #[tokio::test]
    async fn injected_failures_are_logged_and_returned() {
        let (store, thread_id) = store_with_thread().await;
        store.fail_on(StoreOp::GetMessages).await;

        assert!(store.get_messages(&thread_id).await.is_err());
        assert_eq!(store.call_count(StoreOp::GetMessages).await, 1);

        store.clear_failures().await;
        assert!(store.get_messages(&thread_id).await.is_ok());
    }
}
