use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{bson::doc, Client};

use crate::dbs::mongo::models::{MongoMessage, MongoThread};
use crate::dbs::mongo::repositories::{MongoMessageRepository, MongoThreadRepository};
use crate::error::{PersistError, Result};
use crate::ids::{new_message_id, new_thread_id};
use crate::models::{validate_watermark, Message, MessageStatus, NewMessage, NewThread, Thread};
use crate::store::ChatStore;

/// `ChatStore` backed by the `threads` and `messages` collections
pub struct MongoChatStore {
    client: Client,
    database: String,
    message_repo: MongoMessageRepository,
    thread_repo: MongoThreadRepository,
}

impl MongoChatStore {
    pub async fn connect(mongodb_uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(mongodb_uri)
            .await
            .map_err(|e| PersistError::Connection(e.to_string()))?;

        let store = Self {
            message_repo: MongoMessageRepository::new(&client, database),
            thread_repo: MongoThreadRepository::new(&client, database),
            database: database.to_string(),
            client,
        };
        store.message_repo.ensure_indexes().await?;

        tracing::info!(database = %database, "Connected to MongoDB");
        Ok(store)
    }
}

#[async_trait]
impl ChatStore for MongoChatStore {
    async fn get_thread(&self, thread_id: &str) -> Result<Option<Thread>> {
        Ok(self.thread_repo.get(thread_id).await?.map(Into::into))
    }

    async fn create_thread(&self, thread: NewThread) -> Result<Thread> {
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
        self.thread_repo.insert(&MongoThread::from(created.clone())).await?;
        Ok(created)
    }

    async fn get_messages(&self, thread_id: &str) -> Result<Vec<Message>> {
        let messages = self.message_repo.list(thread_id).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn get_messages_after(&self, thread_id: &str, after: DateTime<Utc>) -> Result<Vec<Message>> {
        let messages = self.message_repo.list_after(thread_id, after).await?;
        Ok(messages.into_iter().map(Into::into).collect())
    }

    async fn save_message(&self, message: NewMessage) -> Result<String> {
        let id = new_message_id();
        let stored = message.into_message(id.clone());
        let (thread_id, role, content) = (stored.thread_id.clone(), stored.role, stored.content.clone());

        if !self.thread_repo.exists(&thread_id).await? {
            return Err(PersistError::ThreadNotFound(thread_id));
        }
        self.message_repo.insert(&MongoMessage::from(stored)).await?;

        // The message is already stored, so counter drift is only logged
        if let Err(e) = self.thread_repo.record_message(&thread_id, role, &content).await {
            tracing::warn!(thread_id = %thread_id, message_id = %id, error = %e, "Failed to update thread after save");
        }
        Ok(id)
    }

    async fn update_message_status(
        &self,
        thread_id: &str,
        message_id: &str,
        status: MessageStatus,
    ) -> Result<()> {
        self.message_repo.set_status(thread_id, message_id, status).await
    }

    async fn transition_status(
        &self,
        thread_id: &str,
        message_id: &str,
        from: MessageStatus,
        to: MessageStatus,
    ) -> Result<()> {
        self.message_repo
            .compare_and_set_status(thread_id, message_id, from, to)
            .await
    }

    async fn update_memory(
        &self,
        thread_id: &str,
        summary: String,
        memorized_until: DateTime<Utc>,
    ) -> Result<()> {
        validate_watermark(None, memorized_until, Utc::now())?;
        if self.thread_repo.set_memory(thread_id, &summary, memorized_until).await? {
            return Ok(());
        }

        let thread: Thread = self
            .thread_repo
            .get(thread_id)
            .await?
            .ok_or_else(|| PersistError::ThreadNotFound(thread_id.to_string()))?
            .into();
        validate_watermark(thread.memorized_until(), memorized_until, Utc::now())?;
        Err(PersistError::InvalidWatermark(format!(
            "watermark of thread {} changed during the update",
            thread_id
        )))
    }

    async fn ping(&self) -> Result<()> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}
