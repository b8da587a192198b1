use chrono::{DateTime, Utc};
use futures::TryStreamExt;
use mongodb::{bson::doc, Client, Collection, IndexModel};

use crate::dbs::mongo::models::MongoMessage;
use crate::error::{PersistError, Result};
use crate::models::MessageStatus;

#[derive(Clone)]
pub struct MongoMessageRepository {
    collection: Collection<MongoMessage>,
}

impl MongoMessageRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("messages");
        Self { collection }
    }

    pub async fn ensure_indexes(&self) -> Result<()> {
        let index = IndexModel::builder()
            .keys(doc! { "thread_id": 1, "created_at": 1 })
            .build();
        self.collection.create_index(index).await?;
        Ok(())
    }

    pub async fn insert(&self, message: &MongoMessage) -> Result<()> {
        self.collection.insert_one(message).await?;
        Ok(())
    }

    /// All messages for a thread, ordered by id (creation order)
    pub async fn list(&self, thread_id: &str) -> Result<Vec<MongoMessage>> {
        let messages = self
            .collection
            .find(doc! { "thread_id": thread_id })
            .sort(doc! { "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    pub async fn list_after(&self, thread_id: &str, after: DateTime<Utc>) -> Result<Vec<MongoMessage>> {
        let filter = doc! {
            "thread_id": thread_id,
            "created_at": { "$gt": bson::DateTime::from_chrono(after) }
        };
        let messages = self
            .collection
            .find(filter)
            .sort(doc! { "created_at": 1, "_id": 1 })
            .await?
            .try_collect()
            .await?;
        Ok(messages)
    }

    pub async fn set_status(&self, thread_id: &str, message_id: &str, status: MessageStatus) -> Result<()> {
        let result = self
            .collection
            .update_one(
                doc! { "_id": message_id, "thread_id": thread_id },
                doc! { "$set": { "status": status.as_str() } },
            )
            .await?;
        if result.matched_count == 0 {
            return Err(PersistError::MessageNotFound(message_id.to_string()));
        }
        Ok(())
    }

    /// Conditional update filtered on the expected status
    pub async fn compare_and_set_status(
        &self,
        thread_id: &str,
        message_id: &str,
        from: MessageStatus,
        to: MessageStatus,
    ) -> Result<()> {
        let updated = self
            .collection
            .find_one_and_update(
                doc! { "_id": message_id, "thread_id": thread_id, "status": from.as_str() },
                doc! { "$set": { "status": to.as_str() } },
            )
            .await?;
        if updated.is_some() {
            return Ok(());
        }

        let current = self
            .collection
            .find_one(doc! { "_id": message_id, "thread_id": thread_id })
            .await?
            .ok_or_else(|| PersistError::MessageNotFound(message_id.to_string()))?;
        Err(PersistError::StatusConflict {
            message_id: message_id.to_string(),
            expected: from,
            actual: current.status,
        })
    }
}
