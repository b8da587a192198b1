use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, Document},
    Client, Collection,
};

use crate::dbs::mongo::models::MongoThread;
use crate::error::{PersistError, Result};
use crate::models::MessageRole;

#[derive(Clone)]
pub struct MongoThreadRepository {
    collection: Collection<MongoThread>,
}

impl MongoThreadRepository {
    pub fn new(client: &Client, db_name: &str) -> Self {
        let collection = client.database(db_name).collection("threads");
        Self { collection }
    }

    pub async fn insert(&self, thread: &MongoThread) -> Result<()> {
        self.collection.insert_one(thread).await?;
        Ok(())
    }

    pub async fn get(&self, thread_id: &str) -> Result<Option<MongoThread>> {
        Ok(self.collection.find_one(doc! { "_id": thread_id }).await?)
    }

    pub async fn exists(&self, thread_id: &str) -> Result<bool> {
        let count = self.collection.count_documents(doc! { "_id": thread_id }).limit(1).await?;
        Ok(count > 0)
    }

    /// Bookkeeping after a message lands in the thread
    pub async fn record_message(&self, thread_id: &str, role: MessageRole, content: &str) -> Result<()> {
        let now = bson::DateTime::now();
        let update = match role {
            MessageRole::User => doc! { "$set": { "updated_at": now } },
            MessageRole::Assistant => doc! { "$set": { "updated_at": now }, "$inc": { "reply_count": 1 } },
        };
        let result = self.collection.update_one(doc! { "_id": thread_id }, update).await?;
        if result.matched_count == 0 {
            return Err(PersistError::ThreadNotFound(thread_id.to_string()));
        }

        if role == MessageRole::User {
            self.collection
                .update_one(
                    doc! { "_id": thread_id, "first_message": "" },
                    doc! { "$set": { "first_message": content } },
                )
                .await?;
        }
        Ok(())
    }

    /// Replace the memory only if the stored watermark is not newer than
    /// `memorized_until`. Returns `false` when nothing matched.
    pub async fn set_memory(
        &self,
        thread_id: &str,
        summary: &str,
        memorized_until: DateTime<Utc>,
    ) -> Result<bool> {
        let now = bson::DateTime::now();
        let update = doc! {
            "$set": {
                "memory": {
                    "summary": summary,
                    "memorized_until": bson::DateTime::from_chrono(memorized_until),
                },
                "updated_at": now,
            }
        };
        let updated = self
            .collection
            .find_one_and_update(memory_update_filter(thread_id, memorized_until), update)
            .await?;
        Ok(updated.is_some())
    }
}

/// Matches the thread while its watermark is absent or at most `next`
fn memory_update_filter(thread_id: &str, next: DateTime<Utc>) -> Document {
    doc! {
        "_id": thread_id,
        "$or": [
            { "memory": null },
            { "memory.memorized_until": { "$lte": bson::DateTime::from_chrono(next) } },
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn memory_filter_guards_the_watermark() {
        let next = Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap();
        let filter = memory_update_filter("T1", next);

        assert_eq!(filter.get_str("_id").unwrap(), "T1");
        let branches = filter.get_array("$or").unwrap();
        assert_eq!(branches.len(), 2);

        let missing = branches[0].as_document().unwrap();
        assert_eq!(missing.get("memory"), Some(&bson::Bson::Null));

        let not_newer = branches[1]
            .as_document()
            .unwrap()
            .get_document("memory.memorized_until")
            .unwrap();
        assert_eq!(not_newer.get_datetime("$lte").unwrap().to_chrono(), next);
    }
}
