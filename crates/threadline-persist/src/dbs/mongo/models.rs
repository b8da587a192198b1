use bson::serde_helpers::chrono_datetime_as_bson_datetime;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{AiMetadata, Attachment, Message, MessageRole, MessageStatus, Thread, ThreadMemory};

/// MongoDB message document. `_id` is the time-sortable message id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoMessage {
    #[serde(rename = "_id")]
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_metadata: Option<AiMetadata>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThreadMemory {
    pub summary: String,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub memorized_until: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoThread {
    #[serde(rename = "_id")]
    pub id: String,
    pub user_id: String,
    #[serde(default)]
    pub first_message: String,
    #[serde(default)]
    pub reply_count: u32,
    #[serde(default)]
    pub is_private: bool,
    #[serde(default)]
    pub is_archived: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<MongoThreadMemory>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "chrono_datetime_as_bson_datetime")]
    pub updated_at: DateTime<Utc>,
}

impl From<Message> for MongoMessage {
    fn from(msg: Message) -> Self {
        Self {
            id: msg.id,
            thread_id: msg.thread_id,
            role: msg.role,
            content: msg.content,
            attachments: msg.attachments,
            ai_metadata: msg.ai_metadata,
            status: msg.status,
            created_at: msg.created_at,
        }
    }
}

impl From<MongoMessage> for Message {
    fn from(msg: MongoMessage) -> Self {
        Self {
            id: msg.id,
            thread_id: msg.thread_id,
            role: msg.role,
            content: msg.content,
            attachments: msg.attachments,
            ai_metadata: msg.ai_metadata,
            status: msg.status,
            created_at: msg.created_at,
        }
    }
}

impl From<Thread> for MongoThread {
    fn from(thread: Thread) -> Self {
        Self {
            id: thread.id,
            user_id: thread.user_id,
            first_message: thread.first_message,
            reply_count: thread.reply_count,
            is_private: thread.is_private,
            is_archived: thread.is_archived,
            memory: thread.memory.map(|m| MongoThreadMemory {
                summary: m.summary,
                memorized_until: m.memorized_until,
            }),
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}

impl From<MongoThread> for Thread {
    fn from(thread: MongoThread) -> Self {
        Self {
            id: thread.id,
            user_id: thread.user_id,
            first_message: thread.first_message,
            reply_count: thread.reply_count,
            is_private: thread.is_private,
            is_archived: thread.is_archived,
            memory: thread.memory.map(|m| ThreadMemory {
                summary: m.summary,
                memorized_until: m.memorized_until,
            }),
            created_at: thread.created_at,
            updated_at: thread.updated_at,
        }
    }
}
