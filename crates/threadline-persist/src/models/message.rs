use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stored chat message. Owned by exactly one thread.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_metadata: Option<AiMetadata>,
    /// Legacy rows carry no status and are never picked as a trigger
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MessageStatus>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn is_user(&self) -> bool {
        self.role == MessageRole::User
    }

    pub fn has_status(&self, status: MessageStatus) -> bool {
        self.status == Some(status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-message lifecycle: `unread -> generating -> completed | error`.
/// `received` is written by upstream producers and is not a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Unread,
    Received,
    Generating,
    Completed,
    Error,
}

impl MessageStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unread => "unread",
            Self::Received => "received",
            Self::Generating => "generating",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }
}

impl fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for MessageStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "unread" => Ok(Self::Unread),
            "received" => Ok(Self::Received),
            "generating" => Ok(Self::Generating),
            "completed" => Ok(Self::Completed),
            "error" => Ok(Self::Error),
            other => Err(format!("unknown message status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attachment {
    /// image, text, document, audio, video
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub mime_type: String,
    pub name: String,
    pub size: i64,
}

/// Provenance of an assistant reply
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiMetadata {
    pub model: String,
    pub usage: AiUsage,
    pub finish_reason: String,
    pub response_id: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Message to be stored; the store assigns the id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewMessage {
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    pub attachments: Vec<Attachment>,
    pub ai_metadata: Option<AiMetadata>,
    pub status: Option<MessageStatus>,
    /// Defaults to the time of the write
    pub created_at: Option<DateTime<Utc>>,
}

impl NewMessage {
    pub fn new(thread_id: impl Into<String>, role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            thread_id: thread_id.into(),
            role,
            content: content.into(),
            attachments: Vec::new(),
            ai_metadata: None,
            status: None,
            created_at: None,
        }
    }

    /// Incoming user message, waiting for the agent
    pub fn user(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, MessageRole::User, content).with_status(MessageStatus::Unread)
    }

    pub fn assistant(thread_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(thread_id, MessageRole::Assistant, content).with_status(MessageStatus::Completed)
    }

    pub fn with_status(mut self, status: MessageStatus) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_ai_metadata(mut self, metadata: AiMetadata) -> Self {
        self.ai_metadata = Some(metadata);
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = Some(created_at);
        self
    }

    pub fn into_message(self, id: String) -> Message {
        Message {
            id,
            thread_id: self.thread_id,
            role: self.role,
            content: self.content,
            attachments: self.attachments,
            ai_metadata: self.ai_metadata,
            status: self.status,
            created_at: self.created_at.unwrap_or_else(Utc::now),
        }
    }
}
