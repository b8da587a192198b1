use thiserror::Error;

use crate::models::MessageStatus;

#[derive(Error, Debug)]
pub enum PersistError {
    #[cfg(feature = "mongodb")]
    #[error("Database error: {0}")]
    Database(#[from] mongodb::error::Error),

    #[cfg(feature = "mongodb")]
    #[error("BSON serialization error: {0}")]
    BsonSerialization(#[from] bson::ser::Error),

    #[error("Thread not found: {0}")]
    ThreadNotFound(String),

    #[error("Message not found: {0}")]
    MessageNotFound(String),

    /// The stored status did not match the expected one in a conditional transition
    #[error("Message {message_id} is {actual:?}, expected {expected}")]
    StatusConflict {
        message_id: String,
        expected: MessageStatus,
        actual: Option<MessageStatus>,
    },

    #[error("Invalid watermark: {0}")]
    InvalidWatermark(String),

    #[error("Connection error: {0}")]
    Connection(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, PersistError>;
