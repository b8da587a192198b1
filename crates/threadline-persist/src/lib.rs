pub mod models;
pub mod error;
pub mod store;
pub mod memory;
pub mod ids;
pub mod dbs;

pub use models::{
    AiMetadata, AiUsage, Attachment, Message, MessageRole, MessageStatus, NewMessage, NewThread,
    Thread, ThreadMemory,
};
pub use error::{PersistError, Result};
pub use store::ChatStore;
pub use memory::{InMemoryChatStore, StoreOp};

#[cfg(feature = "mongodb")]
pub use dbs::mongo::MongoChatStore;
