mod message;
mod thread;

pub use message::{AiMetadata, AiUsage, Attachment, Message, MessageRole, MessageStatus, NewMessage};
pub use thread::{validate_watermark, NewThread, Thread, ThreadMemory};
