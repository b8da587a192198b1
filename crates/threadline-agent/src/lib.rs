pub mod config;
pub mod error;
pub mod context;
pub mod pending;
pub mod turn;
pub mod service;
pub mod summarizer;
pub mod builder;

pub use config::AgentConfig;
pub use error::AgentError;
pub use context::build_turns;
pub use pending::{PendingMessageSelector, StatusSelector};
pub use service::{AgentOutcome, AgentService};
pub use summarizer::MemoryCompactor;
pub use builder::AgentServiceBuilder;

pub use threadline_tools::ToolCallRecord;
