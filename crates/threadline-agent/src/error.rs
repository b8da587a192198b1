use thiserror::Error;
use threadline_persist::PersistError;

#[derive(Error, Debug)]
pub enum AgentError {
    /// Nothing to answer. Retrying needs new input.
    #[error("No pending message in thread {thread_id}")]
    NoPendingMessage { thread_id: String },

    /// Raised before any status write
    #[error("Failed to load thread {thread_id}: {source}")]
    HistoryFetchFailed {
        thread_id: String,
        #[source]
        source: PersistError,
    },

    /// The trigger message has been marked `error`
    #[error("Model invocation failed on turn {turn}: {source}")]
    ModelInvocationFailed {
        turn: usize,
        #[source]
        source: anyhow::Error,
    },

    /// Another invocation moved the trigger out of `unread` first
    #[error("Message {message_id} is already being processed")]
    AlreadyClaimed { message_id: String },

    /// The trigger is back in `unread`, so a retry answers it once
    #[error("Failed to {stage}: {source}")]
    Persist {
        stage: &'static str,
        #[source]
        source: PersistError,
    },

    /// The trigger is stuck in `generating` or its reply is already saved.
    /// Retrying could answer it twice.
    #[error("Failed to {stage} for message {message_id}: {source}")]
    Unreconciled {
        message_id: String,
        stage: &'static str,
        #[source]
        source: PersistError,
    },
}

impl AgentError {
    /// Whether running the whole invocation again may succeed
    pub fn is_retriable(&self) -> bool {
        match self {
            Self::NoPendingMessage { .. } | Self::AlreadyClaimed { .. } | Self::Unreconciled { .. } => false,
            Self::HistoryFetchFailed { .. } | Self::ModelInvocationFailed { .. } | Self::Persist { .. } => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retry_classification() {
        assert!(!AgentError::NoPendingMessage { thread_id: "t".into() }.is_retriable());
        assert!(!AgentError::AlreadyClaimed { message_id: "m".into() }.is_retriable());
        assert!(AgentError::HistoryFetchFailed {
            thread_id: "t".into(),
            source: PersistError::Connection("down".into()),
        }
        .is_retriable());
        assert!(AgentError::ModelInvocationFailed {
            turn: 1,
            source: anyhow::anyhow!("503"),
        }
        .is_retriable());
        assert!(AgentError::Persist {
            stage: "save reply",
            source: PersistError::Connection("down".into()),
        }
        .is_retriable());
        assert!(!AgentError::Unreconciled {
            message_id: "m".into(),
            stage: "mark trigger completed",
            source: PersistError::Connection("down".into()),
        }
        .is_retriable());
    }

    #[test]
    fn messages_name_the_subject() {
        let err = AgentError::Persist {
            stage: "save reply",
            source: PersistError::ThreadNotFound("t1".into()),
        };
        assert_eq!(err.to_string(), "Failed to save reply: Thread not found: t1");
    }
}
