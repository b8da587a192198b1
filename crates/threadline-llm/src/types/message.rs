use serde::{Deserialize, Serialize};
use super::tool::{ToolCall, ToolResponse};

/// One role-tagged turn in the sequence sent to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "lowercase")]
pub enum Message {
    /// Fixed instructions, always the first turn
    System {
        content: String,
    },

    #[serde(rename = "user")]
    Human {
        content: String,
    },

    /// Model output: final text, tool requests, or both
    #[serde(rename = "assistant")]
    AI {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,

        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },

    /// Every tool result produced for a single model turn
    Tool {
        responses: Vec<ToolResponse>,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self::System { content: content.into() }
    }

    pub fn human(content: impl Into<String>) -> Self {
        Self::Human { content: content.into() }
    }

    pub fn ai(content: impl Into<String>) -> Self {
        Self::AI {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn ai_with_tools(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Self::AI { content, tool_calls }
    }

    pub fn tool_results(responses: Vec<ToolResponse>) -> Self {
        Self::Tool { responses }
    }

    pub fn role(&self) -> &str {
        match self {
            Self::System { .. } => "system",
            Self::Human { .. } => "user",
            Self::AI { .. } => "assistant",
            Self::Tool { .. } => "tool",
        }
    }

    /// Text carried by the turn, if any. Tool turns have none.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::System { content } | Self::Human { content } => Some(content),
            Self::AI { content, .. } => content.as_deref(),
            Self::Tool { .. } => None,
        }
    }
}
