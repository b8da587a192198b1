use thiserror::Error;

#[derive(Error, Debug)]
pub enum ToolError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("{service} API error ({status}): {body}")]
    Api {
        service: &'static str,
        status: u16,
        body: String,
    },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("{0} is not configured")]
    NotConfigured(String),
}

impl ToolError {
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}
