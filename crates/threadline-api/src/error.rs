use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use threadline_agent::AgentError;
use threadline_persist::PersistError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error("Persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("Internal server error")]
    Internal,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Agent(AgentError::NoPendingMessage { .. })
            | ApiError::Agent(AgentError::AlreadyClaimed { .. }) => StatusCode::CONFLICT,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::BadRequest(_) => self.to_string(),
            ApiError::Agent(ref e) if status == StatusCode::CONFLICT => {
                tracing::info!("Agent turn not run: {}", e);
                e.to_string()
            }
            ApiError::Agent(ref e) => {
                tracing::error!(retriable = e.is_retriable(), "Agent error: {}", e);
                "Processing error".to_string()
            }
            ApiError::Persist(ref e) => {
                tracing::error!("Persistence error: {}", e);
                "Storage error".to_string()
            }
            ApiError::Internal => {
                tracing::error!("Internal error: {}", self);
                "Internal server error".to_string()
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conflicts_map_to_409() {
        let no_pending = ApiError::from(AgentError::NoPendingMessage {
            thread_id: "T1".to_string(),
        });
        let claimed = ApiError::from(AgentError::AlreadyClaimed {
            message_id: "m1".to_string(),
        });

        assert_eq!(no_pending.into_response().status(), StatusCode::CONFLICT);
        assert_eq!(claimed.into_response().status(), StatusCode::CONFLICT);
    }

    #[test]
    fn test_other_failures_map_to_500() {
        let failed = ApiError::from(AgentError::ModelInvocationFailed {
            turn: 0,
            source: anyhow::anyhow!("boom"),
        });
        assert_eq!(failed.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let persist = ApiError::from(PersistError::Connection("down".to_string()));
        assert_eq!(persist.into_response().status(), StatusCode::INTERNAL_SERVER_ERROR);

        let bad = ApiError::BadRequest("threadId is required".to_string());
        assert_eq!(bad.into_response().status(), StatusCode::BAD_REQUEST);
    }
}
