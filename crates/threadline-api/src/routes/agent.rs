use axum::{body::Bytes, extract::State, Json};
use std::sync::Arc;

use crate::{
    error::{ApiError, ApiResult},
    state::AppState,
    trigger::{AgentChatRequest, TriggerResponse},
};

/// Run one agent turn for a thread and wait for it
#[utoipa::path(
    post,
    path = "/v1/agent/chat",
    request_body = AgentChatRequest,
    responses(
        (status = 200, description = "Reply saved", body = TriggerResponse),
        (status = 400, description = "No thread id given"),
        (status = 409, description = "Nothing pending or already being answered"),
        (status = 500, description = "Agent turn failed")
    ),
    tag = "agent"
)]
pub async fn agent_chat(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<Json<TriggerResponse>> {
    let req: AgentChatRequest = if body.is_empty() {
        AgentChatRequest::default()
    } else {
        serde_json::from_slice(&body).map_err(|e| ApiError::BadRequest(format!("invalid body: {}", e)))?
    };

    let thread_id = req.thread_id.trim();
    if thread_id.is_empty() {
        return Err(ApiError::BadRequest("threadId is required".to_string()));
    }

    tracing::info!(thread_id = %thread_id, "Agent chat triggered");
    state.agent.chat(thread_id).await?;

    Ok(Json(TriggerResponse::new("ok", Some(thread_id))))
}
