use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::{
    config::DispatchMode,
    error::{ApiError, ApiResult},
    state::AppState,
    trigger::{classify, spawn_agent_turn, ChangeNotification, HookDecision, TriggerResponse},
};

/// Document change notification from the message store.
///
/// Body is `{"value": {"name": <path>, "fields": {..}}}` or the same wrapped in
/// `{"data": ..}`. Paths without a `threads/<id>` segment are acknowledged
/// untouched.
#[utoipa::path(
    post,
    path = "/v1/hooks/documents",
    responses(
        (status = 200, description = "Handled, skipped or not applicable", body = TriggerResponse),
        (status = 202, description = "Agent turn dispatched in the background", body = TriggerResponse),
        (status = 400, description = "Unreadable notification"),
        (status = 409, description = "Nothing pending or already being answered"),
        (status = 500, description = "Agent turn failed")
    ),
    tag = "agent"
)]
pub async fn document_changed(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> ApiResult<(StatusCode, Json<TriggerResponse>)> {
    let notification: ChangeNotification = serde_json::from_slice(&body)
        .map_err(|e| ApiError::BadRequest(format!("invalid change notification: {}", e)))?;

    let thread_id = match classify(&notification) {
        HookDecision::NotApplicable => {
            tracing::debug!("Change notification without thread id, ignoring");
            return Ok((StatusCode::OK, Json(TriggerResponse::new("ignored", None))));
        }
        HookDecision::SkipRole(role) => {
            tracing::info!(role = %role, "Skipping non-user message");
            return Ok((StatusCode::OK, Json(TriggerResponse::new("skipped", None))));
        }
        HookDecision::Dispatch(thread_id) => thread_id,
    };

    tracing::info!(thread_id = %thread_id, dispatch = ?state.config.trigger.dispatch, "Document change triggered agent");

    match state.config.trigger.dispatch {
        DispatchMode::Inline => {
            state.agent.chat(&thread_id).await?;
            Ok((StatusCode::OK, Json(TriggerResponse::new("ok", Some(&thread_id)))))
        }
        DispatchMode::Background => {
            spawn_agent_turn(state.agent.clone(), thread_id.clone());
            Ok((StatusCode::ACCEPTED, Json(TriggerResponse::new("accepted", Some(&thread_id)))))
        }
    }
}
