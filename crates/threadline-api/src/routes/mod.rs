pub mod agent;
pub mod health;
pub mod hooks;

use axum::{
    middleware,
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};
use utoipa::OpenApi;

use crate::{middleware::logging, state::AppState};

#[derive(OpenApi)]
#[openapi(
    paths(agent::agent_chat, hooks::document_changed, health::health_check, health::ping),
    components(schemas(
        crate::trigger::AgentChatRequest,
        crate::trigger::TriggerResponse,
        health::HealthResponse
    )),
    tags(
        (name = "agent", description = "Agent turn triggers"),
        (name = "health", description = "Liveness and readiness")
    )
)]
pub struct ApiDoc;

pub fn build_router(state: Arc<AppState>) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let v1 = Router::new()
        .route("/agent/chat", post(agent::agent_chat))
        .route("/hooks/documents", post(hooks::document_changed))
        .route("/ping", get(health::ping));

    Router::new()
        .nest("/v1", v1)
        .route("/health", get(health::health_check))
        .route("/api/openapi.json", get(openapi_json))
        .layer(middleware::from_fn(logging::log_request))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
