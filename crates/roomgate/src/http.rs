//! Axum HTTP handlers for the roomgate host adapter.
//!
//! The host forwards each room-creation attempt here before committing it
//! and maps the response onto its own allow/deny decision.

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;

use roomgate_policy::RoomCreationContent;

use crate::error::RootResult;
use crate::RoomGate;

pub const CHECK_CREATE_ROOM_PATH: &str = "/_roomgate/v1/check_create_room";

/// Shared application state for Axum handlers.
pub struct AppState {
    pub gate: RoomGate,
}

/// Build the Axum router with all endpoints.
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route(CHECK_CREATE_ROOM_PATH, post(handle_check_create_room))
        .route("/health", get(handle_health))
        .with_state(state)
}

/// Bind `bind:port` and serve until the listener fails.
pub async fn serve(state: Arc<AppState>, bind: &str, port: u16) -> RootResult<()> {
    let listener = tokio::net::TcpListener::bind((bind, port)).await?;
    tracing::info!(addr = %listener.local_addr()?, "host adapter listening");
    axum::serve(listener, build_router(state)).await?;
    Ok(())
}

/// Room-creation check request body.
#[derive(Debug, Deserialize)]
struct CheckCreateRoomRequest {
    requester: String,
    #[serde(default)]
    is_admin: bool,
    #[serde(default)]
    content: RoomCreationContent,
}

/// POST /_roomgate/v1/check_create_room -- allow or deny one attempt
async fn handle_check_create_room(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CheckCreateRoomRequest>,
) -> impl IntoResponse {
    match state
        .gate
        .on_create_room(&req.requester, &req.content, req.is_admin)
    {
        Ok(()) => (StatusCode::OK, Json(serde_json::json!({ "allowed": true }))),
        Err(e) => (
            StatusCode::from_u16(e.status).unwrap_or(StatusCode::FORBIDDEN),
            Json(e.to_json()),
        ),
    }
}

/// GET /health -- resolved configuration summary
async fn handle_health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    let account = state.gate.service_account();
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "service_account": account.service_user_id(),
        "adapter_endpoint": account.adapter_endpoint,
        "secret": if account.has_secret() { "configured" } else { "absent" },
    }))
}
