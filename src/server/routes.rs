//! REST endpoints for detection and conversation.
//!
//! Handlers do no analysis of their own — they call into the detector and
//! the engine and serialize the results.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::analysis::detector::StuckUserDetector;
use crate::analysis::inventory::EventInventory;
use crate::conversation::engine::ConversationEngine;
use crate::events::store::EventStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EventStore>,
    pub detector: Arc<StuckUserDetector>,
    pub engine: Arc<ConversationEngine>,
}

/// Build the Axum router.
pub fn api_routes(
    store: Arc<EventStore>,
    detector: Arc<StuckUserDetector>,
    engine: Arc<ConversationEngine>,
) -> Router {
    let state = AppState {
        store,
        detector,
        engine,
    };

    Router::new()
        .route("/health", get(health))
        .route("/api/stuck-users", get(list_stuck_users))
        .route("/api/inventory", get(inventory))
        .route("/api/conversation/start", post(start_conversation))
        .route("/api/conversation", post(conversation_turn))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "reach-assist"
    }))
}

// ── Detection ───────────────────────────────────────────────────────────

async fn list_stuck_users(State(state): State<AppState>) -> impl IntoResponse {
    let records = state.detector.detect(&state.store);
    info!(flagged = records.len(), "Stuck-users request served");
    Json(records)
}

async fn inventory(State(state): State<AppState>) -> impl IntoResponse {
    Json(EventInventory::build(&state.store))
}

// ── Conversation ────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct StartRequest {
    user_id: String,
}

#[derive(Debug, Deserialize)]
struct TurnRequest {
    user_id: String,
    text: String,
}

/// Open a proactive outreach conversation, seeded with the user's tags.
async fn start_conversation(
    State(state): State<AppState>,
    Json(req): Json<StartRequest>,
) -> impl IntoResponse {
    if req.user_id.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": "user_id is required"})))
            .into_response();
    }

    let tags = state
        .detector
        .detect_user(&state.store, &req.user_id)
        .map(|record| record.struggling_with)
        .unwrap_or_default();

    let reply = state.engine.open_outreach(&req.user_id, tags).await;
    Json(reply).into_response()
}

/// Process one conversation turn.
async fn conversation_turn(
    State(state): State<AppState>,
    Json(req): Json<TurnRequest>,
) -> impl IntoResponse {
    if req.user_id.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(serde_json::json!({"error": "user_id is required"})))
            .into_response();
    }

    // Struggle context is only consulted at session creation, so the
    // detector scan is skipped for live sessions.
    let context = if state.engine.sessions().get(&req.user_id).await.is_none() {
        state
            .detector
            .detect_user(&state.store, &req.user_id)
            .map(|record| record.struggling_with)
    } else {
        None
    };

    let reply = state.engine.advance(&req.user_id, &req.text, context).await;
    Json(reply).into_response()
}
