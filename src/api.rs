//! REST API Server for the summary-memory chat service
//!
//! Every failure is caught here and rendered as an `ApiResponse` error, so
//! one bad interaction never takes the process down.

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

use crate::conversational::ConversationSummaryStore;
use crate::error::ChatError;
use crate::memory::TranscriptView;
use crate::models::{SessionKey, SummaryState};

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ChatRequest {
    pub session_key: String,
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct TurnsQuery {
    pub limit: Option<usize>,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn failure(error: ChatError) -> ApiResult {
    let status = if error.is_client_error() {
        StatusCode::BAD_REQUEST
    } else if error.is_generation() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    warn!("Request failed ({}): {}", status, error);
    (status, Json(ApiResponse::error(error.to_string())))
}

/// Malformed body or query string; axum's own rejection text, enveloped
fn rejected(message: String) -> ApiResult {
    warn!("Rejected request: {}", message);
    (StatusCode::BAD_REQUEST, Json(ApiResponse::error(message)))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub store: Arc<ConversationSummaryStore>,
}

/// =============================
/// Health Endpoint
/// =============================

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Chat Endpoint
/// =============================

async fn chat_handler(
    State(state): State<ApiState>,
    payload: std::result::Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejected(rejection.body_text()),
    };

    info!("Received chat request for session {:?}", req.session_key);

    let key = match state.store.open(&req.session_key).await {
        Ok(key) => key,
        Err(e) => return failure(e),
    };

    match state.store.interact(&key, &req.question).await {
        Ok(outcome) => ok(outcome),
        Err(e) => failure(e),
    }
}

/// =============================
/// Session Endpoints
/// =============================

async fn summary_handler(State(state): State<ApiState>, Path(raw_key): Path<String>) -> ApiResult {
    let key = match SessionKey::parse(&raw_key) {
        Ok(key) => key,
        Err(e) => return failure(e),
    };

    let summary = state.store.load(&key).await;
    ok(serde_json::json!({
        "session_key": key,
        "summary_state": SummaryState::of(&summary),
        "summary": summary,
    }))
}

async fn turns_handler(
    State(state): State<ApiState>,
    Path(raw_key): Path<String>,
    query: std::result::Result<Query<TurnsQuery>, QueryRejection>,
) -> ApiResult {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => return rejected(rejection.body_text()),
    };

    let key = match SessionKey::parse(&raw_key) {
        Ok(key) => key,
        Err(e) => return failure(e),
    };

    let limit = query
        .limit
        .unwrap_or(state.store.memory_config().display_turns);

    ok(TranscriptView {
        session_key: key.to_string(),
        turns: state.store.recent_turns(&key, limit).await,
    })
}

async fn stats_handler(State(state): State<ApiState>, Path(raw_key): Path<String>) -> ApiResult {
    match SessionKey::parse(&raw_key) {
        Ok(key) => ok(state.store.stats(&key).await),
        Err(e) => failure(e),
    }
}

async fn reset_handler(State(state): State<ApiState>, Path(raw_key): Path<String>) -> ApiResult {
    let key = match SessionKey::parse(&raw_key) {
        Ok(key) => key,
        Err(e) => return failure(e),
    };

    let reset = state.store.reset(&key).await;
    ok(serde_json::json!({ "session_key": key, "reset": reset }))
}

/// =============================
/// Router
/// =============================

pub fn create_router(store: Arc<ConversationSummaryStore>) -> Router {
    let state = ApiState { store };

    Router::new()
        .route("/health", get(health))
        .route("/api/chat", post(chat_handler))
        .route("/api/sessions/:key", axum::routing::delete(reset_handler))
        .route("/api/sessions/:key/summary", get(summary_handler))
        .route("/api/sessions/:key/turns", get(turns_handler))
        .route("/api/sessions/:key/stats", get(stats_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    store: Arc<ConversationSummaryStore>,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(store);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
