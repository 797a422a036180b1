use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::header;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};

use walletrpc_core::Dispatcher;

// ==============================================================================
// Application State
// ==============================================================================

pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

type SharedState = Arc<AppState>;

// ==============================================================================
// Router
// ==============================================================================

pub fn build_router(state: AppState, max_body_bytes: usize) -> Router {
    let shared = Arc::new(state);

    Router::new()
        .route("/health", get(health))
        .route("/json_rpc", post(json_rpc))
        .layer(DefaultBodyLimit::max(max_body_bytes))
        .with_state(shared)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// JSON-RPC errors travel in the response body; the HTTP status is always
/// 200 once a body has been read.
async fn json_rpc(State(state): State<SharedState>, body: Bytes) -> impl IntoResponse {
    let response = state.dispatcher.handle_bytes(&body).await;
    ([(header::CONTENT_TYPE, "application/json")], response)
}
