use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::warn;

use crate::routes::AppState;

pub mod banking;
pub mod education;
pub mod gamification;
pub mod insights;
pub mod investing;
pub mod savings;
pub mod social;
pub mod users;

pub async fn index() -> Json<serde_json::Value> {
    Json(json!({
        "name": "SaveUp API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Reports the primary store's liveness. A fallback-backed deployment keeps
/// serving requests from memory, but health flips to 503 so operators notice.
pub async fn health(State(state): State<AppState>) -> Response {
    match state.storage.ping().await {
        Ok(()) => (StatusCode::OK, Json(json!({ "status": "ok" }))).into_response(),
        Err(err) => {
            warn!(error = %err, "health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "status": "degraded" })),
            )
                .into_response()
        }
    }
}
