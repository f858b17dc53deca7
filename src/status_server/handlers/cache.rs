//! Discovery cache management handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;

use super::super::types::{AppState, ErrorResponse, MessageResponse};

/// Discovery cache state.
pub async fn cache_info_handler(State(state): State<AppState>) -> Response {
    Json(state.checker.discovery().info()).into_response()
}

pub async fn cache_clear_handler(State(state): State<AppState>) -> Response {
    state.checker.discovery().clear();
    Json(MessageResponse::ok("Cache cleared")).into_response()
}

/// Expires the discovery snapshot and rediscovers.
pub async fn cache_force_refresh_handler(State(state): State<AppState>) -> Response {
    match state.checker.discovery().force_refresh().await {
        Ok(snapshot) => Json(MessageResponse::ok(format!(
            "Cache refreshed with {} URLs",
            snapshot.data.len()
        )))
        .into_response(),
        Err(e) => {
            error!("Forced cache refresh failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}
