//! JSON API handlers.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use log::{error, info, warn};
use serde_json::json;

use crate::error_handling::ExclusionError;
use crate::exclusion::add_exclusion;

use super::super::types::{
    AppState, ErrorResponse, ExcludeRequest, MessageResponse, UrlsResponse, VersionResponse,
};

/// Latest results; runs one sweep first if none was ever published.
pub async fn api_urls_handler(State(state): State<AppState>) -> Response {
    let checker = &state.checker;
    if let Err(e) = checker.ensure_results().await {
        warn!("On-demand sweep failed: {e}");
    }

    let response = match checker.latest_results() {
        Some(snapshot) => UrlsResponse {
            results: snapshot.data.clone(),
            last_updated: Some(snapshot.last_updated),
            total: snapshot.data.len(),
        },
        None => UrlsResponse {
            results: Vec::new(),
            last_updated: None,
            total: 0,
        },
    };
    Json(response).into_response()
}

/// Forced rediscovery and sweep, then back to the dashboard.
pub async fn refresh_handler(State(state): State<AppState>) -> Response {
    match state.checker.refresh().await {
        Ok(count) => {
            info!("Manual refresh checked {count} URLs");
            Redirect::to("/").into_response()
        }
        Err(e) => {
            error!("Manual refresh failed: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Appends a URL to the exclusion file.
pub async fn exclude_handler(
    State(state): State<AppState>,
    body: Result<Json<ExcludeRequest>, JsonRejection>,
) -> Response {
    let bad_request = |message: &str| {
        (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
    };

    let url = match body {
        Ok(Json(ExcludeRequest { url: Some(url) })) if !url.trim().is_empty() => url,
        Ok(_) => return bad_request("URL required"),
        Err(rejection) => return bad_request(&rejection.body_text()),
    };

    let matcher = state.checker.matcher();
    match add_exclusion(matcher.path(), &url) {
        Ok((entry, added)) => {
            matcher.invalidate();
            let message = if added {
                info!("Added exclusion: {entry}");
                format!("URL '{entry}' added to exclusions")
            } else {
                format!("URL '{entry}' is already excluded")
            };
            Json(MessageResponse::ok(message)).into_response()
        }
        Err(ExclusionError::EmptyUrl) => bad_request("URL required"),
        Err(e) => {
            error!("Failed to add exclusion for {url}: {e}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Liveness probe.
pub async fn health_handler() -> Response {
    Json(json!({ "status": "ok" })).into_response()
}

/// Build information.
pub async fn version_handler() -> Response {
    Json(VersionResponse {
        name: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
    })
    .into_response()
}
