//! Web layer data structures.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app::PortalChecker;
use crate::models::CheckResult;

/// Shared state for the web layer
#[derive(Clone)]
pub struct AppState {
    /// Discovery, probing and published results
    pub checker: Arc<PortalChecker>,
}

impl AppState {
    /// State serving `checker`.
    pub fn new(checker: Arc<PortalChecker>) -> Self {
        Self { checker }
    }
}

/// JSON response for `/api/urls`
#[derive(Debug, Serialize, Deserialize)]
pub struct UrlsResponse {
    /// Latest results, empty before the first sweep
    pub results: Vec<CheckResult>,
    /// Publication time of `results`
    pub last_updated: Option<DateTime<Utc>>,
    /// Number of results
    pub total: usize,
}

/// Body of `POST /api/exclude`
#[derive(Debug, Deserialize)]
pub struct ExcludeRequest {
    /// URL or host/path to exclude
    #[serde(default)]
    pub url: Option<String>,
}

/// Generic `{message, status}` answer
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    /// Human-readable outcome
    pub message: String,
    /// Always `ok`
    pub status: String,
}

impl MessageResponse {
    /// Success answer carrying `message`.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: "ok".to_string(),
        }
    }
}

/// Generic `{error, status: "error"}` answer
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// What went wrong
    pub error: String,
    /// Always `error`
    pub status: String,
}

impl ErrorResponse {
    /// Error answer carrying `error`.
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            status: "error".to_string(),
        }
    }
}

/// JSON response for `/memory`
#[derive(Debug, Serialize, Deserialize)]
pub struct MemoryResponse {
    /// Resident set size in MiB
    pub rss_mb: f64,
    /// Virtual memory size in MiB
    pub vms_mb: f64,
    /// Resident set as a percentage of physical memory
    pub percent: f64,
    /// Always `ok`
    pub status: String,
}

/// JSON response for `/version`
#[derive(Debug, Serialize)]
pub struct VersionResponse {
    /// Package name
    pub name: &'static str,
    /// Package version
    pub version: &'static str,
}
