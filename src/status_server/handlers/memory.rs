//! Process memory usage.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use log::error;
use sysinfo::{ProcessesToUpdate, System};

use super::super::types::{ErrorResponse, MemoryResponse};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Resident and virtual size of this process, plus resident share of
/// physical memory.
pub fn current_memory_usage() -> Result<MemoryResponse, String> {
    let pid = sysinfo::get_current_pid().map_err(|e| e.to_string())?;
    let mut system = System::new();
    system.refresh_processes(ProcessesToUpdate::Some(&[pid]), true);
    system.refresh_memory();

    let process = system
        .process(pid)
        .ok_or_else(|| format!("Process {pid} not found"))?;
    let rss = process.memory() as f64;
    let total = system.total_memory() as f64;
    let percent = if total > 0.0 { rss / total * 100.0 } else { 0.0 };

    Ok(MemoryResponse {
        rss_mb: round2(rss / BYTES_PER_MB),
        vms_mb: round2(process.virtual_memory() as f64 / BYTES_PER_MB),
        percent: round2(percent),
        status: "ok".to_string(),
    })
}

pub async fn memory_handler() -> Response {
    match current_memory_usage() {
        Ok(usage) => Json(usage).into_response(),
        Err(e) => {
            error!("Memory usage unavailable: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse::new(e))).into_response()
        }
    }
}
