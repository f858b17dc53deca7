//! Server-rendered dashboard.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use handlebars::{Handlebars, RenderError};
use log::error;
use serde::Serialize;

use crate::cache::Snapshot;
use crate::models::{CheckResult, SslInfo};
use crate::probe::{is_acceptable, probe_target};

use super::super::types::AppState;

const DASHBOARD_TEMPLATE: &str = include_str!("../templates/dashboard.hbs");

/// Dashboard page built from the latest results. Never triggers a sweep.
pub async fn dashboard_handler(State(state): State<AppState>) -> Response {
    let snapshot = state.checker.latest_results();
    match render_dashboard(snapshot.as_deref()) {
        Ok(html) => Html(html).into_response(),
        Err(e) => {
            error!("Dashboard rendering failed: {e}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Dashboard unavailable").into_response()
        }
    }
}

#[derive(Serialize)]
struct DashboardPage {
    waiting: bool,
    last_updated: String,
    total: usize,
    ok: usize,
    warn: usize,
    error: usize,
    rows: Vec<DashboardRow>,
}

#[derive(Serialize)]
struct DashboardRow {
    class: &'static str,
    status: u16,
    href: String,
    url: String,
    namespace: String,
    name: String,
    kind: String,
    ingress_class: String,
    details: String,
    response_time: u64,
    certificate: String,
}

fn status_class(status: u16) -> &'static str {
    match status {
        s if is_acceptable(s) => "ok",
        403 | 405 | 429 => "warn",
        s if (200..400).contains(&s) => "ok",
        _ => "error",
    }
}

fn certificate_cell(result: &CheckResult) -> String {
    match &result.ssl_info {
        Some(SslInfo::Certificate(info)) => format!(
            "{} days ({})",
            info.days_remaining,
            info.expiry_date.format("%Y-%m-%d")
        ),
        Some(SslInfo::HttpOnly { .. }) => "HTTP".to_string(),
        None => "-".to_string(),
    }
}

impl DashboardRow {
    fn new(result: &CheckResult) -> Self {
        let record = &result.record;
        Self {
            class: status_class(result.status),
            status: result.status,
            href: probe_target(&record.url),
            url: record.url.clone(),
            namespace: record.namespace.clone(),
            name: record.name.clone(),
            kind: record.resource_kind.to_string(),
            ingress_class: record
                .gateway_or_ingress_class
                .clone()
                .unwrap_or_else(|| "-".to_string()),
            details: result.details.clone(),
            response_time: result.response_time_ms,
            certificate: certificate_cell(result),
        }
    }
}

impl DashboardPage {
    fn waiting() -> Self {
        Self {
            waiting: true,
            last_updated: String::new(),
            total: 0,
            ok: 0,
            warn: 0,
            error: 0,
            rows: Vec::new(),
        }
    }

    fn from_snapshot(snapshot: &Snapshot<Vec<CheckResult>>) -> Self {
        let rows: Vec<DashboardRow> = snapshot.data.iter().map(DashboardRow::new).collect();
        let count = |class: &str| rows.iter().filter(|row| row.class == class).count();
        Self {
            waiting: false,
            last_updated: snapshot
                .last_updated
                .format("%Y-%m-%d %H:%M:%S UTC")
                .to_string(),
            total: rows.len(),
            ok: count("ok"),
            warn: count("warn"),
            error: count("error"),
            rows,
        }
    }
}

/// Renders the dashboard HTML. Every interpolated value is HTML-escaped.
pub fn render_dashboard(
    snapshot: Option<&Snapshot<Vec<CheckResult>>>,
) -> Result<String, RenderError> {
    let page = match snapshot {
        Some(snapshot) => DashboardPage::from_snapshot(snapshot),
        None => DashboardPage::waiting(),
    };
    Handlebars::new().render_template(DASHBOARD_TEMPLATE, &page)
}
