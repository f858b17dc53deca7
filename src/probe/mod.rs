//! HTTP probing.
//!
//! The engine issues one GET per record, at most `max_concurrent` at a time,
//! and turns whatever happens into a `CheckResult`. A probe never fails: every
//! transport error is classified into a status code and a details string.

mod outcome;
mod timing;

use std::sync::Arc;
use std::time::Instant;

use futures::stream::FuturesUnordered;
use futures::StreamExt;
use log::{debug, info};
use reqwest::Client;
use tokio::sync::Semaphore;

use crate::models::{CheckResult, UrlRecord};
use crate::notify::SlackNotifier;
use crate::tls::SslInspector;

// Re-export public API
pub use outcome::{
    classify_status, is_acceptable, Classification, ProbeOutcome, CONNECTION_ERROR_STATUS,
    TIMEOUT_STATUS, TLS_ERROR_STATUS, UNEXPECTED_ERROR_STATUS,
};
pub use timing::{probe_target, round_millis};

/// Concurrency-bounded URL checker.
#[derive(Clone)]
pub struct ProbeEngine {
    client: Client,
    semaphore: Arc<Semaphore>,
    max_concurrent: usize,
    ssl_inspector: Option<SslInspector>,
    notifier: Option<SlackNotifier>,
}

impl ProbeEngine {
    /// Engine sending requests with `client`, `max_concurrent` at a time.
    ///
    /// The permit pool is shared by every batch run on this engine (and its
    /// clones), so overlapping sweeps do not add up.
    pub fn new(client: Client, max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            client,
            semaphore: crate::initialization::init_semaphore(max_concurrent),
            max_concurrent,
            ssl_inspector: None,
            notifier: None,
        }
    }

    /// Attaches certificate metadata to results.
    pub fn with_ssl_inspector(mut self, inspector: SslInspector) -> Self {
        self.ssl_inspector = Some(inspector);
        self
    }

    /// Sends alerts for failing URLs.
    pub fn with_notifier(mut self, notifier: SlackNotifier) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Permit pool size.
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    async fn send(&self, target: &str) -> ProbeOutcome {
        match self.client.get(target).send().await {
            Ok(response) => ProbeOutcome::Response(response.status()),
            Err(e) => ProbeOutcome::from_error(&e),
        }
    }

    /// Probes one record.
    pub async fn check_url(&self, record: UrlRecord) -> CheckResult {
        // The semaphore is never closed, so acquisition only fails if that changes.
        let _permit = self.semaphore.acquire().await.ok();

        let target = probe_target(&record.url);
        let start = Instant::now();
        let outcome = self.send(&target).await;
        let response_time_ms = round_millis(start.elapsed());
        let classification = outcome.classify();
        debug!(
            "{target} -> {} in {response_time_ms}ms ({})",
            classification.status, classification.details
        );

        let ssl_info = match (&self.ssl_inspector, &outcome) {
            (Some(inspector), ProbeOutcome::Response(_)) => inspector.ssl_info_for(&target).await,
            _ => None,
        };

        if classification.alert {
            if let Some(notifier) = &self.notifier {
                let notifier = notifier.clone();
                let url = record.url.clone();
                let status = classification.status;
                let details = classification.details.clone();
                tokio::spawn(async move {
                    notifier.send_alert(&url, status, &details).await;
                });
            }
        }

        CheckResult {
            record,
            status: classification.status,
            details: classification.details,
            response_time_ms,
            ssl_info,
        }
    }

    /// Probes every record; results come back in input order.
    pub async fn check_all(&self, records: &[UrlRecord]) -> Vec<CheckResult> {
        let start = Instant::now();
        let mut tasks: FuturesUnordered<_> = records
            .iter()
            .cloned()
            .enumerate()
            .map(|(index, record)| async move { (index, self.check_url(record).await) })
            .collect();

        let mut indexed = Vec::with_capacity(records.len());
        while let Some(done) = tasks.next().await {
            indexed.push(done);
        }
        indexed.sort_by_key(|(index, _)| *index);
        let results: Vec<CheckResult> = indexed.into_iter().map(|(_, result)| result).collect();

        let healthy = results.iter().filter(|r| is_acceptable(r.status)).count();
        info!(
            "Checked {} URLs in {:.2}s: {healthy} healthy, {} failing",
            results.len(),
            start.elapsed().as_secs_f64(),
            results.len() - healthy
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceKind;
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn record(url: String) -> UrlRecord {
        UrlRecord {
            url,
            namespace: "default".to_string(),
            name: "app".to_string(),
            resource_kind: ResourceKind::Ingress,
            annotations: Default::default(),
            labels: Default::default(),
            gateway_or_ingress_class: None,
            path: "/".to_string(),
            backend: Default::default(),
        }
    }

    fn engine(timeout: Duration, max: usize) -> ProbeEngine {
        let client = Client::builder().timeout(timeout).build().unwrap();
        ProbeEngine::new(client, max)
    }

    #[tokio::test]
    async fn test_status_classification_end_to_end() {
        let server = MockServer::start().await;
        for (route, code) in [("/ok", 200), ("/auth", 401), ("/missing", 404), ("/boom", 502)] {
            Mock::given(method("GET"))
                .and(path(route))
                .respond_with(ResponseTemplate::new(code))
                .mount(&server)
                .await;
        }

        let records: Vec<UrlRecord> = ["/ok", "/auth", "/missing", "/boom"]
            .iter()
            .map(|p| record(format!("{}{p}", server.uri())))
            .collect();
        let results = engine(Duration::from_secs(5), 4).check_all(&records).await;

        let statuses: Vec<u16> = results.iter().map(|r| r.status).collect();
        assert_eq!(statuses, vec![200, 401, 404, 502]);
        assert_eq!(results[2].details, "Not found");
        assert_eq!(results[3].details, "❌ Bad Gateway");
        assert!(results.iter().all(|r| r.ssl_info.is_none()));
        assert_eq!(results[0].record.url, records[0].url);
    }

    #[tokio::test]
    async fn test_timeout_maps_to_504() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let result = engine(Duration::from_millis(200), 1)
            .check_url(record(server.uri()))
            .await;
        assert_eq!(result.status, TIMEOUT_STATUS);
        assert!(result.details.contains("Timeout"));
    }

    #[tokio::test]
    async fn test_connection_refused_maps_to_503() {
        let result = engine(Duration::from_secs(2), 1)
            .check_url(record("http://127.0.0.1:1".to_string()))
            .await;
        assert_eq!(result.status, CONNECTION_ERROR_STATUS);
        assert!(result.details.starts_with("Connection error: "));
        assert!(result.details.chars().count() <= "Connection error: ".len() + 50);
    }

    #[tokio::test]
    async fn test_unusable_url_maps_to_500() {
        let result = engine(Duration::from_secs(2), 1)
            .check_url(record("http://exa mple.com".to_string()))
            .await;
        assert_eq!(result.status, UNEXPECTED_ERROR_STATUS);
    }

    #[test]
    fn test_zero_concurrency_is_clamped() {
        assert_eq!(engine(Duration::from_secs(1), 0).max_concurrent(), 1);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        assert!(engine(Duration::from_secs(1), 2).check_all(&[]).await.is_empty());
    }
}
