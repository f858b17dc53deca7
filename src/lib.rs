//! portal_checker library: Kubernetes endpoint discovery and availability probing
//!
//! The checker lists every Ingress and Gateway API HTTPRoute in the cluster,
//! turns their host and path rules into URLs, drops the excluded ones and
//! probes the rest on a fixed interval. Results are served as an HTML
//! dashboard and a JSON API.
//!
//! # Example
//!
//! ```no_run
//! use portal_checker::{run_portal_checker, Config};
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let config = Config {
//!     port: 8080,
//!     check_interval_secs: 60,
//!     ..Default::default()
//! };
//!
//! // Runs until Ctrl-C or SIGTERM
//! run_portal_checker(config).await?;
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime. Use `#[tokio::main]` in your application
//! or ensure you're calling library functions within an async context.

#![warn(missing_docs)]

pub mod app;
pub mod cache;
pub mod config;
pub mod discovery;
pub mod error_handling;
pub mod exclusion;
pub mod initialization;
pub mod models;
pub mod notify;
pub mod probe;
pub mod status_server;
pub mod storage;
pub mod tls;

// Re-export public API
pub use app::PortalChecker;
pub use config::{Config, LogFormat, LogLevel};
pub use models::{CheckResult, ResourceKind, UrlRecord};
pub use run::{build_checker, run_portal_checker};

// Internal run module (wires the components together)
mod run {
    use std::sync::Arc;

    use anyhow::{Context, Result};
    use log::{info, warn};
    use tokio_util::sync::CancellationToken;

    use crate::app::{shutdown_gracefully, shutdown_signal, spawn_scheduler, PortalChecker};
    use crate::config::Config;
    use crate::discovery::{ClusterSource, DiscoveryCache, KubeClusterSource};
    use crate::exclusion::ExclusionMatcher;
    use crate::initialization::{init_client, init_kube_client};
    use crate::notify::SlackNotifier;
    use crate::probe::ProbeEngine;
    use crate::status_server::{start_status_server, AppState};
    use crate::storage::load_urls_from_file;
    use crate::tls::{build_root_store, SslInspector};

    /// Builds a checker over `source` from the configuration.
    ///
    /// Nothing is discovered or probed yet; see [`run_portal_checker`] for
    /// the startup sequence.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client or the TLS inspector cannot be
    /// built, which only happens with an unreadable custom CA bundle.
    pub fn build_checker(config: &Config, source: Arc<dyn ClusterSource>) -> Result<PortalChecker> {
        let client = init_client(config).context("Failed to initialize HTTP client")?;

        let matcher = Arc::new(ExclusionMatcher::new(
            config.excluded_urls_file.clone(),
            config.exclusion_cache_ttl(),
        ));
        let discovery = Arc::new(
            DiscoveryCache::new(source, matcher, config.discovery_cache_ttl())
                .with_urls_file(config.urls_file.clone()),
        );

        let mut probe = ProbeEngine::new(client.clone(), config.max_concurrent_requests);
        if config.enable_ssl_info {
            let roots = build_root_store(config.custom_cert.as_deref())
                .context("Failed to load trusted certificates")?;
            probe = probe.with_ssl_inspector(
                SslInspector::new(roots).context("Failed to build TLS inspector")?,
            );
        }
        if let Some(webhook) = config.slack_webhook() {
            info!("Slack alerts enabled");
            probe = probe.with_notifier(SlackNotifier::new(client, webhook));
        } else if config.enable_slack_notifications {
            warn!("Slack alerts enabled but SLACK_WEBHOOK_URL is not set");
        }

        Ok(PortalChecker::new(
            discovery,
            probe,
            config.urls_file.clone(),
        ))
    }

    /// Primes the discovery cache before the first sweep.
    ///
    /// With auto refresh, discovery runs right away and the persisted URL
    /// file is the fallback. Without it, the file alone seeds the cache.
    async fn prime_discovery(checker: &PortalChecker, config: &Config) {
        let discovery = checker.discovery();
        if config.auto_refresh_on_start {
            match discovery.get_urls(true).await {
                Ok(snapshot) => {
                    info!("Initial discovery found {} URLs", snapshot.data.len());
                    return;
                }
                Err(e) => warn!("Initial discovery failed: {e}"),
            }
        }

        match load_urls_from_file(&config.urls_file) {
            Ok(records) if !records.is_empty() => {
                info!(
                    "Loaded {} URLs from {}",
                    records.len(),
                    config.urls_file.display()
                );
                discovery.seed(records);
            }
            Ok(_) => info!("No persisted URLs in {}", config.urls_file.display()),
            Err(e) => warn!("Failed to load persisted URLs: {e}"),
        }
    }

    /// Runs the checker until Ctrl-C or SIGTERM.
    ///
    /// Connects to the cluster, primes discovery, starts the sweep scheduler
    /// and serves the dashboard. On a shutdown signal the server stops
    /// accepting requests and the scheduler is cancelled and joined.
    ///
    /// # Errors
    ///
    /// Returns an error if a client cannot be initialized or the web server
    /// cannot bind its address.
    pub async fn run_portal_checker(config: Config) -> Result<()> {
        info!(
            "Starting {} {} (kube env {:?}, app env {:?})",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION"),
            config.kube_env,
            config.app_env
        );

        let kube_client = init_kube_client(&config.kube_env)
            .await
            .context("Failed to connect to Kubernetes")?;
        let source: Arc<dyn ClusterSource> = Arc::new(KubeClusterSource::new(kube_client));
        let checker = Arc::new(build_checker(&config, source)?);

        prime_discovery(&checker, &config).await;

        let cancel = CancellationToken::new();
        let scheduler = spawn_scheduler(
            Arc::clone(&checker),
            config.check_interval(),
            cancel.clone(),
        );

        let signal_token = cancel.clone();
        tokio::spawn(async move {
            shutdown_signal().await;
            signal_token.cancel();
        });

        let served = start_status_server(
            &config.bind_address,
            config.port,
            AppState::new(Arc::clone(&checker)),
            cancel.clone(),
        )
        .await;

        shutdown_gracefully(cancel, Some(scheduler)).await;
        info!("Shutdown complete");
        served
    }
}
