//! Discovery plus probing, shared by the scheduler and the web layer.

use std::path::PathBuf;
use std::sync::Arc;

use log::{info, warn};
use tokio::sync::Mutex;

use crate::cache::{Cache, Snapshot};
use crate::discovery::DiscoveryCache;
use crate::error_handling::DiscoveryError;
use crate::exclusion::ExclusionMatcher;
use crate::models::{CheckResult, UrlRecord};
use crate::probe::ProbeEngine;
use crate::storage::load_urls_from_file;

/// Everything a sweep needs, plus the latest published results.
pub struct PortalChecker {
    discovery: Arc<DiscoveryCache>,
    probe: ProbeEngine,
    results: Cache<Vec<CheckResult>>,
    first_sweep: Mutex<()>,
    urls_file: PathBuf,
}

impl PortalChecker {
    /// Wires discovery and probing together. `urls_file` is the fallback
    /// URL source when the cluster cannot be reached.
    pub fn new(discovery: Arc<DiscoveryCache>, probe: ProbeEngine, urls_file: PathBuf) -> Self {
        Self {
            discovery,
            probe,
            results: Cache::new(None),
            first_sweep: Mutex::new(()),
            urls_file,
        }
    }

    /// Discovery cache.
    pub fn discovery(&self) -> &Arc<DiscoveryCache> {
        &self.discovery
    }

    /// Exclusion matcher used by discovery and sweeps.
    pub fn matcher(&self) -> &Arc<ExclusionMatcher> {
        self.discovery.matcher()
    }

    /// Latest published results, if any sweep has completed.
    pub fn latest_results(&self) -> Option<Arc<Snapshot<Vec<CheckResult>>>> {
        self.results.load()
    }

    /// Records to probe.
    ///
    /// Uses the discovery cache; when discovery fails, the last snapshot is
    /// reused even if expired, then the persisted URL file.
    pub async fn resolve_urls(&self) -> Result<Vec<UrlRecord>, DiscoveryError> {
        match self.discovery.get_urls(false).await {
            Ok(snapshot) => Ok(snapshot.data.clone()),
            Err(e) => {
                if let Some(stale) = self.discovery.snapshot() {
                    warn!(
                        "Discovery failed ({e}), reusing {} previously discovered URLs",
                        stale.data.len()
                    );
                    return Ok(stale.data.clone());
                }
                let persisted = load_urls_from_file(&self.urls_file)?;
                if persisted.is_empty() {
                    return Err(e);
                }
                warn!(
                    "Discovery failed ({e}), using {} URLs from {}",
                    persisted.len(),
                    self.urls_file.display()
                );
                Ok(persisted)
            }
        }
    }

    /// Runs one sweep and publishes its results. Returns the number of
    /// results published.
    ///
    /// Exclusions are applied again because the exclusion list may have
    /// changed since discovery ran. On error the previous results stay.
    pub async fn run_sweep(&self) -> Result<usize, DiscoveryError> {
        let records = self.resolve_urls().await?;
        let matcher = self.matcher();
        let to_check: Vec<UrlRecord> = records
            .into_iter()
            .filter(|r| !matcher.is_excluded(&r.url, &r.annotations))
            .collect();

        let results = self.probe.check_all(&to_check).await;
        let count = results.len();
        self.results.publish(results);
        Ok(count)
    }

    /// Runs a sweep only if nothing was ever published. Concurrent callers
    /// share that single sweep.
    pub async fn ensure_results(&self) -> Result<(), DiscoveryError> {
        if self.latest_results().is_some() {
            return Ok(());
        }
        let _guard = self.first_sweep.lock().await;
        // Published while we waited.
        if self.latest_results().is_some() {
            return Ok(());
        }
        info!("No results yet, running an on-demand sweep");
        self.run_sweep().await.map(|_| ())
    }

    /// Forces a fresh discovery, then sweeps.
    pub async fn refresh(&self) -> Result<usize, DiscoveryError> {
        let snapshot = self.discovery.get_urls(true).await?;
        info!("Manual refresh discovered {} URLs", snapshot.data.len());
        self.run_sweep().await
    }
}
