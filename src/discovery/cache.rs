//! TTL cache in front of discovery.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::Serialize;
use tokio::sync::Mutex;

use crate::cache::{Cache, Snapshot};
use crate::error_handling::DiscoveryError;
use crate::exclusion::ExclusionMatcher;
use crate::models::UrlRecord;
use crate::storage::save_urls_to_file;

use super::{discover, ClusterSource};

/// Cache state reported by the `/cache` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DiscoveryCacheInfo {
    /// Whether a snapshot exists at all
    pub has_data: bool,
    /// Records in the current snapshot
    pub url_count: usize,
    /// Publication time of the current snapshot
    pub last_updated: Option<DateTime<Utc>>,
    /// Expiry of the current snapshot
    pub expiry: Option<DateTime<Utc>>,
    /// Whether the snapshot is present and unexpired
    pub is_valid: bool,
}

/// Discovered records, refreshed at most once per TTL.
///
/// Refreshes are serialized: callers arriving while a refresh runs wait for
/// it and then reuse its result instead of starting another one. A failed
/// refresh leaves the previous snapshot in place.
pub struct DiscoveryCache {
    source: Arc<dyn ClusterSource>,
    matcher: Arc<ExclusionMatcher>,
    cache: Cache<Vec<UrlRecord>>,
    refresh_lock: Mutex<()>,
    urls_file: Option<PathBuf>,
}

impl DiscoveryCache {
    /// Creates an empty cache whose snapshots live for `ttl`.
    pub fn new(
        source: Arc<dyn ClusterSource>,
        matcher: Arc<ExclusionMatcher>,
        ttl: Duration,
    ) -> Self {
        Self {
            source,
            matcher,
            cache: Cache::new(Some(ttl)),
            refresh_lock: Mutex::new(()),
            urls_file: None,
        }
    }

    /// Also writes every fresh discovery result to `path`.
    pub fn with_urls_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.urls_file = Some(path.into());
        self
    }

    /// Exclusion matcher used by discovery.
    pub fn matcher(&self) -> &Arc<ExclusionMatcher> {
        &self.matcher
    }

    /// Current snapshot, even if expired.
    pub fn snapshot(&self) -> Option<Arc<Snapshot<Vec<UrlRecord>>>> {
        self.cache.load()
    }

    /// Discovered records, running discovery when the snapshot is missing,
    /// expired, or `force_refresh` is set.
    pub async fn get_urls(
        &self,
        force_refresh: bool,
    ) -> Result<Arc<Snapshot<Vec<UrlRecord>>>, DiscoveryError> {
        if !force_refresh {
            if let Some(snapshot) = self.cache.load_fresh() {
                debug!("Serving {} URLs from discovery cache", snapshot.data.len());
                return Ok(snapshot);
            }
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller may have refreshed while we waited.
        if !force_refresh {
            if let Some(snapshot) = self.cache.load_fresh() {
                return Ok(snapshot);
            }
        }

        let records = discover(self.source.as_ref(), &self.matcher).await?;
        let snapshot = self.cache.publish(records);
        info!(
            "Discovery cache updated with {} URLs (expires {})",
            snapshot.data.len(),
            snapshot
                .expiry
                .map(|e| e.to_rfc3339())
                .unwrap_or_else(|| "never".to_string())
        );

        if let Some(path) = &self.urls_file {
            if let Err(e) = save_urls_to_file(path, &snapshot.data) {
                warn!("Failed to persist discovered URLs: {e}");
            }
        }

        Ok(snapshot)
    }

    /// Publishes records obtained elsewhere (the persisted URL file) as if
    /// discovery had returned them.
    pub fn seed(&self, records: Vec<UrlRecord>) -> Arc<Snapshot<Vec<UrlRecord>>> {
        info!("Discovery cache seeded with {} URLs", records.len());
        self.cache.publish(records)
    }

    /// Drops the snapshot; the next `get_urls` runs discovery.
    pub fn clear(&self) {
        self.cache.clear();
        info!("Discovery cache cleared");
    }

    /// Expires the snapshot and runs discovery again.
    pub async fn force_refresh(&self) -> Result<Arc<Snapshot<Vec<UrlRecord>>>, DiscoveryError> {
        self.cache.expire();
        self.get_urls(false).await
    }

    /// Describes the current snapshot.
    pub fn info(&self) -> DiscoveryCacheInfo {
        match self.cache.load() {
            Some(snapshot) => DiscoveryCacheInfo {
                has_data: true,
                url_count: snapshot.data.len(),
                last_updated: Some(snapshot.last_updated),
                expiry: snapshot.expiry,
                is_valid: snapshot.is_fresh(),
            },
            None => DiscoveryCacheInfo {
                has_data: false,
                url_count: 0,
                last_updated: None,
                expiry: None,
                is_valid: false,
            },
        }
    }
}
