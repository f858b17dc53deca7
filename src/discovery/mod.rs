//! Kubernetes URL discovery.
//!
//! A discovery pass enumerates namespaces, lists HTTPRoutes per namespace and
//! Ingresses cluster-wide, turns every `host × path` into a `UrlRecord`, drops
//! excluded URLs and deduplicates on `(url, namespace, name)`.
//!
//! Only a namespace enumeration failure aborts the pass. A namespace whose
//! HTTPRoutes cannot be listed (for example because the Gateway API CRDs are
//! not installed) is skipped with a warning.

mod annotations;
mod cache;
mod httproute;
mod ingress;
mod source;

use std::collections::HashSet;

use futures::stream::{self, StreamExt};
use log::{debug, error, info, warn};

use crate::config::DISCOVERY_NAMESPACE_CONCURRENCY;
use crate::error_handling::{sanitize_error_message, DiscoveryError};
use crate::exclusion::ExclusionMatcher;
use crate::models::UrlRecord;

// Re-export public API
pub use annotations::filter_annotations;
pub use cache::{DiscoveryCache, DiscoveryCacheInfo};
pub use httproute::records_from_http_route;
pub use ingress::{ingress_class, records_from_ingress};
pub use source::{http_route_api_resource, ClusterSource, KubeClusterSource};

/// Declared path with a leading `/`; `/` when absent or empty.
pub(crate) fn normalize_path(path: Option<&str>) -> String {
    match path.map(str::trim) {
        None | Some("") => "/".to_string(),
        Some(p) if p.starts_with('/') => p.to_string(),
        Some(p) => format!("/{p}"),
    }
}

/// `host` when `path` is `/`, `host + path` otherwise.
pub(crate) fn url_for(host: &str, path: &str) -> String {
    if path == "/" {
        host.to_string()
    } else {
        format!("{host}{path}")
    }
}

/// Drops records whose `(url, namespace, name)` was already seen, keeping the
/// first occurrence and the input order.
pub fn deduplicate(records: Vec<UrlRecord>) -> Vec<UrlRecord> {
    let total = records.len();
    let mut seen = HashSet::with_capacity(total);
    let unique: Vec<UrlRecord> = records
        .into_iter()
        .filter(|record| {
            seen.insert((
                record.url.clone(),
                record.namespace.clone(),
                record.name.clone(),
            ))
        })
        .collect();
    let duplicates = total - unique.len();
    if duplicates > 0 {
        info!("Removed {duplicates} duplicate URL records");
    }
    unique
}

/// Runs one discovery pass against `source`.
pub async fn discover(
    source: &dyn ClusterSource,
    matcher: &ExclusionMatcher,
) -> Result<Vec<UrlRecord>, DiscoveryError> {
    let namespaces = source.list_namespaces().await.map_err(|e| {
        let message = sanitize_error_message(&format!("{e:#}"));
        error!("Namespace enumeration failed: {message}");
        DiscoveryError::ClusterApi(message)
    })?;
    debug!("Discovering routes in {} namespaces", namespaces.len());

    // `buffered` keeps namespace order, so deduplication stays deterministic.
    let per_namespace: Vec<(String, anyhow::Result<_>)> = stream::iter(namespaces)
        .map(|namespace| async move {
            let routes = source.list_http_routes(&namespace).await;
            (namespace, routes)
        })
        .buffered(DISCOVERY_NAMESPACE_CONCURRENCY)
        .collect()
        .await;

    let mut candidates = Vec::new();
    for (namespace, routes) in per_namespace {
        match routes {
            Ok(routes) => {
                for route in &routes {
                    candidates.extend(records_from_http_route(&namespace, route));
                }
            }
            Err(e) => warn!(
                "Skipping HTTPRoutes in namespace {namespace}: {}",
                sanitize_error_message(&format!("{e:#}"))
            ),
        }
    }

    match source.list_ingresses().await {
        Ok(ingresses) => {
            for ingress in &ingresses {
                candidates.extend(records_from_ingress(ingress));
            }
        }
        Err(e) => warn!(
            "Ingress listing failed, continuing without ingresses: {}",
            sanitize_error_message(&format!("{e:#}"))
        ),
    }

    let generated = candidates.len();
    let kept: Vec<UrlRecord> = candidates
        .into_iter()
        .filter(|record| {
            let excluded = matcher.is_excluded(&record.url, &record.annotations);
            if excluded {
                debug!("Excluded URL: {}", record.url);
            }
            !excluded
        })
        .collect();
    info!(
        "{generated} URLs generated, {} excluded",
        generated - kept.len()
    );

    Ok(deduplicate(kept))
}
