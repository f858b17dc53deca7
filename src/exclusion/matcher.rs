//! Cached exclusion matcher.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};

use crate::cache::{Cache, Snapshot};
use crate::config::EXCLUDE_ANNOTATION;
use crate::error_handling::ExclusionError;

use super::file::read_exclusion_file;
use super::pattern::{compile_patterns, normalize_url, ExclusionPattern};

/// Decides whether a URL is skipped.
///
/// Patterns are loaded from the exclusion file on first use and kept for the
/// configured TTL. `invalidate` drops them so the next call re-reads the file.
#[derive(Debug)]
pub struct ExclusionMatcher {
    path: PathBuf,
    patterns: Cache<Vec<ExclusionPattern>>,
}

impl ExclusionMatcher {
    /// Creates a matcher reading `path`, caching patterns for `ttl`.
    pub fn new(path: impl Into<PathBuf>, ttl: Duration) -> Self {
        Self {
            path: path.into(),
            patterns: Cache::new(Some(ttl)),
        }
    }

    /// Location of the exclusion file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Forgets the cached patterns.
    pub fn invalidate(&self) {
        self.patterns.clear();
        debug!("Exclusion pattern cache invalidated");
    }

    /// Current pattern list, reloading it from disk when stale.
    pub fn patterns(&self) -> Arc<Snapshot<Vec<ExclusionPattern>>> {
        if let Some(snapshot) = self.patterns.load_fresh() {
            return snapshot;
        }
        self.patterns.publish(self.load_from_disk())
    }

    fn load_from_disk(&self) -> Vec<ExclusionPattern> {
        match read_exclusion_file(&self.path) {
            Ok(Some(raw)) => {
                let compiled = compile_patterns(&raw);
                info!(
                    "Loaded {} exclusion patterns from {}",
                    compiled.len(),
                    self.path.display()
                );
                debug!("Exclusion patterns: {raw:?}");
                compiled
            }
            Ok(None) => {
                warn!("Exclusion file not found: {}", self.path.display());
                Vec::new()
            }
            Err(
                e @ (ExclusionError::Syntax(_)
                | ExclusionError::Format(_)
                | ExclusionError::NotAList),
            ) => {
                error!(
                    "Exclusion file {} is malformed, ignoring all exclusions: {e}",
                    self.path.display()
                );
                Vec::new()
            }
            Err(e) => {
                error!(
                    "Failed to read exclusion file {}: {e}",
                    self.path.display()
                );
                Vec::new()
            }
        }
    }

    /// Whether `url` (owned by a resource carrying `annotations`) is excluded.
    ///
    /// The exclude annotation wins over everything; otherwise the first
    /// matching pattern in document order excludes the URL.
    pub fn is_excluded(&self, url: &str, annotations: &BTreeMap<String, String>) -> bool {
        if has_exclude_annotation(annotations) {
            return true;
        }
        matches_any(&self.patterns().data, url)
    }
}

/// Whether the exclude annotation is set to `true` (case-insensitive).
pub fn has_exclude_annotation(annotations: &BTreeMap<String, String>) -> bool {
    annotations
        .get(EXCLUDE_ANNOTATION)
        .is_some_and(|value| value.trim().eq_ignore_ascii_case("true"))
}

/// Whether any pattern matches `url`.
pub fn matches_any(patterns: &[ExclusionPattern], url: &str) -> bool {
    let normalized = normalize_url(url).to_lowercase();
    patterns
        .iter()
        .any(|pattern| pattern.matches_normalized(&normalized))
}
