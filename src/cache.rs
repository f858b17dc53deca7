//! Single-slot snapshot cache.
//!
//! A `Cache<T>` holds at most one immutable `Snapshot<T>`. Writers build a new
//! snapshot and swap it in; readers clone an `Arc` to whichever snapshot is
//! current and never see a half-written one. No lock is held by readers.

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwapOption;
use chrono::{DateTime, Utc};

/// One published value with its timestamps.
#[derive(Debug)]
pub struct Snapshot<T> {
    /// Published value
    pub data: T,
    /// When the value was published
    pub last_updated: DateTime<Utc>,
    /// When the value stops being fresh, `None` for caches without a TTL
    pub expiry: Option<DateTime<Utc>>,
}

impl<T> Snapshot<T> {
    /// Whether the snapshot is still within its TTL at `now`.
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            Some(expiry) => now < expiry,
            None => true,
        }
    }

    /// Whether the snapshot is still within its TTL.
    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }
}

/// Atomically replaced cache slot.
#[derive(Debug)]
pub struct Cache<T> {
    slot: ArcSwapOption<Snapshot<T>>,
    ttl: Option<Duration>,
}

impl<T> Cache<T> {
    /// Creates an empty cache. Snapshots expire after `ttl`, or never when `None`.
    pub fn new(ttl: Option<Duration>) -> Self {
        Self {
            slot: ArcSwapOption::const_empty(),
            ttl,
        }
    }

    /// Current snapshot, fresh or not.
    pub fn load(&self) -> Option<Arc<Snapshot<T>>> {
        self.slot.load_full()
    }

    /// Current snapshot if it is still fresh.
    pub fn load_fresh(&self) -> Option<Arc<Snapshot<T>>> {
        self.load().filter(|snapshot| snapshot.is_fresh())
    }

    /// Replaces the slot with a new snapshot of `data`.
    pub fn publish(&self, data: T) -> Arc<Snapshot<T>> {
        let now = Utc::now();
        // A TTL too large to represent never expires.
        let expiry = self.ttl.and_then(|ttl| {
            chrono::Duration::from_std(ttl)
                .ok()
                .and_then(|ttl| now.checked_add_signed(ttl))
        });
        let snapshot = Arc::new(Snapshot {
            data,
            last_updated: now,
            expiry,
        });
        self.slot.store(Some(Arc::clone(&snapshot)));
        snapshot
    }

    /// Empties the slot.
    pub fn clear(&self) {
        self.slot.store(None);
    }

    /// Whether a snapshot was ever published (and not cleared since).
    pub fn is_populated(&self) -> bool {
        self.slot.load().is_some()
    }
}

impl<T: Clone> Cache<T> {
    /// Marks the current snapshot as expired while keeping its data readable.
    pub fn expire(&self) {
        if let Some(current) = self.load() {
            let expired = Arc::new(Snapshot {
                data: current.data.clone(),
                last_updated: current.last_updated,
                expiry: Some(Utc::now() - chrono::Duration::seconds(1)),
            });
            // Only replace the snapshot we looked at; a concurrent publish wins.
            let _ = self.slot.compare_and_swap(&Some(current), Some(expired));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_cache() {
        let cache: Cache<Vec<u32>> = Cache::new(Some(Duration::from_secs(60)));
        assert!(cache.load().is_none());
        assert!(cache.load_fresh().is_none());
        assert!(!cache.is_populated());
    }

    #[test]
    fn test_publish_and_load() {
        let cache = Cache::new(Some(Duration::from_secs(60)));
        cache.publish(vec![1, 2, 3]);
        let snapshot = cache.load_fresh().unwrap();
        assert_eq!(snapshot.data, vec![1, 2, 3]);
        assert!(snapshot.expiry.unwrap() > snapshot.last_updated);
    }

    #[test]
    fn test_zero_ttl_is_never_fresh() {
        let cache = Cache::new(Some(Duration::ZERO));
        cache.publish("value");
        assert!(cache.load().is_some());
        assert!(cache.load_fresh().is_none());
    }

    #[test]
    fn test_no_ttl_is_always_fresh() {
        let cache = Cache::new(None);
        cache.publish(7);
        let snapshot = cache.load_fresh().unwrap();
        assert!(snapshot.expiry.is_none());
    }

    #[test]
    fn test_readers_keep_old_snapshot_after_publish() {
        let cache = Cache::new(None);
        cache.publish(vec!["old"]);
        let held = cache.load().unwrap();
        cache.publish(vec!["new"]);
        assert_eq!(held.data, vec!["old"]);
        assert_eq!(cache.load().unwrap().data, vec!["new"]);
    }

    #[test]
    fn test_expire_keeps_data() {
        let cache = Cache::new(Some(Duration::from_secs(600)));
        cache.publish(vec![1]);
        cache.expire();
        assert!(cache.load_fresh().is_none());
        assert_eq!(cache.load().unwrap().data, vec![1]);
    }

    #[test]
    fn test_clear() {
        let cache = Cache::new(None);
        cache.publish(1);
        cache.clear();
        assert!(!cache.is_populated());
    }
}
