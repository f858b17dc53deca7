//! Periodic sweeps.

use std::sync::Arc;
use std::time::Duration;

use log::{error, info};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::config::SCHEDULER_TICK;

use super::checker::PortalChecker;

/// Sleeps for `duration` in `SCHEDULER_TICK` steps. Returns `false` if
/// `cancel` fired first.
pub async fn sleep_cancellable(duration: Duration, cancel: &CancellationToken) -> bool {
    let mut remaining = duration;
    while !remaining.is_zero() {
        let tick = remaining.min(SCHEDULER_TICK);
        tokio::select! {
            _ = cancel.cancelled() => return false,
            _ = tokio::time::sleep(tick) => {}
        }
        remaining -= tick;
    }
    !cancel.is_cancelled()
}

/// Starts the sweep loop: one sweep immediately, then one every `interval`
/// until `cancel` fires. A failed sweep is logged and the loop goes on.
///
/// Cancellation is observed between sweeps and during the wait only: a sweep
/// already running completes and publishes its results before the task ends.
pub fn spawn_scheduler(
    checker: Arc<PortalChecker>,
    interval: Duration,
    cancel: CancellationToken,
) -> JoinHandle<()> {
    let interval = interval.max(SCHEDULER_TICK);
    tokio::spawn(async move {
        info!("Scheduler started, sweeping every {}s", interval.as_secs());
        while !cancel.is_cancelled() {
            if let Err(e) = checker.run_sweep().await {
                error!("Sweep failed, keeping previous results: {e}");
            }
            if !sleep_cancellable(interval, &cancel).await {
                break;
            }
        }
        info!("Scheduler stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::checker::test_support::harness;
    use crate::discovery::fake::FakeCluster;

    #[tokio::test(start_paused = true)]
    async fn test_sleep_completes_without_cancel() {
        let cancel = CancellationToken::new();
        assert!(sleep_cancellable(Duration::from_millis(2500), &cancel).await);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sleep_interrupted_by_cancel() {
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            trigger.cancel();
        });
        let start = tokio::time::Instant::now();
        assert!(!sleep_cancellable(Duration::from_secs(3600), &cancel).await);
        assert!(start.elapsed() < Duration::from_secs(3));
    }

    #[tokio::test]
    async fn test_scheduler_sweeps_and_stops() {
        let h = harness(FakeCluster::with_route("apps", "app", &["127.0.0.1:1"]));
        let cancel = CancellationToken::new();
        let handle = spawn_scheduler(h.checker.clone(), Duration::from_secs(60), cancel.clone());

        let mut published = false;
        for _ in 0..100 {
            if h.checker.latest_results().is_some() {
                published = true;
                break;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
        assert!(published);

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_scheduler_survives_failing_discovery() {
        let cluster = FakeCluster::default();
        cluster.set_failing(true);
        let h = harness(cluster);
        let cancel = CancellationToken::new();
        let handle = spawn_scheduler(h.checker.clone(), Duration::from_secs(1), cancel.clone());

        tokio::time::sleep(Duration::from_millis(1500)).await;
        assert!(!handle.is_finished());
        assert!(h.checker.latest_results().is_none());

        cancel.cancel();
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancel_during_sweep_still_publishes() {
        // Accepts connections and never answers, so the probe runs until its timeout
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let host = addr.to_string();
        let h = harness(FakeCluster::with_route("apps", "stalled", &[host.as_str()]));
        let cancel = CancellationToken::new();
        let handle = spawn_scheduler(h.checker.clone(), Duration::from_secs(60), cancel.clone());

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(h.checker.latest_results().is_none());
        cancel.cancel();

        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .unwrap()
            .unwrap();
        let results = h.checker.latest_results().unwrap();
        assert_eq!(results.data.len(), 1);
        assert_eq!(results.data[0].record.url, host);
        assert_eq!(results.data[0].status, 504);
    }

    #[tokio::test]
    async fn test_cancelled_before_start_never_sweeps() {
        let h = harness(FakeCluster::with_route("apps", "app", &["127.0.0.1:1"]));
        let cancel = CancellationToken::new();
        cancel.cancel();

        spawn_scheduler(h.checker.clone(), Duration::from_secs(60), cancel)
            .await
            .unwrap();
        assert!(h.checker.latest_results().is_none());
    }
}
