//! # Schedulers
//!
//! Periodic drivers for the downloaders and for retention. Each runs on its
//! own task until the shutdown signal flips.
//!
//! A tick that overruns its period delays the next one instead of bursting
//! to catch up. With a leader lease configured, a download tick only runs
//! while this instance holds the lease.

use mn_04_downloader::{DownloaderApi, LeaderLease};
use mn_06_persistence::{RetentionService, RetentionSummary};
use shared_bus::{EventPublisher, MirrorEvent};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

fn ticker(frequency: Duration) -> tokio::time::Interval {
    let mut ticker = tokio::time::interval(frequency);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// True once shutdown was requested or its sender is gone.
fn stopping(changed: Result<(), watch::error::RecvError>, shutdown: &watch::Receiver<bool>) -> bool {
    changed.is_err() || *shutdown.borrow()
}

// =============================================================================
// DOWNLOAD SCHEDULER
// =============================================================================

pub struct DownloadScheduler {
    downloader: Arc<dyn DownloaderApi>,
    frequency: Duration,
    lease: Option<LeaderLease>,
}

impl DownloadScheduler {
    pub fn new(downloader: Arc<dyn DownloaderApi>, frequency: Duration) -> Self {
        Self {
            downloader,
            frequency,
            lease: None,
        }
    }

    pub fn with_lease(mut self, lease: LeaderLease) -> Self {
        self.lease = Some(lease);
        self
    }

    /// Whether this instance may download now.
    fn is_leader(&mut self) -> bool {
        let Some(lease) = self.lease.as_mut() else {
            return true;
        };
        match lease.try_acquire() {
            Ok(held) => held,
            Err(e) => {
                warn!(error = %e, "Leader lease check failed");
                false
            }
        }
    }

    /// Runs one round if leader. Returns the number of committed files.
    pub async fn tick(&mut self) -> usize {
        if !self.is_leader() {
            return 0;
        }
        let stream_type = self.downloader.stream_type();
        match self.downloader.download_round().await {
            Ok(summary) => {
                if let Some(last) = summary.committed.last() {
                    debug!(
                        stream = %stream_type,
                        files = summary.committed.len(),
                        last = %last.filename,
                        "Download round committed files"
                    );
                }
                summary.committed.len()
            }
            Err(e) => {
                warn!(stream = %stream_type, error = %e, "Download round failed");
                0
            }
        }
    }

    pub async fn run(mut self, mut shutdown: watch::Receiver<bool>) {
        let stream_type = self.downloader.stream_type();
        info!(stream = %stream_type, frequency = ?self.frequency, "Download scheduler started");

        let mut ticker = ticker(self.frequency);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if stopping(changed, &shutdown) {
                        break;
                    }
                }
            }
        }

        if let Some(lease) = self.lease.as_mut() {
            if let Err(e) = lease.release() {
                warn!(error = %e, "Failed to release leader lease");
            }
        }
        info!(stream = %stream_type, "Download scheduler stopped");
    }
}

// =============================================================================
// RETENTION SCHEDULER
// =============================================================================

pub struct RetentionScheduler {
    retention: Arc<RetentionService>,
    bus: Arc<dyn EventPublisher>,
}

impl RetentionScheduler {
    pub fn new(retention: Arc<RetentionService>, bus: Arc<dyn EventPublisher>) -> Self {
        Self { retention, bus }
    }

    /// Runs retention once on the blocking pool and announces the result.
    pub async fn tick(&self) -> Option<RetentionSummary> {
        let retention = Arc::clone(&self.retention);
        let summary = match tokio::task::spawn_blocking(move || retention.run()).await {
            Ok(Ok(summary)) => summary,
            Ok(Err(e)) => {
                error!(error = %e, "Retention failed");
                return None;
            }
            Err(e) => {
                error!(error = %e, "Retention task failed");
                return None;
            }
        };
        if let Some(cutoff) = summary.cutoff {
            self.bus
                .publish(MirrorEvent::RetentionCompleted {
                    cutoff,
                    rows_deleted: summary.deleted,
                })
                .await;
        }
        Some(summary)
    }

    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        let frequency = Duration::from_secs(self.retention.config().frequency_secs);
        info!(frequency = ?frequency, "Retention scheduler started");

        let mut ticker = ticker(frequency);
        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick().await;
                }
                changed = shutdown.changed() => {
                    if stopping(changed, &shutdown) {
                        break;
                    }
                }
            }
        }
        info!("Retention scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use mn_04_downloader::{DownloaderError, RoundSummary, StreamCursor};
    use mn_05_record_parser::ParserContext;
    use mn_06_persistence::{
        InMemoryKVStore, PersistenceApi, PersistenceService, RetentionConfig,
    };
    use shared_bus::{EventFilter, InMemoryEventBus};
    use shared_types::{Sha384Hash, StreamFilename, StreamType};
    use std::sync::atomic::{AtomicUsize, Ordering};

    const SECOND: i64 = 1_000_000_000;

    #[derive(Default)]
    struct CountingDownloader {
        rounds: AtomicUsize,
    }

    #[async_trait]
    impl DownloaderApi for CountingDownloader {
        fn stream_type(&self) -> StreamType {
            StreamType::Record
        }

        async fn download_round(&self) -> Result<RoundSummary, DownloaderError> {
            let round = self.rounds.fetch_add(1, Ordering::SeqCst) as i64;
            Ok(RoundSummary {
                committed: vec![cursor(round, round + 1)],
                skipped: false,
            })
        }
    }

    fn cursor(start: i64, end: i64) -> StreamCursor {
        StreamCursor {
            filename: StreamFilename::data(StreamType::Record, start),
            consensus_start: start,
            consensus_end: end,
            hash: Sha384Hash::ZERO,
            index: Some(start),
            count: 0,
        }
    }

    #[tokio::test]
    async fn test_tick_runs_a_round() {
        let downloader = Arc::new(CountingDownloader::default());
        let mut scheduler = DownloadScheduler::new(downloader.clone(), Duration::from_millis(10));

        assert_eq!(scheduler.tick().await, 1);
        assert_eq!(scheduler.tick().await, 1);
        assert_eq!(downloader.rounds.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_follower_does_not_download() {
        let dir = tempfile::tempdir().unwrap();
        let duration = Duration::from_secs(60);
        let mut leader = LeaderLease::with_owner(dir.path(), "record", duration, "a".into());
        assert!(leader.try_acquire().unwrap());

        let downloader = Arc::new(CountingDownloader::default());
        let follower = LeaderLease::with_owner(dir.path(), "record", duration, "b".into());
        let mut scheduler = DownloadScheduler::new(downloader.clone(), Duration::from_millis(10))
            .with_lease(follower);

        assert_eq!(scheduler.tick().await, 0);
        assert_eq!(downloader.rounds.load(Ordering::SeqCst), 0);

        leader.release().unwrap();
        assert_eq!(scheduler.tick().await, 1);
    }

    #[tokio::test]
    async fn test_run_stops_on_shutdown() {
        let downloader = Arc::new(CountingDownloader::default());
        let scheduler = DownloadScheduler::new(downloader.clone(), Duration::from_millis(5));
        let (shutdown_tx, shutdown_rx) = watch::channel(false);

        let handle = tokio::spawn(scheduler.run(shutdown_rx));
        tokio::time::sleep(Duration::from_millis(30)).await;
        shutdown_tx.send(true).unwrap();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
        assert!(downloader.rounds.load(Ordering::SeqCst) >= 1);
    }

    #[tokio::test]
    async fn test_retention_tick_publishes_completion() {
        let store = Arc::new(InMemoryKVStore::new());
        let persistence = PersistenceService::new(store.clone());
        persistence
            .commit(
                StreamType::Record,
                &cursor(190 * SECOND, 200 * SECOND),
                &ParserContext::new(None),
            )
            .unwrap();
        let config = RetentionConfig {
            enabled: true,
            frequency_secs: 1,
            period_secs: 100,
            batch_period_secs: 10,
        };
        let retention = Arc::new(RetentionService::new(store, config).unwrap());
        let bus = Arc::new(InMemoryEventBus::new());
        let mut subscription = bus.subscribe(EventFilter::all());
        let scheduler = RetentionScheduler::new(retention, bus.clone());

        let summary = scheduler.tick().await.unwrap();
        assert_eq!(summary.cutoff, Some(100 * SECOND));
        assert_eq!(summary.deleted, 0);
        assert_eq!(
            subscription.recv().await,
            Some(MirrorEvent::RetentionCompleted {
                cutoff: 100 * SECOND,
                rows_deleted: 0,
            })
        );
    }

    #[tokio::test]
    async fn test_disabled_retention_is_silent() {
        let store = Arc::new(InMemoryKVStore::new());
        let retention =
            Arc::new(RetentionService::new(store, RetentionConfig::default()).unwrap());
        let bus = Arc::new(InMemoryEventBus::new());
        let scheduler = RetentionScheduler::new(retention, bus.clone());

        assert_eq!(scheduler.tick().await, Some(RetentionSummary::default()));
        assert_eq!(bus.events_published(), 0);
    }
}
