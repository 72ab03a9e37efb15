//! # Importer Runtime
//!
//! Starts one scheduler task per enabled driver and stops them together.
//!
//! ## Startup Sequence
//!
//! 1. Record download scheduler
//! 2. Balance download scheduler. Runs even when balance downloads are
//!    disabled; the downloader fetches the first file and then idles.
//! 3. Retention scheduler, if enabled

use crate::container::ImporterContainer;
use crate::scheduler::{DownloadScheduler, RetentionScheduler};
use mn_04_downloader::{DownloaderApi, LeaderLease};
use shared_types::StreamType;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

pub struct ImporterRuntime {
    container: Arc<ImporterContainer>,
    shutdown_tx: watch::Sender<bool>,
    shutdown_rx: watch::Receiver<bool>,
    tasks: Vec<JoinHandle<()>>,
}

impl ImporterRuntime {
    pub fn new(container: ImporterContainer) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        Self {
            container: Arc::new(container),
            shutdown_tx,
            shutdown_rx,
            tasks: Vec::new(),
        }
    }

    pub fn container(&self) -> &Arc<ImporterContainer> {
        &self.container
    }

    fn download_scheduler(
        &self,
        downloader: Arc<dyn DownloaderApi>,
        frequency_ms: u64,
    ) -> DownloadScheduler {
        let stream_type: StreamType = downloader.stream_type();
        let scheduler = DownloadScheduler::new(downloader, Duration::from_millis(frequency_ms));
        let leader = &self.container.config.leader;
        if !leader.enabled {
            return scheduler;
        }
        scheduler.with_lease(LeaderLease::new(
            &self.container.config.importer.data_dir,
            stream_type.as_str(),
            leader.lease_duration(),
        ))
    }

    /// Spawns the schedulers.
    pub fn start(&mut self) {
        let config = &self.container.config;
        info!("===========================================");
        info!("  Mirror Node Importer v{}", env!("CARGO_PKG_VERSION"));
        info!("===========================================");
        info!(
            network = %config.importer.network.display(),
            data_dir = %config.importer.data_dir.display(),
            "Starting importer"
        );

        let record = self.download_scheduler(
            self.container.record_downloader.clone(),
            config.downloader.record.frequency_ms,
        );
        let balance = self.download_scheduler(
            self.container.balance_downloader.clone(),
            config.downloader.balance.frequency_ms,
        );
        self.tasks
            .push(tokio::spawn(record.run(self.shutdown_rx.clone())));
        self.tasks
            .push(tokio::spawn(balance.run(self.shutdown_rx.clone())));

        if self.container.config.retention.enabled {
            let retention = RetentionScheduler::new(
                self.container.retention.clone(),
                self.container.bus.clone(),
            );
            self.tasks
                .push(tokio::spawn(retention.run(self.shutdown_rx.clone())));
        }
        info!(tasks = self.tasks.len(), "Importer running");
    }

    /// Signals every scheduler and waits for in-flight rounds to finish.
    pub async fn shutdown(&mut self) {
        info!("Shutting down importer");
        let _ = self.shutdown_tx.send(true);
        for task in self.tasks.drain(..) {
            if let Err(e) = task.await {
                warn!(error = %e, "Scheduler task ended abnormally");
            }
        }
        info!("Importer stopped");
    }
}
