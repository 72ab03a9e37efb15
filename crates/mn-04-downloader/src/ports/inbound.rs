//! # Inbound Ports (Driving Ports)

use crate::domain::chain::StreamCursor;
use crate::domain::errors::DownloaderError;
use async_trait::async_trait;
use shared_types::StreamType;

/// Outcome of one scheduled round.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RoundSummary {
    /// Files committed in order.
    pub committed: Vec<StreamCursor>,
    /// The round did not run: another round was in flight or downloads
    /// are disabled.
    pub skipped: bool,
}

impl RoundSummary {
    pub fn skipped() -> Self {
        Self {
            committed: Vec::new(),
            skipped: true,
        }
    }
}

#[async_trait]
pub trait DownloaderApi: Send + Sync {
    fn stream_type(&self) -> StreamType;

    /// Downloads, verifies and hands on the next batch of files.
    ///
    /// Files are committed strictly in order. The first failing file ends
    /// the round; everything committed before it stays committed and the
    /// failing file is retried next round.
    async fn download_round(&self) -> Result<RoundSummary, DownloaderError>;
}
