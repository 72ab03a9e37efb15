//! Downloader settings for one stream kind.

use mn_02_signature_verification::QuorumConfig;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloaderConfig {
    /// Disabled balance downloads still fetch until one file exists.
    pub enabled: bool,
    pub frequency: Duration,
    /// Maximum files per round.
    pub batch_size: usize,
    pub node_timeout: Duration,
    pub round_timeout: Duration,
    pub max_concurrent_fetches: usize,
    pub quorum: QuorumConfig,
}

impl Default for DownloaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency: Duration::from_millis(100),
            batch_size: 100,
            node_timeout: Duration::from_secs(5),
            round_timeout: Duration::from_secs(30),
            max_concurrent_fetches: 32,
            quorum: QuorumConfig::default(),
        }
    }
}
