//! # Importer Configuration
//!
//! Unified configuration for all subsystems and runtime parameters.
//!
//! Loaded in three steps:
//!
//! 1. defaults, overlaid by an optional TOML file
//! 2. `MN_*` environment variable overrides
//! 3. validation
//!
//! Durations carry their unit in the field name.
//!
//! ```toml
//! [importer]
//! network = "/data/streams"
//! start_date = "2024-01-01T00:00:00Z"
//!
//! [downloader.record]
//! frequency_ms = 500
//! quorum_mode = "stake"
//!
//! [retention]
//! enabled = true
//! period_secs = 7776000
//! ```

use mn_02_signature_verification::{QuorumConfig, QuorumMode, Threshold};
use mn_04_downloader::DownloaderConfig;
use mn_05_record_parser::ParserConfig;
use mn_06_persistence::RetentionConfig;
use serde::{Deserialize, Serialize};
use shared_types::ConsensusTimestamp;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to read {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to parse configuration: {0}")]
    Parse(String),

    #[error("{var}={value} is not valid: {reason}")]
    Env {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Complete importer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterConfig {
    pub importer: ImporterSection,
    pub downloader: DownloaderSection,
    pub parser: ParserConfig,
    pub retention: RetentionConfig,
    pub leader: LeaderConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImporterSection {
    /// Store and lease files.
    pub data_dir: PathBuf,
    /// Root of the stream file bucket.
    pub network: PathBuf,
    /// RFC 3339 instant. Files before it are never fetched.
    pub start_date: Option<String>,
    /// RFC 3339 instant, inclusive.
    pub end_date: Option<String>,
    /// Raw address book file effective from genesis.
    pub bootstrap_address_book: PathBuf,
}

impl Default for ImporterSection {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            network: PathBuf::from("./streams"),
            start_date: None,
            end_date: None,
            bootstrap_address_book: PathBuf::from("./addressbook.bin"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloaderSection {
    pub record: StreamDownloaderConfig,
    pub balance: StreamDownloaderConfig,
}

impl Default for DownloaderSection {
    fn default() -> Self {
        Self {
            record: StreamDownloaderConfig::default(),
            balance: StreamDownloaderConfig {
                enabled: false,
                frequency_ms: 30_000,
                ..StreamDownloaderConfig::default()
            },
        }
    }
}

/// Settings of one stream kind's downloader.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamDownloaderConfig {
    pub enabled: bool,
    pub frequency_ms: u64,
    pub batch_size: usize,
    pub node_timeout_ms: u64,
    pub round_timeout_ms: u64,
    pub max_concurrent_fetches: usize,
    /// `stake` or `count`.
    pub quorum_mode: String,
    pub threshold_numerator: u64,
    pub threshold_denominator: u64,
}

impl Default for StreamDownloaderConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            frequency_ms: 100,
            batch_size: 100,
            node_timeout_ms: 5_000,
            round_timeout_ms: 30_000,
            max_concurrent_fetches: 32,
            quorum_mode: "stake".to_string(),
            threshold_numerator: 1,
            threshold_denominator: 2,
        }
    }
}

impl StreamDownloaderConfig {
    pub fn quorum(&self) -> Result<QuorumConfig, ConfigError> {
        let mode = match self.quorum_mode.to_ascii_lowercase().as_str() {
            "stake" => QuorumMode::Stake,
            "count" => QuorumMode::Count,
            other => {
                return Err(ConfigError::Invalid(format!(
                    "quorum_mode must be stake or count, got {other}"
                )))
            }
        };
        let threshold = Threshold::new(self.threshold_numerator, self.threshold_denominator)
            .ok_or_else(|| {
                ConfigError::Invalid(format!(
                    "threshold {}/{} must lie in (0, 1]",
                    self.threshold_numerator, self.threshold_denominator
                ))
            })?;
        Ok(QuorumConfig { mode, threshold })
    }

    pub fn to_downloader_config(&self) -> Result<DownloaderConfig, ConfigError> {
        Ok(DownloaderConfig {
            enabled: self.enabled,
            frequency: Duration::from_millis(self.frequency_ms),
            batch_size: self.batch_size,
            node_timeout: Duration::from_millis(self.node_timeout_ms),
            round_timeout: Duration::from_millis(self.round_timeout_ms),
            max_concurrent_fetches: self.max_concurrent_fetches,
            quorum: self.quorum()?,
        })
    }

    fn validate(&self, name: &str) -> Result<(), ConfigError> {
        let positive = [
            ("frequency_ms", self.frequency_ms),
            ("batch_size", self.batch_size as u64),
            ("node_timeout_ms", self.node_timeout_ms),
            ("round_timeout_ms", self.round_timeout_ms),
            ("max_concurrent_fetches", self.max_concurrent_fetches as u64),
        ];
        for (field, value) in positive {
            if value == 0 {
                return Err(ConfigError::Invalid(format!(
                    "downloader.{name}.{field} must be positive"
                )));
            }
        }
        self.quorum().map(|_| ())
    }
}

/// Multi-instance coordination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderConfig {
    pub enabled: bool,
    pub lease_duration_ms: u64,
}

impl Default for LeaderConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            lease_duration_ms: 30_000,
        }
    }
}

impl LeaderConfig {
    pub fn lease_duration(&self) -> Duration {
        Duration::from_millis(self.lease_duration_ms)
    }
}

// =============================================================================
// LOADING
// =============================================================================

impl ImporterConfig {
    /// Defaults, the TOML file if given, the process environment, then
    /// validation.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|var| std::env::var(var).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Applies `MN_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("MN_DATA_DIR") {
            self.importer.data_dir = PathBuf::from(value);
        }
        if let Some(value) = lookup("MN_NETWORK") {
            self.importer.network = PathBuf::from(value);
        }
        if let Some(value) = lookup("MN_START_DATE") {
            self.importer.start_date = Some(value);
        }
        if let Some(value) = lookup("MN_END_DATE") {
            self.importer.end_date = Some(value);
        }
        if let Some(value) = lookup("MN_BOOTSTRAP_ADDRESS_BOOK") {
            self.importer.bootstrap_address_book = PathBuf::from(value);
        }

        override_parsed(&lookup, "MN_RECORD_ENABLED", &mut self.downloader.record.enabled)?;
        override_parsed(
            &lookup,
            "MN_RECORD_FREQUENCY_MS",
            &mut self.downloader.record.frequency_ms,
        )?;
        override_parsed(&lookup, "MN_BALANCE_ENABLED", &mut self.downloader.balance.enabled)?;
        override_parsed(
            &lookup,
            "MN_BALANCE_FREQUENCY_MS",
            &mut self.downloader.balance.frequency_ms,
        )?;
        if let Some(value) = lookup("MN_QUORUM_MODE") {
            self.downloader.record.quorum_mode = value.clone();
            self.downloader.balance.quorum_mode = value;
        }

        override_parsed(&lookup, "MN_HALT_ON_ERROR", &mut self.parser.halt_on_error)?;
        override_parsed(&lookup, "MN_RETENTION_ENABLED", &mut self.retention.enabled)?;
        override_parsed(
            &lookup,
            "MN_RETENTION_PERIOD_SECS",
            &mut self.retention.period_secs,
        )?;
        override_parsed(&lookup, "MN_LEADER_ENABLED", &mut self.leader.enabled)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.downloader.record.validate("record")?;
        self.downloader.balance.validate("balance")?;
        if self.parser.entity_id_cache_size == 0 {
            return Err(ConfigError::Invalid(
                "parser.entity_id_cache_size must be positive".to_string(),
            ));
        }
        self.retention
            .validate()
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        if self.leader.enabled && self.leader.lease_duration_ms == 0 {
            return Err(ConfigError::Invalid(
                "leader.lease_duration_ms must be positive".to_string(),
            ));
        }
        if let (Some(start), Some(end)) = (self.start_date()?, self.end_date()?) {
            if start > end {
                return Err(ConfigError::Invalid(format!(
                    "start_date {start} is after end_date {end}"
                )));
            }
        }
        Ok(())
    }

    pub fn start_date(&self) -> Result<Option<ConsensusTimestamp>, ConfigError> {
        self.importer
            .start_date
            .as_deref()
            .map(parse_instant)
            .transpose()
    }

    pub fn end_date(&self) -> Result<Option<ConsensusTimestamp>, ConfigError> {
        self.importer
            .end_date
            .as_deref()
            .map(parse_instant)
            .transpose()
    }

    pub fn store_path(&self) -> PathBuf {
        self.importer.data_dir.join("store")
    }
}

fn override_parsed<F, T>(lookup: &F, var: &'static str, target: &mut T) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = lookup(var) {
        *target = value.trim().parse().map_err(|e: T::Err| ConfigError::Env {
            var,
            value: value.clone(),
            reason: e.to_string(),
        })?;
    }
    Ok(())
}

/// RFC 3339 instant to nanoseconds since the epoch.
fn parse_instant(value: &str) -> Result<ConsensusTimestamp, ConfigError> {
    let instant = chrono::DateTime::parse_from_rfc3339(value)
        .map_err(|e| ConfigError::Invalid(format!("{value} is not an RFC 3339 instant: {e}")))?;
    instant
        .timestamp_nanos_opt()
        .ok_or_else(|| ConfigError::Invalid(format!("{value} is out of range")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |var| map.get(var).cloned()
    }

    #[test]
    fn test_defaults_are_valid() {
        let config = ImporterConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.downloader.record.enabled);
        assert!(!config.downloader.balance.enabled);
        assert_eq!(
            config.downloader.record.quorum().unwrap(),
            QuorumConfig::default()
        );
    }

    #[test]
    fn test_toml_overlays_defaults() {
        let config = ImporterConfig::from_toml(
            r#"
            [importer]
            network = "/streams"
            start_date = "1970-01-01T00:00:01Z"

            [downloader.record]
            frequency_ms = 250
            quorum_mode = "count"

            [retention]
            enabled = true
            "#,
        )
        .unwrap();

        assert_eq!(config.importer.network, PathBuf::from("/streams"));
        assert_eq!(config.start_date().unwrap(), Some(1_000_000_000));
        assert_eq!(config.downloader.record.frequency_ms, 250);
        assert_eq!(config.downloader.record.batch_size, 100);
        assert_eq!(
            config.downloader.record.quorum().unwrap().mode,
            QuorumMode::Count
        );
        assert!(config.retention.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = ImporterConfig::default();
        config
            .apply_env(env(&[
                ("MN_NETWORK", "/mnt/bucket"),
                ("MN_BALANCE_ENABLED", "true"),
                ("MN_RECORD_FREQUENCY_MS", "1000"),
                ("MN_HALT_ON_ERROR", "true"),
            ]))
            .unwrap();

        assert_eq!(config.importer.network, PathBuf::from("/mnt/bucket"));
        assert!(config.downloader.balance.enabled);
        assert_eq!(config.downloader.record.frequency_ms, 1000);
        assert!(config.parser.halt_on_error);
    }

    #[test]
    fn test_bad_env_value() {
        let mut config = ImporterConfig::default();
        let result = config.apply_env(env(&[("MN_RECORD_FREQUENCY_MS", "soon")]));
        assert!(matches!(
            result,
            Err(ConfigError::Env {
                var: "MN_RECORD_FREQUENCY_MS",
                ..
            })
        ));
    }

    #[test]
    fn test_validation_failures() {
        let mut config = ImporterConfig::default();
        config.downloader.record.frequency_ms = 0;
        assert!(config.validate().is_err());

        let mut config = ImporterConfig::default();
        config.downloader.balance.threshold_numerator = 3;
        assert!(config.validate().is_err());

        let mut config = ImporterConfig::default();
        config.downloader.record.quorum_mode = "vibes".to_string();
        assert!(config.validate().is_err());

        let mut config = ImporterConfig::default();
        config.importer.start_date = Some("2024-02-01T00:00:00Z".to_string());
        config.importer.end_date = Some("2024-01-01T00:00:00Z".to_string());
        assert!(config.validate().is_err());

        let mut config = ImporterConfig::default();
        config.importer.start_date = Some("yesterday".to_string());
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_threshold_of_one_is_allowed() {
        let mut config = ImporterConfig::default();
        config.downloader.record.threshold_numerator = 1;
        config.downloader.record.threshold_denominator = 1;
        assert!(config.validate().is_ok());
    }
}
