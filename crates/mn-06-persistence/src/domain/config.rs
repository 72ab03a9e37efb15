//! Retention configuration.

use crate::domain::errors::PersistenceError;
use serde::{Deserialize, Serialize};
use shared_types::ConsensusTimestamp;

const NANOS_PER_SECOND: i64 = 1_000_000_000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetentionConfig {
    pub enabled: bool,
    /// Seconds between runs.
    pub frequency_secs: u64,
    /// Age in seconds beyond which rows are pruned, measured from the last
    /// committed record file.
    pub period_secs: u64,
    /// Seconds of consensus time deleted per batch.
    pub batch_period_secs: u64,
}

impl Default for RetentionConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            frequency_secs: 24 * 60 * 60,
            period_secs: 90 * 24 * 60 * 60,
            batch_period_secs: 60 * 60,
        }
    }
}

impl RetentionConfig {
    pub fn validate(&self) -> Result<(), PersistenceError> {
        if self.frequency_secs == 0 {
            return Err(PersistenceError::InvalidConfig(
                "frequency_secs must be positive".to_string(),
            ));
        }
        if self.batch_period_secs == 0 {
            return Err(PersistenceError::InvalidConfig(
                "batch_period_secs must be positive".to_string(),
            ));
        }
        if self.period_secs <= self.batch_period_secs {
            return Err(PersistenceError::InvalidConfig(format!(
                "period_secs {} must exceed batch_period_secs {}",
                self.period_secs, self.batch_period_secs
            )));
        }
        Ok(())
    }

    pub fn period_nanos(&self) -> ConsensusTimestamp {
        seconds_to_nanos(self.period_secs)
    }

    pub fn batch_period_nanos(&self) -> ConsensusTimestamp {
        seconds_to_nanos(self.batch_period_secs)
    }
}

fn seconds_to_nanos(seconds: u64) -> ConsensusTimestamp {
    i64::try_from(seconds)
        .unwrap_or(i64::MAX)
        .saturating_mul(NANOS_PER_SECOND)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = RetentionConfig::default();
        assert!(config.validate().is_ok());
        assert!(!config.enabled);
        assert_eq!(config.batch_period_nanos(), 3_600 * NANOS_PER_SECOND);
    }

    #[test]
    fn test_period_must_exceed_batch() {
        let config = RetentionConfig {
            period_secs: 60,
            batch_period_secs: 60,
            ..RetentionConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(PersistenceError::InvalidConfig(_))
        ));
    }
}
