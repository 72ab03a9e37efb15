//! # Consensus Time
//!
//! Consensus timestamps are nanoseconds since the Unix epoch. Every
//! history-tracked row carries a half-open [`TimestampRange`]; the current
//! version of a row is the one whose upper bound is open.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Nanoseconds since the Unix epoch.
pub type ConsensusTimestamp = i64;

pub const NANOS_PER_SECOND: i64 = 1_000_000_000;

/// Builds a timestamp from protobuf style `(seconds, nanos)`.
pub fn from_seconds_nanos(seconds: i64, nanos: i32) -> ConsensusTimestamp {
    seconds
        .saturating_mul(NANOS_PER_SECOND)
        .saturating_add(i64::from(nanos))
}

/// Splits a timestamp into `(seconds, nanos)`.
pub fn to_seconds_nanos(ts: ConsensusTimestamp) -> (i64, i32) {
    (
        ts.div_euclid(NANOS_PER_SECOND),
        ts.rem_euclid(NANOS_PER_SECOND) as i32,
    )
}

/// Half-open validity range `[lower, upper)`; `upper == None` is unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimestampRange {
    pub lower: ConsensusTimestamp,
    pub upper: Option<ConsensusTimestamp>,
}

impl TimestampRange {
    /// `[lower, ∞)`
    pub fn at_least(lower: ConsensusTimestamp) -> Self {
        Self { lower, upper: None }
    }

    /// `[lower, upper)`
    pub fn closed(lower: ConsensusTimestamp, upper: ConsensusTimestamp) -> Self {
        Self {
            lower,
            upper: Some(upper),
        }
    }

    pub fn is_open(&self) -> bool {
        self.upper.is_none()
    }

    pub fn contains(&self, ts: ConsensusTimestamp) -> bool {
        ts >= self.lower && self.upper.map_or(true, |upper| ts < upper)
    }

    /// Returns this range terminated at `upper`.
    pub fn close_at(&self, upper: ConsensusTimestamp) -> Self {
        Self::closed(self.lower, upper)
    }

    /// Smallest range covering both.
    pub fn span(&self, other: &Self) -> Self {
        let upper = match (self.upper, other.upper) {
            (Some(a), Some(b)) => Some(a.max(b)),
            _ => None,
        };
        Self {
            lower: self.lower.min(other.lower),
            upper,
        }
    }
}

impl fmt::Display for TimestampRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.upper {
            Some(upper) => write!(f, "[{},{})", self.lower, upper),
            None => write!(f, "[{},)", self.lower),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seconds_nanos() {
        let ts = from_seconds_nanos(1_700_000_000, 123);
        assert_eq!(ts, 1_700_000_000_000_000_123);
        assert_eq!(to_seconds_nanos(ts), (1_700_000_000, 123));
    }

    #[test]
    fn test_half_open() {
        let range = TimestampRange::closed(10, 20);
        assert!(range.contains(10));
        assert!(range.contains(19));
        assert!(!range.contains(20));
        assert!(!range.contains(9));
        assert!(TimestampRange::at_least(10).contains(i64::MAX));
    }

    #[test]
    fn test_span() {
        let a = TimestampRange::closed(5, 10);
        let b = TimestampRange::closed(1, 7);
        assert_eq!(a.span(&b), TimestampRange::closed(1, 10));
        assert_eq!(a.span(&TimestampRange::at_least(20)), TimestampRange { lower: 5, upper: None });
        assert_eq!(a.span(&b), b.span(&a));
    }

    #[test]
    fn test_close_and_display() {
        let open = TimestampRange::at_least(3);
        assert!(open.is_open());
        let closed = open.close_at(8);
        assert!(!closed.is_open());
        assert_eq!(closed.to_string(), "[3,8)");
        assert_eq!(open.to_string(), "[3,)");
    }
}
