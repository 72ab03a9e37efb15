//! # Date Range Calculator
//!
//! The next window to fetch starts after the last committed file, or at the
//! configured start date when that is later, and ends at the configured end
//! date. Both configured bounds are inclusive.

use crate::domain::chain::StreamCursor;
use shared_types::{ConsensusTimestamp, StreamFilename, StreamType};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    /// Exclusive lower bound on filename instants.
    pub start_after: Option<ConsensusTimestamp>,
    /// Inclusive upper bound on filename instants.
    pub end: ConsensusTimestamp,
}

impl DateRange {
    pub fn contains(&self, instant: ConsensusTimestamp) -> bool {
        self.start_after.map_or(true, |start| instant > start) && instant <= self.end
    }

    /// Listing marker for providers.
    pub fn start_after_filename(&self, stream_type: StreamType) -> Option<StreamFilename> {
        self.start_after
            .map(|instant| StreamFilename::data(stream_type, instant))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRangeCalculator {
    start_date: Option<ConsensusTimestamp>,
    end_date: Option<ConsensusTimestamp>,
}

impl DateRangeCalculator {
    pub fn new(start_date: Option<ConsensusTimestamp>, end_date: Option<ConsensusTimestamp>) -> Self {
        Self {
            start_date,
            end_date,
        }
    }

    /// `None` once the end date has been reached.
    pub fn range(&self, last: Option<&StreamCursor>) -> Option<DateRange> {
        let from_start = self.start_date.map(|start| start.saturating_sub(1));
        let from_last = last.map(|cursor| cursor.filename.instant);
        let start_after = from_start.max(from_last);
        let end = self.end_date.unwrap_or(ConsensusTimestamp::MAX);

        if start_after.map_or(false, |start| start >= end) {
            return None;
        }
        Some(DateRange { start_after, end })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::Sha384Hash;

    fn cursor(instant: ConsensusTimestamp) -> StreamCursor {
        StreamCursor {
            filename: StreamFilename::data(StreamType::Record, instant),
            consensus_start: instant,
            consensus_end: instant + 10,
            hash: Sha384Hash::ZERO,
            index: None,
            count: 1,
        }
    }

    #[test]
    fn test_unbounded_from_genesis() {
        let range = DateRangeCalculator::default().range(None).unwrap();
        assert_eq!(range.start_after, None);
        assert!(range.contains(0));
        assert!(range.contains(ConsensusTimestamp::MAX));
    }

    #[test]
    fn test_start_date_is_inclusive() {
        let calculator = DateRangeCalculator::new(Some(100), None);
        let range = calculator.range(None).unwrap();
        assert!(!range.contains(99));
        assert!(range.contains(100));
    }

    #[test]
    fn test_last_file_wins_when_later() {
        let calculator = DateRangeCalculator::new(Some(100), None);
        let range = calculator.range(Some(&cursor(500))).unwrap();
        assert_eq!(range.start_after, Some(500));
        assert!(!range.contains(500));

        let range = calculator.range(Some(&cursor(50))).unwrap();
        assert_eq!(range.start_after, Some(99));
    }

    #[test]
    fn test_end_date_reached() {
        let calculator = DateRangeCalculator::new(None, Some(1_000));
        assert!(calculator.range(Some(&cursor(999))).is_some());
        assert!(calculator.range(Some(&cursor(1_000))).is_none());
        let range = calculator.range(None).unwrap();
        assert!(range.contains(1_000));
        assert!(!range.contains(1_001));
    }
}
