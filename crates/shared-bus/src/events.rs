//! # Importer Events
//!
//! Everything the importer announces after a successful commit.

use serde::{Deserialize, Serialize};
use shared_types::{ConsensusTimestamp, EntityId, Sha384Hash, StreamType};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum MirrorEvent {
    // =========================================================================
    // STREAM FILES
    // =========================================================================
    /// A stream file was parsed and committed together with its cursor.
    StreamFileParsed {
        stream_type: StreamType,
        filename: String,
        consensus_start: ConsensusTimestamp,
        consensus_end: ConsensusTimestamp,
        /// Record items or balance rows in the file.
        count: u64,
        hash: Sha384Hash,
        /// Record file index (block number) when known.
        index: Option<i64>,
    },

    // =========================================================================
    // ADDRESS BOOK
    // =========================================================================
    /// A new address book snapshot became effective.
    AddressBookUpdated {
        file_id: EntityId,
        start_consensus_timestamp: ConsensusTimestamp,
        node_count: usize,
    },

    // =========================================================================
    // RETENTION
    // =========================================================================
    /// A retention pass finished.
    RetentionCompleted {
        cutoff: ConsensusTimestamp,
        rows_deleted: u64,
    },
}

impl MirrorEvent {
    /// Get the topic for this event.
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            MirrorEvent::StreamFileParsed { .. } => EventTopic::StreamFiles,
            MirrorEvent::AddressBookUpdated { .. } => EventTopic::AddressBook,
            MirrorEvent::RetentionCompleted { .. } => EventTopic::Retention,
        }
    }

    /// Stream type the event concerns, if any.
    #[must_use]
    pub fn stream_type(&self) -> Option<StreamType> {
        match self {
            MirrorEvent::StreamFileParsed { stream_type, .. } => Some(*stream_type),
            _ => None,
        }
    }
}

/// Event topics for filtering subscriptions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    StreamFiles,
    AddressBook,
    Retention,
    /// All events (no filtering).
    All,
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Stream types to include. Empty means all.
    pub stream_types: Vec<StreamType>,
}

impl EventFilter {
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            stream_types: Vec::new(),
        }
    }

    /// Stream file events of the given kinds.
    #[must_use]
    pub fn stream_types(stream_types: Vec<StreamType>) -> Self {
        Self {
            topics: vec![EventTopic::StreamFiles],
            stream_types,
        }
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &MirrorEvent) -> bool {
        let topic_match = self.topics.is_empty()
            || self.topics.contains(&EventTopic::All)
            || self.topics.contains(&event.topic());

        let stream_match = self.stream_types.is_empty()
            || event
                .stream_type()
                .map_or(true, |t| self.stream_types.contains(&t));

        topic_match && stream_match
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn parsed(stream_type: StreamType) -> MirrorEvent {
        MirrorEvent::StreamFileParsed {
            stream_type,
            filename: "2024-03-01T12_00_02.000000000Z.rcd".to_string(),
            consensus_start: 1,
            consensus_end: 2,
            count: 3,
            hash: Sha384Hash::ZERO,
            index: Some(7),
        }
    }

    #[test]
    fn test_event_topic_mapping() {
        assert_eq!(parsed(StreamType::Record).topic(), EventTopic::StreamFiles);
        let event = MirrorEvent::AddressBookUpdated {
            file_id: EntityId::EMPTY,
            start_consensus_timestamp: 5,
            node_count: 4,
        };
        assert_eq!(event.topic(), EventTopic::AddressBook);
        assert_eq!(event.stream_type(), None);
    }

    #[test]
    fn test_filter_all() {
        assert!(EventFilter::all().matches(&parsed(StreamType::Balance)));
    }

    #[test]
    fn test_filter_by_topic() {
        let filter = EventFilter::topics(vec![EventTopic::Retention]);
        assert!(!filter.matches(&parsed(StreamType::Record)));
        assert!(filter.matches(&MirrorEvent::RetentionCompleted {
            cutoff: 10,
            rows_deleted: 2
        }));
    }

    #[test]
    fn test_filter_by_stream_type() {
        let filter = EventFilter::stream_types(vec![StreamType::Record]);
        assert!(filter.matches(&parsed(StreamType::Record)));
        assert!(!filter.matches(&parsed(StreamType::Balance)));
    }

    #[test]
    fn test_event_serializes() {
        let json = serde_json::to_string(&parsed(StreamType::Record)).unwrap();
        assert!(json.contains("StreamFileParsed"));
    }
}
