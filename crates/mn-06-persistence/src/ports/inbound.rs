//! # Inbound Ports (Driving Ports)

use crate::domain::errors::PersistenceError;
use crate::domain::upsert::UpsertStats;
use mn_04_downloader::StreamCursor;
use mn_05_record_parser::ParserContext;
use shared_types::{ConsensusTimestamp, StreamType};

/// What one commit wrote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub stream_type: StreamType,
    pub consensus_end: ConsensusTimestamp,
    pub operations: usize,
    pub rows: UpsertStats,
    pub address_books: usize,
    /// The file was already committed and nothing was written.
    pub replayed: bool,
}

pub trait PersistenceApi: Send + Sync {
    /// Writes every mutation of `context`, the staged address book changes
    /// and the advanced cursor in one atomic batch.
    fn commit(
        &self,
        stream_type: StreamType,
        cursor: &StreamCursor,
        context: &ParserContext,
    ) -> Result<CommitSummary, PersistenceError>;

    fn last_committed(&self, stream_type: StreamType)
        -> Result<Option<StreamCursor>, PersistenceError>;
}
