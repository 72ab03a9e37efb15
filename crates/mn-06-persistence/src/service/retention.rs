//! # Retention
//!
//! Deletes data older than the configured period, measured back from the
//! last committed record file. Work proceeds in slices of
//! `batch_period_secs` consensus time starting at the earliest stored file,
//! each slice in its own atomic batch:
//!
//! | Data | Deleted when |
//! |------|--------------|
//! | transaction-scoped and aggregated rows | consensus timestamp at or before the cutoff |
//! | history rows | closed at or before the cutoff |
//! | stream file summaries | consensus end at or before the cutoff |
//!
//! Every slice reads only its own key ranges: transaction-scoped keys lead
//! with their timestamp and history rows are found through the
//! `{table}_closed` index ordered by the instant they were closed.
//!
//! Current rows, including topic message lookups, and cursors are never
//! pruned.

use crate::domain::config::RetentionConfig;
use crate::domain::errors::PersistenceError;
use crate::domain::keys::{
    closed_key_at, cursor_key, row_key_at, stream_file_key, stream_file_prefix,
};
use crate::domain::upsert::decode;
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use mirror_telemetry::metrics;
use mn_04_downloader::StreamCursor;
use mn_05_record_parser::{Row, RowSet, Table, TableKind, TableVisitor, Tables};
use shared_types::{ConsensusTimestamp, StreamType};
use std::sync::Arc;
use tracing::{debug, info};

/// Outcome of one retention run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionSummary {
    /// `None` when nothing was old enough to consider.
    pub cutoff: Option<ConsensusTimestamp>,
    pub deleted: u64,
    pub batches: usize,
}

pub struct RetentionService {
    store: Arc<dyn KeyValueStore>,
    config: RetentionConfig,
}

impl RetentionService {
    pub fn new(
        store: Arc<dyn KeyValueStore>,
        config: RetentionConfig,
    ) -> Result<Self, PersistenceError> {
        config.validate()?;
        Ok(Self { store, config })
    }

    pub fn config(&self) -> &RetentionConfig {
        &self.config
    }

    /// Latest timestamp whose data may be deleted.
    pub fn cutoff(&self) -> Result<Option<ConsensusTimestamp>, PersistenceError> {
        let key = cursor_key(StreamType::Record);
        let Some(bytes) = self.store.get(&key)? else {
            return Ok(None);
        };
        let cursor: StreamCursor = decode(&key, &bytes)?;
        let cutoff = cursor
            .consensus_end
            .saturating_sub(self.config.period_nanos());
        Ok((cutoff > 0).then_some(cutoff))
    }

    /// Runs once if enabled.
    pub fn run(&self) -> Result<RetentionSummary, PersistenceError> {
        if !self.config.enabled {
            debug!("Retention disabled");
            return Ok(RetentionSummary::default());
        }
        match self.cutoff()? {
            Some(cutoff) => self.prune(cutoff),
            None => Ok(RetentionSummary::default()),
        }
    }

    /// Deletes everything at or before `cutoff`.
    pub fn prune(&self, cutoff: ConsensusTimestamp) -> Result<RetentionSummary, PersistenceError> {
        let Some(earliest) = self.earliest_start()? else {
            return Ok(RetentionSummary {
                cutoff: Some(cutoff),
                ..Default::default()
            });
        };
        let slice = self.config.batch_period_nanos();

        let mut tables = RetentionTables::default();
        Tables::default().visit(&mut tables)?;

        let mut summary = RetentionSummary {
            cutoff: Some(cutoff),
            ..Default::default()
        };
        // History closed before the earliest stored file belongs to the
        // first slice.
        let mut start = earliest.min(cutoff);
        let mut closed_from = 0;
        while start <= cutoff {
            let end = start.saturating_add(slice).min(cutoff.saturating_add(1));
            let mut operations = Vec::new();
            let mut deleted = 0u64;

            for table in &tables.history {
                for (index_key, history_key) in self.store.range_scan(
                    &closed_key_at(*table, closed_from),
                    &closed_key_at(*table, end),
                )? {
                    operations.push(BatchOperation::delete(history_key));
                    operations.push(BatchOperation::delete(index_key));
                    deleted += 1;
                }
            }
            for table in &tables.transactional {
                for (key, _) in self
                    .store
                    .range_scan(&row_key_at(*table, start), &row_key_at(*table, end))?
                {
                    operations.push(BatchOperation::delete(key));
                    deleted += 1;
                }
            }
            for stream_type in StreamType::ALL {
                for (key, _) in self.store.range_scan(
                    &stream_file_key(stream_type, start),
                    &stream_file_key(stream_type, end),
                )? {
                    operations.push(BatchOperation::delete(key));
                    deleted += 1;
                }
            }

            if !operations.is_empty() {
                self.store.atomic_batch_write(operations)?;
                metrics::record_retention_deleted(deleted);
                debug!(start, end, deleted, "Pruned retention slice");
                summary.deleted += deleted;
                summary.batches += 1;
            }
            start = end;
            closed_from = end;
        }

        info!(
            cutoff,
            deleted = summary.deleted,
            batches = summary.batches,
            "Retention completed"
        );
        Ok(summary)
    }

    /// Consensus start of the earliest stored file of any stream.
    fn earliest_start(&self) -> Result<Option<ConsensusTimestamp>, PersistenceError> {
        let mut earliest: Option<ConsensusTimestamp> = None;
        for stream_type in StreamType::ALL {
            let prefix = stream_file_prefix(stream_type);
            if let Some((key, value)) = self.store.prefix_scan(prefix.as_bytes())?.first() {
                let cursor: StreamCursor = decode(key, value)?;
                earliest = Some(earliest.map_or(cursor.consensus_start, |e| {
                    e.min(cursor.consensus_start)
                }));
            }
        }
        Ok(earliest.map(|e| e.max(0)))
    }
}

/// Tables retention deletes from, by how their keys are ordered.
#[derive(Default)]
struct RetentionTables {
    transactional: Vec<Table>,
    history: Vec<Table>,
}

impl TableVisitor for RetentionTables {
    type Error = PersistenceError;

    fn visit<R: Row>(&mut self, _rows: &RowSet<R>) -> Result<(), PersistenceError> {
        match R::TABLE.kind() {
            TableKind::Transactional | TableKind::Aggregated => self.transactional.push(R::TABLE),
            TableKind::History => self.history.push(R::TABLE),
            TableKind::Current | TableKind::RangeUnion => {}
        }
        Ok(())
    }
}
