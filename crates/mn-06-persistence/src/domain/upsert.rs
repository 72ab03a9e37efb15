//! # Upsert Generators
//!
//! Turn the mutations of one file into store operations. A generator is
//! resolved per table by [`generator_for`]:
//!
//! | Generator | Tables | Against stored state |
//! |-----------|--------|----------------------|
//! | [`GenericUpsert`] | everything else | history fold, column merge or replace by table kind |
//! | [`AggregatedUpsert`] | `crypto_transfer`, `token_transfer` | amounts summed per key, then written |
//! | [`RangeUnionUpsert`] | `topic_message_lookup` | ranges unioned with the stored row |
//! | [`TokenAirdropUpsert`] | `token_airdrop` | transitions only close a pending row |
//!
//! Re-applying a file that was already written leaves the store unchanged:
//! history keys whose stored row starts at or after the file's first
//! mutation are skipped, and every other write is a replace or a union.

use crate::domain::errors::PersistenceError;
use crate::domain::keys::{closed_key, history_key, row_key};
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use mn_05_record_parser::{fold_history, Row, RowSet, Table, TableKind, TableVisitor, Tables};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

/// Counts of what a batch writes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertStats {
    pub inserted: usize,
    pub updated: usize,
    pub history: usize,
    /// Keys already reflecting the file.
    pub skipped: usize,
}

/// Operations collected for one atomic commit.
pub struct UpsertBatch<'a> {
    store: &'a dyn KeyValueStore,
    operations: Vec<BatchOperation>,
    stats: UpsertStats,
}

impl<'a> UpsertBatch<'a> {
    pub fn new(store: &'a dyn KeyValueStore) -> Self {
        Self {
            store,
            operations: Vec::new(),
            stats: UpsertStats::default(),
        }
    }

    pub fn load<R: Row>(&self, key: &str) -> Result<Option<R>, PersistenceError> {
        let key = row_key(R::TABLE, key);
        match self.store.get(&key)? {
            Some(bytes) => decode(&key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    pub fn put<R: Row>(&mut self, key: &str, row: &R, existed: bool) -> Result<(), PersistenceError> {
        let value = encode(R::TABLE.name(), row)?;
        self.operations
            .push(BatchOperation::put(row_key(R::TABLE, key), value));
        if existed {
            self.stats.updated += 1;
        } else {
            self.stats.inserted += 1;
        }
        Ok(())
    }

    /// Writes a closed row to the table's history and indexes it by the
    /// instant it was closed.
    pub fn put_history<R: Row>(&mut self, key: &str, row: &R) -> Result<(), PersistenceError> {
        let range = row.timestamp_range();
        let lower = range.map_or(0, |range| range.lower);
        let value = encode(R::TABLE.name(), row)?;
        let history = history_key(R::TABLE, key, lower);
        if let Some(upper) = range.and_then(|range| range.upper) {
            self.operations.push(BatchOperation::put(
                closed_key(R::TABLE, upper, key, lower),
                history.clone(),
            ));
        }
        self.operations.push(BatchOperation::put(history, value));
        self.stats.history += 1;
        Ok(())
    }

    pub fn push(&mut self, operation: BatchOperation) {
        self.operations.push(operation);
    }

    pub fn skip(&mut self) {
        self.stats.skipped += 1;
    }

    pub fn stats(&self) -> UpsertStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    pub fn into_operations(self) -> (Vec<BatchOperation>, UpsertStats) {
        (self.operations, self.stats)
    }
}

pub fn encode<T: Serialize>(what: &'static str, value: &T) -> Result<Vec<u8>, PersistenceError> {
    bincode::serialize(value).map_err(|e| PersistenceError::Encode {
        what,
        reason: e.to_string(),
    })
}

pub fn decode<T: DeserializeOwned>(key: &[u8], bytes: &[u8]) -> Result<T, PersistenceError> {
    bincode::deserialize(bytes).map_err(|e| PersistenceError::Decode {
        key: String::from_utf8_lossy(key).into_owned(),
        reason: e.to_string(),
    })
}

// =============================================================================
// GENERATORS
// =============================================================================

pub trait UpsertGenerator<R: Row>: Send + Sync {
    fn name(&self) -> &'static str;

    /// Adds the operations for one natural key. `mutations` is never empty
    /// and is ordered by consensus timestamp.
    fn upsert(
        &self,
        batch: &mut UpsertBatch<'_>,
        key: &str,
        mutations: &[R],
    ) -> Result<(), PersistenceError>;
}

pub fn generator_for<R: Row>() -> Box<dyn UpsertGenerator<R>> {
    match R::TABLE {
        Table::CryptoTransfer | Table::TokenTransfer => Box::new(AggregatedUpsert),
        Table::TopicMessageLookup => Box::new(RangeUnionUpsert),
        Table::TokenAirdrop => Box::new(TokenAirdropUpsert),
        _ => Box::new(GenericUpsert),
    }
}

/// Folds all of `mutations` into one row.
fn merged<R: Row>(mutations: &[R]) -> Option<R> {
    let (first, rest) = mutations.split_first()?;
    let mut row = first.clone();
    for later in rest {
        row.merge(later);
    }
    Some(row)
}

/// Applies history-tracked mutations on top of the stored current row.
fn upsert_history<R: Row>(
    batch: &mut UpsertBatch<'_>,
    key: &str,
    stored: Option<R>,
    mutations: &[R],
) -> Result<(), PersistenceError> {
    let first_lower = mutations
        .first()
        .and_then(Row::timestamp_range)
        .map(|range| range.lower);
    let stored_lower = stored
        .as_ref()
        .and_then(Row::timestamp_range)
        .map(|range| range.lower);
    if let (Some(stored_lower), Some(first_lower)) = (stored_lower, first_lower) {
        if stored_lower >= first_lower {
            batch.skip();
            return Ok(());
        }
    }

    let existed = stored.is_some();
    let folded = fold_history(stored, mutations);
    for row in &folded.history {
        batch.put_history(key, row)?;
    }
    if let Some(current) = folded.current {
        batch.put(key, &current, existed)?;
    }
    Ok(())
}

/// Mutations the history fold will not apply on top of `stored`.
fn rejected<R: Row>(stored: Option<&R>, mutations: &[R]) -> usize {
    let mut current = stored.cloned();
    let mut rejected = 0;
    for mutation in mutations {
        match current.as_mut() {
            None if mutation.accepts_new() => current = Some(mutation.clone()),
            Some(row) if row.accepts(mutation) => row.merge(mutation),
            _ => rejected += 1,
        }
    }
    rejected
}

/// Insert if absent, otherwise by table kind.
pub struct GenericUpsert;

impl<R: Row> UpsertGenerator<R> for GenericUpsert {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn upsert(
        &self,
        batch: &mut UpsertBatch<'_>,
        key: &str,
        mutations: &[R],
    ) -> Result<(), PersistenceError> {
        match R::TABLE.kind() {
            TableKind::History => {
                let stored = batch.load::<R>(key)?;
                upsert_history(batch, key, stored, mutations)?;
            }
            TableKind::Current | TableKind::RangeUnion => {
                let Some(incoming) = merged(mutations) else {
                    return Ok(());
                };
                match batch.load::<R>(key)? {
                    Some(mut stored) => {
                        stored.merge(&incoming);
                        batch.put(key, &stored, true)?;
                    }
                    None => batch.put(key, &incoming, false)?,
                }
            }
            TableKind::Transactional | TableKind::Aggregated => {
                if let Some(last) = mutations.last() {
                    let existed = batch.load::<R>(key)?.is_some();
                    batch.put(key, last, existed)?;
                }
            }
        }
        Ok(())
    }
}

/// Sums the amounts of every mutation of a key. The stored row, if any,
/// came from an earlier write of the same file and is replaced.
pub struct AggregatedUpsert;

impl<R: Row> UpsertGenerator<R> for AggregatedUpsert {
    fn name(&self) -> &'static str {
        "aggregated"
    }

    fn upsert(
        &self,
        batch: &mut UpsertBatch<'_>,
        key: &str,
        mutations: &[R],
    ) -> Result<(), PersistenceError> {
        let Some(total) = merged(mutations) else {
            return Ok(());
        };
        let existed = batch.load::<R>(key)?.is_some();
        batch.put(key, &total, existed)
    }
}

/// Unions sequence number and timestamp ranges with the stored row.
pub struct RangeUnionUpsert;

impl<R: Row> UpsertGenerator<R> for RangeUnionUpsert {
    fn name(&self) -> &'static str {
        "range_union"
    }

    fn upsert(
        &self,
        batch: &mut UpsertBatch<'_>,
        key: &str,
        mutations: &[R],
    ) -> Result<(), PersistenceError> {
        let Some(incoming) = merged(mutations) else {
            return Ok(());
        };
        match batch.load::<R>(key)? {
            Some(mut stored) => {
                let before = stored.clone();
                stored.merge(&incoming);
                if stored == before {
                    batch.skip();
                    return Ok(());
                }
                batch.put(key, &stored, true)
            }
            None => batch.put(key, &incoming, false),
        }
    }
}

/// History fold in which cancel and claim only close a pending airdrop.
pub struct TokenAirdropUpsert;

impl<R: Row> UpsertGenerator<R> for TokenAirdropUpsert {
    fn name(&self) -> &'static str {
        "token_airdrop"
    }

    fn upsert(
        &self,
        batch: &mut UpsertBatch<'_>,
        key: &str,
        mutations: &[R],
    ) -> Result<(), PersistenceError> {
        let stored = batch.load::<R>(key)?;
        let ignored = rejected(stored.as_ref(), mutations);
        if ignored > 0 {
            debug!(key, ignored, "Ignored airdrop transitions without a pending airdrop");
        }
        upsert_history(batch, key, stored, mutations)
    }
}

// =============================================================================
// TABLE WALK
// =============================================================================

struct UpsertVisitor<'b, 'a> {
    batch: &'b mut UpsertBatch<'a>,
}

impl TableVisitor for UpsertVisitor<'_, '_> {
    type Error = PersistenceError;

    fn visit<R: Row>(&mut self, rows: &RowSet<R>) -> Result<(), PersistenceError> {
        if rows.is_empty() {
            return Ok(());
        }
        let generator = generator_for::<R>();
        for (key, mutations) in rows.iter() {
            if mutations.is_empty() {
                continue;
            }
            generator.upsert(self.batch, key, mutations)?;
        }
        debug!(
            table = %R::TABLE,
            generator = generator.name(),
            keys = rows.len(),
            "Generated upserts"
        );
        Ok(())
    }
}

/// Adds the operations of every table to `batch`.
pub fn upsert_tables(batch: &mut UpsertBatch<'_>, tables: &Tables) -> Result<(), PersistenceError> {
    tables.visit(&mut UpsertVisitor { batch })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryKVStore;
    use mn_05_record_parser::{AirdropState, CryptoTransfer, Entity, Schedule, TokenAirdrop};
    use shared_types::{EntityId, Patch, TimestampRange};

    fn id(num: i64) -> EntityId {
        EntityId::encode(0, 0, num).unwrap()
    }

    fn entity(at: i64) -> Entity {
        Entity::new(id(1001), at)
    }

    fn airdrop(state: AirdropState, at: i64) -> TokenAirdrop {
        TokenAirdrop {
            sender_account_id: id(1),
            receiver_account_id: id(2),
            token_id: id(3),
            serial_number: 0,
            state,
            amount: Patch::Set(1),
            timestamp_range: TimestampRange::at_least(at),
        }
    }

    #[test]
    fn test_generator_resolution() {
        assert_eq!(generator_for::<CryptoTransfer>().name(), "aggregated");
        assert_eq!(generator_for::<TokenAirdrop>().name(), "token_airdrop");
        assert_eq!(generator_for::<Entity>().name(), "generic");
        assert_eq!(generator_for::<Schedule>().name(), "generic");
    }

    #[test]
    fn test_history_already_reflecting_file_is_skipped() {
        let store = InMemoryKVStore::new();
        let row = entity(50);
        store
            .put(
                &row_key(Table::Entity, &row.key()),
                &encode("entity", &row).unwrap(),
            )
            .unwrap();

        let mut batch = UpsertBatch::new(&store);
        GenericUpsert
            .upsert(&mut batch, &row.key(), &[entity(40), entity(50)])
            .unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.stats().skipped, 1);
    }

    #[test]
    fn test_rejected_transitions() {
        let claimed = airdrop(AirdropState::Claimed, 10);
        let pending = airdrop(AirdropState::Pending, 5);
        assert_eq!(rejected(None, std::slice::from_ref(&claimed)), 1);
        assert_eq!(rejected(Some(&pending), std::slice::from_ref(&claimed)), 0);
        assert_eq!(
            rejected(Some(&pending), &[claimed.clone(), airdrop(AirdropState::Cancelled, 20)]),
            1
        );
    }

    #[test]
    fn test_merged_folds_in_order() {
        let mut first = entity(10);
        first.memo = Patch::Set("a".to_string());
        let mut second = entity(20);
        second.deleted = Patch::Set(true);
        let row = merged(&[first, second]).unwrap();
        assert_eq!(row.memo, Patch::Set("a".to_string()));
        assert_eq!(row.deleted, Patch::Set(true));
        assert!(merged::<Entity>(&[]).is_none());
    }
}
