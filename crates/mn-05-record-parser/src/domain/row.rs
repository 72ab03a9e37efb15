//! # Rows and Tables
//!
//! Every mutation a handler produces is a [`Row`] of one [`Table`]. Rows of
//! the same table and natural key are combined according to the table's
//! [`TableKind`]:
//!
//! | Kind | Within a file | Against stored state |
//! |------|---------------|----------------------|
//! | `History` | mutations kept in order | folded, superseded rows move to history |
//! | `Current` | columns merged | columns merged, no history |
//! | `Transactional` | later replaces | insert |
//! | `Aggregated` | amounts summed | insert |
//! | `RangeUnion` | ranges unioned | ranges unioned |

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use shared_types::{ConsensusTimestamp, EntityId, TimestampRange};
use std::collections::BTreeMap;
use std::fmt::{self, Debug};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TableKind {
    History,
    Current,
    Transactional,
    Aggregated,
    RangeUnion,
}

macro_rules! tables {
    ($($variant:ident => $name:literal, $kind:ident;)*) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum Table {
            $($variant,)*
        }

        impl Table {
            pub const ALL: &'static [Table] = &[$(Table::$variant,)*];

            pub fn name(&self) -> &'static str {
                match self {
                    $(Table::$variant => $name,)*
                }
            }

            pub fn kind(&self) -> TableKind {
                match self {
                    $(Table::$variant => TableKind::$kind,)*
                }
            }
        }
    };
}

tables! {
    Entity => "entity", History;
    Token => "token", History;
    TokenAccount => "token_account", History;
    TokenAirdrop => "token_airdrop", History;
    Nft => "nft", History;
    CryptoAllowance => "crypto_allowance", History;
    TokenAllowance => "token_allowance", History;
    NftAllowance => "nft_allowance", History;
    Node => "node", History;
    Schedule => "schedule", Current;
    Transaction => "transaction", Transactional;
    EntityTransaction => "entity_transaction", Transactional;
    CryptoTransfer => "crypto_transfer", Aggregated;
    TokenTransfer => "token_transfer", Aggregated;
    TopicMessage => "topic_message", Transactional;
    TopicMessageLookup => "topic_message_lookup", RangeUnion;
    ContractResult => "contract_result", Transactional;
    FileData => "file_data", Transactional;
    NodeStake => "node_stake", Transactional;
    AccountBalance => "account_balance", Transactional;
    TokenBalance => "token_balance", Transactional;
}

impl Table {
    pub fn has_history(&self) -> bool {
        self.kind() == TableKind::History
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A persisted mutation.
pub trait Row: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static {
    const TABLE: Table;

    /// Natural key. Keys sort in the order rows should be scanned.
    fn key(&self) -> String;

    /// Validity range of history-tracked rows.
    fn timestamp_range(&self) -> Option<TimestampRange> {
        None
    }

    fn set_timestamp_range(&mut self, _range: TimestampRange) {}

    /// Timestamp of transaction-scoped rows, used by retention.
    fn consensus_timestamp(&self) -> Option<ConsensusTimestamp> {
        None
    }

    /// Folds a later mutation of the same key into this row.
    fn merge(&mut self, later: &Self);

    /// Whether a later mutation applies on top of this row.
    fn accepts(&self, _later: &Self) -> bool {
        true
    }

    /// Whether this mutation may start a row when none exists.
    fn accepts_new(&self) -> bool {
        true
    }
}

// =============================================================================
// KEYS
// =============================================================================

/// Fixed-width key segment for an entity id.
pub fn id_key(id: EntityId) -> String {
    format!("{:020}", id.id())
}

/// Fixed-width key segment for a timestamp. Negative values clamp to zero.
pub fn ts_key(ts: ConsensusTimestamp) -> String {
    format!("{:019}", ts.max(0))
}

// =============================================================================
// HISTORY FOLD
// =============================================================================

/// Result of applying ordered mutations on top of an optional base row.
#[derive(Debug, Clone, PartialEq)]
pub struct Folded<R> {
    /// Superseded rows, closed at the lower bound of their successor.
    pub history: Vec<R>,
    pub current: Option<R>,
}

/// Applies `mutations` in order on top of `base`.
///
/// A mutation starting later than the row it replaces closes that row into
/// history; one starting at the same instant only merges columns.
pub fn fold_history<R: Row>(base: Option<R>, mutations: &[R]) -> Folded<R> {
    let mut history = Vec::new();
    let mut current = base;
    for mutation in mutations {
        current = match current.take() {
            None if mutation.accepts_new() => Some(mutation.clone()),
            None => None,
            Some(mut row) => {
                if row.accepts(mutation) {
                    if let (Some(range), Some(next)) =
                        (row.timestamp_range(), mutation.timestamp_range())
                    {
                        if next.lower > range.lower {
                            let mut closed = row.clone();
                            closed.set_timestamp_range(range.close_at(next.lower));
                            history.push(closed);
                        }
                        row.merge(mutation);
                        row.set_timestamp_range(next);
                    } else {
                        row.merge(mutation);
                    }
                }
                Some(row)
            }
        };
    }
    Folded { history, current }
}

// =============================================================================
// ROW SET
// =============================================================================

/// Mutations of one table accumulated while a file is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RowSet<R: Row> {
    rows: BTreeMap<String, Vec<R>>,
}

impl<R: Row> Default for RowSet<R> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
        }
    }
}

impl<R: Row> RowSet<R> {
    pub fn add(&mut self, row: R) {
        let mutations = self.rows.entry(row.key()).or_default();
        match (R::TABLE.kind(), mutations.last_mut()) {
            (TableKind::History, _) | (_, None) => mutations.push(row),
            (_, Some(existing)) => existing.merge(&row),
        }
    }

    /// Mutations of one key, oldest first. Non-history tables hold one
    /// merged row per key.
    pub fn get(&self, key: &str) -> Option<&[R]> {
        self.rows.get(key).map(Vec::as_slice)
    }

    /// The row a key would hold if nothing was stored before this file.
    pub fn latest(&self, key: &str) -> Option<R> {
        let mutations = self.rows.get(key)?;
        fold_history(None, mutations).current
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &[R])> {
        self.rows.iter().map(|(key, rows)| (key, rows.as_slice()))
    }

    /// Distinct keys.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Total mutations across all keys.
    pub fn mutations(&self) -> usize {
        self.rows.values().map(Vec::len).sum()
    }
}

/// Merges `Patch` columns, keeping earlier values where the later mutation
/// leaves a column unset.
macro_rules! merge_columns {
    ($row:ident, $later:ident; $($field:ident),* $(,)?) => {
        $(
            $row.$field = std::mem::take(&mut $row.$field).then($later.$field.clone());
        )*
    };
}
pub(crate) use merge_columns;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{AirdropState, Entity, TokenAirdrop};
    use shared_types::Patch;

    fn id(num: i64) -> EntityId {
        EntityId::encode(0, 0, num).unwrap()
    }

    fn memo(ts: i64, memo: &str) -> Entity {
        let mut entity = Entity::new(id(5), ts);
        entity.memo = Patch::Set(memo.to_string());
        entity
    }

    #[test]
    fn test_table_metadata() {
        assert_eq!(Table::ALL.len(), 21);
        assert!(Table::Entity.has_history());
        assert_eq!(Table::TokenTransfer.kind(), TableKind::Aggregated);
        assert_eq!(Table::TopicMessageLookup.to_string(), "topic_message_lookup");
    }

    #[test]
    fn test_keys_sort_numerically() {
        assert!(id_key(id(9)) < id_key(id(10)));
        assert!(ts_key(99) < ts_key(100));
        assert_eq!(ts_key(-5), ts_key(0));
    }

    #[test]
    fn test_fold_closes_superseded_rows() {
        let mut created = Entity::new(id(5), 10);
        created.deleted = Patch::Set(false);
        let folded = fold_history(None, &[created, memo(20, "a"), memo(30, "b")]);

        assert_eq!(folded.history.len(), 2);
        assert_eq!(folded.history[0].timestamp_range, TimestampRange::closed(10, 20));
        assert_eq!(folded.history[1].timestamp_range, TimestampRange::closed(20, 30));
        assert_eq!(folded.history[1].memo, Patch::Set("a".to_string()));

        let current = folded.current.unwrap();
        assert_eq!(current.timestamp_range, TimestampRange::at_least(30));
        assert_eq!(current.memo, Patch::Set("b".to_string()));
        assert_eq!(current.deleted, Patch::Set(false));
    }

    #[test]
    fn test_fold_same_instant_merges_in_place() {
        let folded = fold_history(Some(memo(10, "a")), &[memo(10, "b")]);
        assert!(folded.history.is_empty());
        assert_eq!(folded.current.unwrap().memo, Patch::Set("b".to_string()));
    }

    #[test]
    fn test_row_set_keeps_history_mutations() {
        let mut rows = RowSet::default();
        rows.add(memo(10, "a"));
        rows.add(memo(20, "b"));
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.mutations(), 2);

        let latest = rows.latest(&id_key(id(5))).unwrap();
        assert_eq!(latest.memo, Patch::Set("b".to_string()));
    }

    #[test]
    fn test_closing_airdrop_needs_pending_row() {
        let claimed = TokenAirdrop {
            sender_account_id: id(1),
            receiver_account_id: id(2),
            token_id: id(3),
            serial_number: 0,
            state: AirdropState::Claimed,
            amount: Patch::Unset,
            timestamp_range: TimestampRange::at_least(20),
        };
        assert!(fold_history(None, &[claimed.clone()]).current.is_none());

        let pending = TokenAirdrop {
            state: AirdropState::Pending,
            amount: Patch::Set(7),
            timestamp_range: TimestampRange::at_least(10),
            ..claimed.clone()
        };
        let folded = fold_history(None, &[pending, claimed]);
        let current = folded.current.unwrap();
        assert_eq!(current.state, AirdropState::Claimed);
        assert_eq!(current.amount, Patch::Set(7));
        assert_eq!(folded.history.len(), 1);
    }
}
