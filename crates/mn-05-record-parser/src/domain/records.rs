//! # Transaction-Scoped Rows
//!
//! Rows written once per transaction and never updated afterwards, except
//! for the aggregated transfer tables and topic message lookups.

use crate::domain::row::{id_key, ts_key, Row, Table};
use mn_03_stream_files::TransactionType;
use serde::{Deserialize, Serialize};
use shared_types::{ConsensusTimestamp, EntityId, TimestampRange};

/// Width of one topic message lookup bucket: 30 days.
pub const LOOKUP_PARTITION_NANOS: i64 = 30 * 24 * 60 * 60 * 1_000_000_000;

/// Bucket start of the lookup partition holding `consensus_timestamp`.
pub fn lookup_partition(consensus_timestamp: ConsensusTimestamp) -> i64 {
    consensus_timestamp.div_euclid(LOOKUP_PARTITION_NANOS) * LOOKUP_PARTITION_NANOS
}

/// Replaces a transactional row wholesale.
macro_rules! transactional_row {
    ($row:ty, $table:ident, |$this:ident| $key:expr) => {
        impl Row for $row {
            const TABLE: Table = Table::$table;

            fn key(&self) -> String {
                let $this = self;
                $key
            }

            fn consensus_timestamp(&self) -> Option<ConsensusTimestamp> {
                Some(self.consensus_timestamp)
            }

            fn merge(&mut self, later: &Self) {
                *self = later.clone();
            }
        }
    };
}

// =============================================================================
// TRANSACTION
// =============================================================================

/// Written for every item, successful or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionRow {
    pub consensus_timestamp: ConsensusTimestamp,
    pub transaction_type: TransactionType,
    pub result: i32,
    pub payer_account_id: EntityId,
    pub node_account_id: EntityId,
    pub entity_id: EntityId,
    pub charged_tx_fee: u64,
    pub max_fee: u64,
    pub memo: Vec<u8>,
    pub transaction_hash: Vec<u8>,
    pub transaction_bytes: Vec<u8>,
    pub valid_start_ns: ConsensusTimestamp,
    pub valid_duration_seconds: i64,
    pub nonce: i32,
    pub scheduled: bool,
    pub parent_consensus_timestamp: Option<ConsensusTimestamp>,
    /// Position of the item in its record file.
    pub index: usize,
}

transactional_row!(TransactionRow, Transaction, |row| ts_key(row.consensus_timestamp));

/// One entity a transaction referenced, for per-entity transaction history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityTransaction {
    pub consensus_timestamp: ConsensusTimestamp,
    pub entity_id: EntityId,
    pub payer_account_id: EntityId,
    pub result: i32,
    pub transaction_type: TransactionType,
}

transactional_row!(EntityTransaction, EntityTransaction, |row| format!(
    "{}/{}",
    ts_key(row.consensus_timestamp),
    id_key(row.entity_id)
));

// =============================================================================
// TRANSFERS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CryptoTransfer {
    pub consensus_timestamp: ConsensusTimestamp,
    pub entity_id: EntityId,
    pub amount: i64,
    pub payer_account_id: EntityId,
    pub is_approval: bool,
}

impl Row for CryptoTransfer {
    const TABLE: Table = Table::CryptoTransfer;

    fn key(&self) -> String {
        format!("{}/{}", ts_key(self.consensus_timestamp), id_key(self.entity_id))
    }

    fn consensus_timestamp(&self) -> Option<ConsensusTimestamp> {
        Some(self.consensus_timestamp)
    }

    fn merge(&mut self, later: &Self) {
        self.amount = self.amount.saturating_add(later.amount);
        self.is_approval |= later.is_approval;
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenTransfer {
    pub consensus_timestamp: ConsensusTimestamp,
    pub token_id: EntityId,
    pub account_id: EntityId,
    pub amount: i64,
    pub payer_account_id: EntityId,
    pub is_approval: bool,
}

impl Row for TokenTransfer {
    const TABLE: Table = Table::TokenTransfer;

    fn key(&self) -> String {
        format!(
            "{}/{}/{}",
            ts_key(self.consensus_timestamp),
            id_key(self.token_id),
            id_key(self.account_id)
        )
    }

    fn consensus_timestamp(&self) -> Option<ConsensusTimestamp> {
        Some(self.consensus_timestamp)
    }

    fn merge(&mut self, later: &Self) {
        self.amount = self.amount.saturating_add(later.amount);
        self.is_approval |= later.is_approval;
    }
}

// =============================================================================
// TOPICS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessage {
    pub consensus_timestamp: ConsensusTimestamp,
    pub topic_id: EntityId,
    pub sequence_number: i64,
    pub message: Vec<u8>,
    pub running_hash: Vec<u8>,
    pub running_hash_version: u64,
    pub payer_account_id: EntityId,
    pub chunk_num: Option<i32>,
    pub chunk_total: Option<i32>,
    pub initial_transaction_id: Option<Vec<u8>>,
}

transactional_row!(TopicMessage, TopicMessage, |row| ts_key(row.consensus_timestamp));

/// Sequence numbers and timestamps a topic used within one partition.
///
/// Both ranges are half-open, so a single message `n` at `t` is
/// `[n, n + 1)` and `[t, t + 1)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicMessageLookup {
    pub topic_id: EntityId,
    pub partition: i64,
    pub sequence_number_range: TimestampRange,
    pub timestamp_range: TimestampRange,
}

impl TopicMessageLookup {
    pub fn of(message: &TopicMessage) -> Self {
        Self {
            topic_id: message.topic_id,
            partition: lookup_partition(message.consensus_timestamp),
            sequence_number_range: TimestampRange::closed(
                message.sequence_number,
                message.sequence_number.saturating_add(1),
            ),
            timestamp_range: TimestampRange::closed(
                message.consensus_timestamp,
                message.consensus_timestamp.saturating_add(1),
            ),
        }
    }
}

impl Row for TopicMessageLookup {
    const TABLE: Table = Table::TopicMessageLookup;

    fn key(&self) -> String {
        format!("{}/{}", id_key(self.topic_id), ts_key(self.partition))
    }

    fn timestamp_range(&self) -> Option<TimestampRange> {
        Some(self.timestamp_range)
    }

    fn merge(&mut self, later: &Self) {
        self.sequence_number_range = self.sequence_number_range.span(&later.sequence_number_range);
        self.timestamp_range = self.timestamp_range.span(&later.timestamp_range);
    }
}

// =============================================================================
// CONTRACTS AND FILES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContractResult {
    pub consensus_timestamp: ConsensusTimestamp,
    pub contract_id: EntityId,
    pub payer_account_id: EntityId,
    pub sender_id: Option<EntityId>,
    pub amount: i64,
    pub gas_limit: i64,
    pub gas_used: u64,
    pub function_parameters: Vec<u8>,
    pub call_result: Vec<u8>,
    pub error_message: String,
    pub bloom: Vec<u8>,
    pub created_contract_ids: Vec<EntityId>,
    pub transaction_result: i32,
}

transactional_row!(ContractResult, ContractResult, |row| ts_key(row.consensus_timestamp));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileData {
    pub consensus_timestamp: ConsensusTimestamp,
    pub entity_id: EntityId,
    pub transaction_type: TransactionType,
    pub file_data: Vec<u8>,
}

transactional_row!(FileData, FileData, |row| ts_key(row.consensus_timestamp));

// =============================================================================
// STAKING AND BALANCES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeStake {
    pub consensus_timestamp: ConsensusTimestamp,
    pub end_stake_period: ConsensusTimestamp,
    pub node_id: i64,
    pub stake: i64,
    pub reward_rate: i64,
    pub stake_rewarded: i64,
    pub stake_not_rewarded: i64,
    pub staking_period_minutes: i64,
}

transactional_row!(NodeStake, NodeStake, |row| format!(
    "{}/{:019}",
    ts_key(row.consensus_timestamp),
    row.node_id.max(0)
));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBalance {
    pub consensus_timestamp: ConsensusTimestamp,
    pub account_id: EntityId,
    pub balance: i64,
}

transactional_row!(AccountBalance, AccountBalance, |row| format!(
    "{}/{}",
    ts_key(row.consensus_timestamp),
    id_key(row.account_id)
));

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenBalance {
    pub consensus_timestamp: ConsensusTimestamp,
    pub account_id: EntityId,
    pub token_id: EntityId,
    pub balance: i64,
}

transactional_row!(TokenBalance, TokenBalance, |row| format!(
    "{}/{}/{}",
    ts_key(row.consensus_timestamp),
    id_key(row.account_id),
    id_key(row.token_id)
));

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::row::RowSet;

    fn id(num: i64) -> EntityId {
        EntityId::encode(0, 0, num).unwrap()
    }

    fn message(sequence_number: i64, consensus_timestamp: i64) -> TopicMessage {
        TopicMessage {
            consensus_timestamp,
            topic_id: id(800),
            sequence_number,
            message: b"hello".to_vec(),
            running_hash: vec![],
            running_hash_version: 3,
            payer_account_id: id(2),
            chunk_num: None,
            chunk_total: None,
            initial_transaction_id: None,
        }
    }

    #[test]
    fn test_transfers_sum_per_account() {
        let transfer = |amount| CryptoTransfer {
            consensus_timestamp: 5,
            entity_id: id(98),
            amount,
            payer_account_id: id(2),
            is_approval: false,
        };
        let mut rows = RowSet::default();
        rows.add(transfer(10));
        rows.add(transfer(-3));
        rows.add(transfer(7));

        assert_eq!(rows.len(), 1);
        assert_eq!(rows.latest(&transfer(0).key()).unwrap().amount, 14);
    }

    #[test]
    fn test_lookup_ranges_union_in_any_order() {
        let first = TopicMessageLookup::of(&message(1, 100));
        let second = TopicMessageLookup::of(&message(2, 200));
        let third = TopicMessageLookup::of(&message(3, 300));

        let mut forward = first.clone();
        forward.merge(&second);
        forward.merge(&third);
        let mut backward = third.clone();
        backward.merge(&second);
        backward.merge(&first);

        assert_eq!(forward, backward);
        assert_eq!(forward.sequence_number_range, TimestampRange::closed(1, 4));
        assert_eq!(forward.timestamp_range, TimestampRange::closed(100, 301));
    }

    #[test]
    fn test_lookup_partitions() {
        assert_eq!(lookup_partition(0), 0);
        assert_eq!(lookup_partition(LOOKUP_PARTITION_NANOS - 1), 0);
        assert_eq!(lookup_partition(LOOKUP_PARTITION_NANOS), LOOKUP_PARTITION_NANOS);
        assert_ne!(
            TopicMessageLookup::of(&message(1, 1)).key(),
            TopicMessageLookup::of(&message(2, LOOKUP_PARTITION_NANOS)).key()
        );
    }

    #[test]
    fn test_transactional_rows_replace() {
        let mut rows = RowSet::default();
        rows.add(message(1, 100));
        let mut replay = message(1, 100);
        replay.message = b"again".to_vec();
        rows.add(replay.clone());

        assert_eq!(rows.mutations(), 1);
        assert_eq!(rows.latest(&replay.key()), Some(replay));
    }
}
