//! # Key Layout
//!
//! | Prefix | Value |
//! |--------|-------|
//! | `{table}/{natural key}` | current or transaction-scoped row |
//! | `{table}_history/{natural key}/{lower}` | superseded row |
//! | `{table}_closed/{upper}/{natural key}/{lower}` | history key, for retention |
//! | `stream_file/{stream}/{consensus end}` | committed file summary |
//! | `cursor/{stream}` | last committed file |
//! | `address_book/{start}` | address book snapshot |
//! | `address_book_pending/{file id}` | partial address book upload |
//! | `entity_alias/{hex}`, `entity_evm/{hex}` | entity id |
//!
//! Numeric segments are zero padded so lexical order is numeric order.

use mn_05_record_parser::domain::row::{id_key, ts_key};
use mn_05_record_parser::Table;
use shared_types::{ConsensusTimestamp, EntityId, StreamType};

pub const HISTORY_SUFFIX: &str = "_history";

pub fn table_prefix(table: Table) -> String {
    format!("{}/", table.name())
}

pub fn row_key(table: Table, key: &str) -> Vec<u8> {
    format!("{}/{}", table.name(), key).into_bytes()
}

pub fn history_prefix(table: Table) -> String {
    format!("{}{}/", table.name(), HISTORY_SUFFIX)
}

pub fn history_key(table: Table, key: &str, lower: ConsensusTimestamp) -> Vec<u8> {
    format!(
        "{}{}/{}/{}",
        table.name(),
        HISTORY_SUFFIX,
        key,
        ts_key(lower)
    )
    .into_bytes()
}

pub const CLOSED_SUFFIX: &str = "_closed";

/// Index entry of a history row, ordered by the instant it was closed.
pub fn closed_key(
    table: Table,
    upper: ConsensusTimestamp,
    key: &str,
    lower: ConsensusTimestamp,
) -> Vec<u8> {
    format!(
        "{}{}/{}/{}/{}",
        table.name(),
        CLOSED_SUFFIX,
        ts_key(upper),
        key,
        ts_key(lower)
    )
    .into_bytes()
}

/// First closed-index key of rows closed at `ts` or later.
pub fn closed_key_at(table: Table, ts: ConsensusTimestamp) -> Vec<u8> {
    format!("{}{}/{}", table.name(), CLOSED_SUFFIX, ts_key(ts)).into_bytes()
}

/// Key of a transaction-scoped row at the start of `ts`'s slot.
pub fn row_key_at(table: Table, ts: ConsensusTimestamp) -> Vec<u8> {
    row_key(table, &ts_key(ts))
}

pub fn stream_file_prefix(stream_type: StreamType) -> String {
    format!("stream_file/{}/", stream_type.as_str())
}

pub fn stream_file_key(stream_type: StreamType, consensus_end: ConsensusTimestamp) -> Vec<u8> {
    format!("{}{}", stream_file_prefix(stream_type), ts_key(consensus_end)).into_bytes()
}

pub fn cursor_key(stream_type: StreamType) -> Vec<u8> {
    format!("cursor/{}", stream_type.as_str()).into_bytes()
}

pub const ADDRESS_BOOK_PREFIX: &str = "address_book/";
pub const ADDRESS_BOOK_PENDING_PREFIX: &str = "address_book_pending/";

pub fn address_book_key(start: ConsensusTimestamp) -> Vec<u8> {
    format!("{ADDRESS_BOOK_PREFIX}{}", ts_key(start)).into_bytes()
}

pub fn address_book_pending_key(file_id: EntityId) -> Vec<u8> {
    format!("{ADDRESS_BOOK_PENDING_PREFIX}{}", id_key(file_id)).into_bytes()
}

pub fn alias_key(alias: &[u8]) -> Vec<u8> {
    format!("entity_alias/{}", hex::encode(alias)).into_bytes()
}

pub fn evm_address_key(address: &[u8]) -> Vec<u8> {
    format!("entity_evm/{}", hex::encode(address)).into_bytes()
}

/// Leading timestamp of a transaction-scoped natural key.
pub fn leading_timestamp(key: &[u8], prefix_len: usize) -> Option<ConsensusTimestamp> {
    let segment = key.get(prefix_len..prefix_len + 19)?;
    std::str::from_utf8(segment).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_sort_numerically() {
        let early = stream_file_key(StreamType::Record, 9);
        let late = stream_file_key(StreamType::Record, 10);
        assert!(early < late);
        assert!(address_book_key(99) < address_book_key(100));
    }

    #[test]
    fn test_history_key_layout() {
        let key = history_key(Table::Entity, "00000000000000001001", 5);
        assert_eq!(
            String::from_utf8(key).unwrap(),
            "entity_history/00000000000000001001/0000000000000000005"
        );
        assert!(!history_prefix(Table::Entity).starts_with(&table_prefix(Table::Entity)));
    }

    #[test]
    fn test_closed_index_sorts_by_upper() {
        let early = closed_key(Table::Entity, 9, "00000000000000001002", 1);
        let late = closed_key(Table::Entity, 10, "00000000000000001001", 1);
        assert!(early < late);
        assert!(closed_key_at(Table::Entity, 9) <= early);
        assert!(early < closed_key_at(Table::Entity, 10));
        assert_eq!(
            String::from_utf8(late).unwrap(),
            "entity_closed/0000000000000000010/00000000000000001001/0000000000000000001"
        );
    }

    #[test]
    fn test_leading_timestamp() {
        let key = row_key_at(Table::Transaction, 1_234);
        let prefix = table_prefix(Table::Transaction).len();
        assert_eq!(leading_timestamp(&key, prefix), Some(1_234));
        assert_eq!(leading_timestamp(b"transaction/abc", prefix), None);
    }
}
