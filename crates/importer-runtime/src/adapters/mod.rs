//! # Adapters
//!
//! Production implementations of the outbound ports:
//!
//! - `rocksdb` - [`RocksDbStore`], the persistence key-value store
//! - `consumers` - Record and balance stream consumers (parse, then commit)

pub mod consumers;
#[cfg(feature = "rocksdb")]
pub mod rocksdb;

pub use consumers::{BalanceStreamConsumer, RecordStreamConsumer};
#[cfg(feature = "rocksdb")]
pub use self::rocksdb::{RocksDbConfig, RocksDbStore};
