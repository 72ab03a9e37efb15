//! # Stream Files (mn-03)
//!
//! Everything between raw bytes published by a consensus node and an ordered
//! list of record items.
//!
//! ## Architecture
//!
//! - `proto/` - Hand-maintained protobuf model of transactions, records and
//!   stream containers
//! - `domain/` - [`RecordItem`], typed stream files and [`TransactionType`]
//! - `reader/` - Version-checked readers and matching writers
//! - `ports/` - [`StreamFileProvider`], the read-only artifact source
//! - `adapters/` - Filesystem and in-memory providers
//!
//! ## Record File Integrity
//!
//! | Check | Failure |
//! |-------|---------|
//! | Version prefix is 6 | `UnsupportedVersion` |
//! | Running hash folds to the declared end hash | `RunningHashMismatch` |
//! | Consensus timestamps strictly increase | `NonMonotonic` |
//! | Content hash equals the agreed file hash | `FileHashMismatch` |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod proto;
pub mod reader;

pub use adapters::{InMemoryStreamFileProvider, LocalStreamFileProvider};
pub use domain::errors::{ProviderError, StreamFileError};
pub use domain::record_item::{transaction_from_body, RecordItem};
pub use domain::response_code::ResponseCode;
pub use domain::stream_file::{
    AccountBalance, AccountBalanceFile, RecordFile, StreamFile, StreamFileData, TokenBalance,
};
pub use domain::transaction_type::TransactionType;
pub use ports::outbound::{artifact_path, StreamFileProvider};
pub use reader::{
    BalanceFileReader, BalanceFileWriter, RecordFileReader, RecordFileWriter, StreamFileReader,
    BALANCE_FILE_VERSION, RECORD_FILE_VERSION,
};
