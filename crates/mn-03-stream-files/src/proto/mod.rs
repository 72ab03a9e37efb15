//! # Ledger Protobuf Model
//!
//! Hand-maintained `prost` messages for the parts of the ledger API the
//! importer reads. Unknown fields are skipped on decode.

mod basic;
mod record;
mod stream;
mod transaction;

pub use basic::*;
pub use record::*;
pub use stream::*;
pub use transaction::*;
