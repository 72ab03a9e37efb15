//! # Shared Types Crate
//!
//! Types every importer crate agrees on.
//!
//! ## Contents
//!
//! - **Identifiers**: [`EntityId`] with its packed 64-bit codec and the
//!   bounded [`EntityIdCache`].
//! - **Time**: nanosecond [`ConsensusTimestamp`] values and half-open
//!   [`TimestampRange`] validity ranges.
//! - **Streams**: [`StreamType`] and [`StreamFilename`].
//! - **Digests**: [`Sha384Hash`].
//! - **Partial updates**: [`Patch`], the explicit "preserve existing value"
//!   wrapper used in mutation records.

pub mod entity_id;
pub mod errors;
pub mod hash;
pub mod patch;
pub mod stream;
pub mod timestamp;

pub use entity_id::{EntityId, EntityIdCache};
pub use errors::*;
pub use hash::{sha384, Sha384Hash, SHA384_LEN};
pub use patch::Patch;
pub use stream::{StreamFilename, StreamType};
pub use timestamp::{ConsensusTimestamp, TimestampRange};
