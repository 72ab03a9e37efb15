//! # Domain Layer
//!
//! Pure signature logic: reading signature files, checking node signatures
//! and deciding quorum.

pub mod entities;
pub mod errors;
pub mod quorum;
pub mod reader;
pub mod signer;
pub mod verify;
