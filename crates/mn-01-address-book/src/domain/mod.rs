//! # Domain Layer
//!
//! Consensus nodes, immutable address book snapshots, the append-only
//! history and the per-file stage that accumulates address book updates.

pub mod address_book;
pub mod errors;
pub mod history;
pub mod node;
pub mod stage;
