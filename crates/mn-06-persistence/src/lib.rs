//! # Persistence (mn-06)
//!
//! Commits parsed stream files to an ordered key-value store and prunes
//! them once they age out.
//!
//! ## Architecture
//!
//! - `domain/` - Key layout, upsert generators, retention config, errors
//! - `service/` - [`PersistenceService`] and [`RetentionService`]
//! - `ports/` - [`PersistenceApi`] (inbound), [`KeyValueStore`] (outbound)
//! - `adapters/` - In-memory store
//!
//! ## Commit Semantics
//!
//! One stream file is one atomic batch: rows, alias indexes, address book
//! snapshots, the file summary and the cursor. A file whose end matches the
//! committed cursor is acknowledged without writing; an earlier one is a
//! [`PersistenceError::CursorRegression`].
//!
//! [`PersistenceService`] also serves as the address book repository and
//! the alias lookup of the record parser.

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::InMemoryKVStore;
pub use domain::config::RetentionConfig;
pub use domain::errors::{KVStoreError, PersistenceError};
pub use domain::upsert::{generator_for, upsert_tables, UpsertBatch, UpsertGenerator, UpsertStats};
pub use ports::inbound::{CommitSummary, PersistenceApi};
pub use ports::outbound::{BatchOperation, KeyValueStore};
pub use service::retention::{RetentionService, RetentionSummary};
pub use service::PersistenceService;
