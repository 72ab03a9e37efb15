//! # Importer Runtime Library
//!
//! Exposes the importer's wiring for the binary and for end-to-end tests.
//! The main entry point is the `main.rs` binary.
//!
//! ## Modules
//!
//! - `config` - [`ImporterConfig`]: TOML file plus `MN_*` overrides
//! - `container` - [`ImporterContainer`]: subsystem instances and wiring
//! - `adapters/` - RocksDB store and the stream file consumers
//! - `scheduler` - Download and retention schedulers
//! - `runtime` - [`ImporterRuntime`]: task lifecycle

pub mod adapters;
pub mod config;
pub mod container;
pub mod runtime;
pub mod scheduler;

pub use config::{ConfigError, ImporterConfig};
pub use container::ImporterContainer;
pub use runtime::ImporterRuntime;
