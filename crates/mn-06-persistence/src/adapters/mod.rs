//! Adapters for the persistence ports.

pub mod memory;

pub use memory::InMemoryKVStore;
