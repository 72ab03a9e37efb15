//! Adapters for the parser's outbound ports.

pub mod memory;

pub use memory::InMemoryEntityLookup;
