//! Stream file provider adapters.

pub mod local;
pub mod memory;

pub use local::LocalStreamFileProvider;
pub use memory::InMemoryStreamFileProvider;
