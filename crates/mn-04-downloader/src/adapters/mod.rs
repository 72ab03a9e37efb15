//! # Adapters
//!
//! - `lease` - File-backed leader lease (fs2)
//! - `notifier` - Publishes committed files to the event bus
//! - `memory` - In-memory consumer for tests and dry runs

pub mod lease;
pub mod memory;
pub mod notifier;

pub use lease::LeaderLease;
pub use memory::InMemoryStreamFileConsumer;
pub use notifier::{BusNotifier, NoopNotifier};
