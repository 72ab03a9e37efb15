//! # Adapters
//!
//! - `bootstrap` - Reads the initial address book from disk
//! - `memory` - In-memory repository for tests and single-process runs

pub mod bootstrap;
pub mod memory;

pub use bootstrap::load_bootstrap;
pub use memory::InMemoryAddressBookRepository;
