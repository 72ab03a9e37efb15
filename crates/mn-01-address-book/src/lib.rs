//! # Address Book (mn-01)
//!
//! Versioned record of the consensus nodes allowed to sign stream files and
//! their stake weights.
//!
//! ## Architecture
//!
//! - `proto` - Address book file encoding
//! - `domain/` - Nodes, snapshots, history and the per-file stage
//! - `ports/` - [`AddressBookApi`] and [`AddressBookRepository`]
//! - `service.rs` - [`AddressBookService`]
//! - `adapters/` - Bootstrap loader and in-memory repository
//!
//! ## Invariants
//!
//! | Invariant | Enforced by |
//! |-----------|-------------|
//! | Snapshots are never empty | `AddressBook::new` |
//! | History only grows, in start order | `AddressBookHistory::append` |
//! | Readers keep a stable view | `Arc` snapshots |
//! | Stream updates become visible only after persistence | `AddressBookStage` + `commit` |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod proto;
pub mod service;

pub use adapters::{load_bootstrap, InMemoryAddressBookRepository};
pub use domain::address_book::{
    is_address_book_file, AddressBook, ADDRESS_BOOK_FILE_ID, NODE_DETAILS_FILE_ID,
};
pub use domain::errors::AddressBookError;
pub use domain::history::AddressBookHistory;
pub use domain::node::{ConsensusNode, Endpoint, KeyType, NodePublicKey};
pub use domain::stage::{AddressBookStage, PendingContents};
pub use ports::inbound::AddressBookApi;
pub use ports::outbound::AddressBookRepository;
pub use service::AddressBookService;
