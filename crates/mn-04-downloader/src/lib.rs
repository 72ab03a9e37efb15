//! # Downloader (mn-04)
//!
//! Turns node-published artifacts into verified stream files, one round at
//! a time, and hands them to a consumer strictly in consensus order.
//!
//! ## Round States
//!
//! ```text
//! Idle -> Fetching -> Verifying -> QuorumReached -> Parsing -> Committed -> Idle
//!            |            |              |             |
//!            +------------+--> QuorumFailed    ParseFailed <--+
//! ```
//!
//! A failed file leaves everything before it committed and is retried on
//! the next round.
//!
//! ## Checks Before Hand-off
//!
//! | Check | Error |
//! |-------|-------|
//! | Body hash equals the agreed file hash | `NoMatchingBody` |
//! | Metadata hash equals the agreed one | `MetadataHashMismatch` |
//! | Consensus start after the last committed end | `OutOfOrder` |
//! | Previous hash equals the last committed hash | `HashChain` |

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{BusNotifier, InMemoryStreamFileConsumer, LeaderLease, NoopNotifier};
pub use domain::chain::{verify_continuity, verify_hash_chain, StreamCursor};
pub use domain::config::DownloaderConfig;
pub use domain::date_range::{DateRange, DateRangeCalculator};
pub use domain::errors::DownloaderError;
pub use domain::state::{RoundState, RoundTracker};
pub use ports::inbound::{DownloaderApi, RoundSummary};
pub use ports::outbound::{StreamFileConsumer, StreamFileNotifier};
pub use service::{Downloader, DownloaderPorts};
