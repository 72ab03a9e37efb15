//! # Ports
//!
//! - `inbound` - What the downloader and parser call
//! - `outbound` - Where snapshots and partial uploads are stored

pub mod inbound;
pub mod outbound;
