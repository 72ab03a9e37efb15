//! # Ports
//!
//! - `inbound` - [`DownloaderApi`](inbound::DownloaderApi), driven by schedulers
//! - `outbound` - Where verified files go and who hears about them

pub mod inbound;
pub mod outbound;
