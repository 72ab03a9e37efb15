//! # Ports
//!
//! - `inbound` - [`PersistenceApi`](inbound::PersistenceApi), driven by the
//!   stream file consumers
//! - `outbound` - [`KeyValueStore`](outbound::KeyValueStore), the ordered
//!   backend

pub mod inbound;
pub mod outbound;
