//! # Ports
//!
//! - `inbound` - [`RecordParserApi`](inbound::RecordParserApi), driven by the
//!   stream file consumers
//! - `outbound` - [`EntityLookup`](outbound::EntityLookup), reverse lookups of
//!   aliases against persisted entities

pub mod inbound;
pub mod outbound;
