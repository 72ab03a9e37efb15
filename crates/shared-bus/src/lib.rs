//! # Shared Bus - Importer Notifications
//!
//! Fan-out of importer events to in-process listeners once a stream file
//! has been committed or the address book has moved to a new version.
//!
//! ```text
//! ┌──────────────┐                    ┌──────────────┐
//! │  Downloader  │                    │   Listener   │
//! │              │    publish()       │              │
//! │              │ ──────┐            │              │
//! └──────────────┘       │            └──────────────┘
//!                        ▼                    ↑
//!                  ┌──────────────┐          │
//!                  │  Event Bus   │          │
//!                  │              │ ─────────┘
//!                  └──────────────┘  subscribe()
//! ```
//!
//! Events are published only after the persistence commit they describe,
//! so a listener never observes state that could still be rolled back.

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, MirrorEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before lagging.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
