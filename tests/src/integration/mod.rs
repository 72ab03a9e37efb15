//! # Integration Tests
//!
//! The importer wired as in production, over an in-memory store and an
//! in-memory bucket served by simulated consensus nodes.

pub mod network;
mod pipeline;
