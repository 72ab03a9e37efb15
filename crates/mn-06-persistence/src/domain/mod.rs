//! Domain layer of the persistence crate.

pub mod config;
pub mod errors;
pub mod keys;
pub mod upsert;
