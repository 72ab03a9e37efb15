//! # Domain Layer
//!
//! Pure download logic: which window to fetch next, the round state machine
//! and the checks a verified file must pass before it is handed on.

pub mod chain;
pub mod config;
pub mod date_range;
pub mod errors;
pub mod state;
