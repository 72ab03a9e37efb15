//! Domain layer of the record parser.

pub mod config;
pub mod context;
pub mod entities;
pub mod errors;
pub mod records;
pub mod row;
