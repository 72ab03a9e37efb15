//! # Record Parser (mn-05)
//!
//! Maps verified stream files to table mutations. Each record item is routed
//! to the handler of its transaction kind; the rows it produces accumulate in
//! a [`ParserContext`] that the persistence layer commits as one batch.
//!
//! ## Architecture
//!
//! - `domain/` - Rows, tables, the per-file context and parser config
//! - `handlers/` - One [`TransactionHandler`] per transaction kind and the
//!   [`HandlerRegistry`]
//! - `service/` - [`RecordFileParser`] and the [`EntityIdService`]
//! - `ports/` - [`RecordParserApi`] and [`EntityLookup`]
//! - `adapters/` - In-memory entity lookup
//!
//! ## Row Kinds
//!
//! | Kind | Merge within a file | Stored as |
//! |------|---------------------|-----------|
//! | History | Kept in order, folded on persist | current row + closed history |
//! | Current | Columns merged | single row |
//! | Transactional | Replaced | one row per consensus timestamp |
//! | Aggregated | Amounts summed | one row per timestamp and party |
//! | Range union | Ranges spanned | one row per partition |
//!
//! ## Failure Handling
//!
//! Unresolvable aliases and invalid ids are recoverable: the id becomes
//! EMPTY, the error is counted and parsing continues. With `halt_on_error`
//! they fail the file instead. Anything else fails the file.

pub mod adapters;
pub mod domain;
pub mod handlers;
pub mod ports;
pub mod service;

pub use adapters::InMemoryEntityLookup;
pub use domain::config::ParserConfig;
pub use domain::context::{ParserContext, TableOf, TableVisitor, Tables};
pub use domain::entities::{
    AirdropState, CryptoAllowance, Entity, EntityType, Nft, NftAllowance, Node, Schedule, Token,
    TokenAccount, TokenAirdrop, TokenAllowance, TokenType,
};
pub use domain::errors::ParserError;
pub use domain::records::{
    AccountBalance, ContractResult, CryptoTransfer, EntityTransaction, FileData, NodeStake,
    TokenBalance, TokenTransfer, TopicMessage, TopicMessageLookup, TransactionRow,
};
pub use domain::row::{fold_history, Folded, Row, RowSet, Table, TableKind};
pub use handlers::{EntityOperation, HandlerRegistry, TransactionHandler};
pub use ports::inbound::RecordParserApi;
pub use ports::outbound::EntityLookup;
pub use service::entity_id::EntityIdService;
pub use service::RecordFileParser;
