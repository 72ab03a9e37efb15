//! # Signature Verification (mn-02)
//!
//! Every stream file is accompanied by one signature file per consensus
//! node. This crate reads those files, verifies each node's signatures with
//! the key from the effective address book and decides which file hash the
//! nodes agree on.
//!
//! ## Quorum
//!
//! | Mode | Vote weight | Total |
//! |------|-------------|-------|
//! | `Stake` | node stake | address book total stake |
//! | `Count` | 1 | node count |
//!
//! A hash wins when `weight * denominator > total * numerator`. `Stake`
//! falls back to `Count` when the book carries no stake. Two hashes tied
//! for the best qualifying weight fail the round.

pub mod domain;
pub mod ports;
pub mod proto;
pub mod service;

pub use domain::entities::{
    NodeSignature, QuorumConfig, QuorumMode, QuorumResult, SignatureStatus, Threshold,
};
pub use domain::errors::SignatureError;
pub use domain::quorum::reach_quorum;
pub use domain::reader::{write_signature_file, SignatureFileReader, SIGNATURE_FILE_VERSION};
pub use domain::signer::NodeSigner;
pub use domain::verify::{verify_node_signature, verify_signature};
pub use ports::inbound::SignatureVerificationApi;
pub use service::SignatureVerificationService;
