//! # Signature Errors

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SignatureError {
    /// The leading version byte must be 6.
    #[error("Signature file {filename} has version {version}")]
    UnsupportedVersion { filename: String, version: u8 },

    #[error("Signature file {filename} is malformed: {reason}")]
    Malformed { filename: String, reason: String },

    #[error("Signature file {filename} has no {kind} signature")]
    MissingSignature {
        filename: String,
        kind: &'static str,
    },

    #[error("Node {node_id} is not in the effective address book")]
    UnknownNode { node_id: i64 },

    #[error("Node {node_id} signed with {declared} but its key is {expected}")]
    KeyTypeMismatch {
        node_id: i64,
        declared: String,
        expected: String,
    },

    #[error("Node {node_id} public key is unusable: {reason}")]
    InvalidPublicKey { node_id: i64, reason: String },

    /// The signature does not match the signed hash.
    #[error("Node {node_id} {kind} signature does not verify")]
    VerificationFailed { node_id: i64, kind: &'static str },

    #[error("Quorum threshold {numerator}/{denominator} is not in (0, 1]")]
    InvalidThreshold { numerator: u64, denominator: u64 },

    #[error("No verified signatures")]
    NoSignatures,

    #[error("No file hash reached quorum: best weight {best} of {total}")]
    NoQuorum { best: u128, total: u128 },

    #[error("File hashes tied at weight {weight}")]
    Tie { weight: u128 },
}
