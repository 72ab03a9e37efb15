//! # Signature Entities

use mn_01_address_book::KeyType;
use serde::{Deserialize, Serialize};
use shared_types::{Sha384Hash, StreamFilename};
use std::fmt;

/// Lifecycle of one node's signature for one file.
///
/// `Downloaded -> Verified | NotVerified`, then `Verified -> Consensus`
/// for the nodes that voted for the agreed hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SignatureStatus {
    Downloaded,
    Verified,
    NotVerified,
    Consensus,
}

impl SignatureStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SignatureStatus::Downloaded => "downloaded",
            SignatureStatus::Verified => "verified",
            SignatureStatus::NotVerified => "not_verified",
            SignatureStatus::Consensus => "consensus",
        }
    }
}

impl fmt::Display for SignatureStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One node's signature over one stream file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSignature {
    /// Signature filename as listed by the node.
    pub filename: StreamFilename,
    pub node_id: i64,
    pub signature_type: KeyType,
    pub file_hash: Sha384Hash,
    pub file_hash_signature: Vec<u8>,
    pub metadata_hash: Sha384Hash,
    pub metadata_hash_signature: Vec<u8>,
    pub status: SignatureStatus,
}

impl NodeSignature {
    pub fn is_verified(&self) -> bool {
        matches!(
            self.status,
            SignatureStatus::Verified | SignatureStatus::Consensus
        )
    }
}

/// How votes are weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuorumMode {
    /// Node stake from the effective address book.
    Stake,
    /// One vote per node.
    Count,
}

/// Fraction of the total weight a hash must strictly exceed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Threshold {
    numerator: u64,
    denominator: u64,
}

impl Threshold {
    /// Strict majority.
    pub const MAJORITY: Threshold = Threshold {
        numerator: 1,
        denominator: 2,
    };

    pub fn new(numerator: u64, denominator: u64) -> Option<Self> {
        if numerator == 0 || denominator == 0 || numerator > denominator {
            return None;
        }
        Some(Self {
            numerator,
            denominator,
        })
    }

    pub fn numerator(&self) -> u64 {
        self.numerator
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    /// At least one half: a qualifying hash cannot be overtaken.
    pub fn is_majority_or_more(&self) -> bool {
        2 * u128::from(self.numerator) >= u128::from(self.denominator)
    }

    /// `weight / total > numerator / denominator`, without division. A
    /// threshold of one requires the whole weight.
    pub fn is_met(&self, weight: u128, total: u128) -> bool {
        let lhs = weight * u128::from(self.denominator);
        let rhs = total * u128::from(self.numerator);
        if self.numerator == self.denominator {
            return total > 0 && lhs >= rhs;
        }
        lhs > rhs
    }
}

impl Default for Threshold {
    fn default() -> Self {
        Self::MAJORITY
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuorumConfig {
    pub mode: QuorumMode,
    pub threshold: Threshold,
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            mode: QuorumMode::Stake,
            threshold: Threshold::MAJORITY,
        }
    }
}

/// The agreed hash of one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuorumResult {
    pub file_hash: Sha384Hash,
    pub metadata_hash: Sha384Hash,
    pub weight: u128,
    pub total: u128,
    /// Mode actually applied; `Stake` falls back to `Count` without stake.
    pub mode: QuorumMode,
    /// Nodes that voted for `file_hash`, ascending.
    pub nodes: Vec<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_bounds() {
        assert!(Threshold::new(0, 2).is_none());
        assert!(Threshold::new(1, 0).is_none());
        assert!(Threshold::new(3, 2).is_none());
        assert!(Threshold::new(1, 1).is_some());
    }

    #[test]
    fn test_threshold_is_strict() {
        let majority = Threshold::MAJORITY;
        assert!(!majority.is_met(50, 100));
        assert!(majority.is_met(51, 100));

        let two_thirds = Threshold::new(2, 3).unwrap();
        assert!(!two_thirds.is_met(2, 3));
        assert!(two_thirds.is_met(3, 4));

        assert!(majority.is_majority_or_more());
        assert!(!Threshold::new(1, 3).unwrap().is_majority_or_more());

        let all = Threshold::new(1, 1).unwrap();
        assert!(all.is_met(4, 4));
        assert!(!all.is_met(3, 4));
        assert!(!all.is_met(0, 0));
    }
}
