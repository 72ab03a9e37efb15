//! # Quorum
//!
//! Groups verified votes by the signed `(file hash, metadata hash)` pair and
//! weighs them against the effective address book. Each node votes at most
//! once, so a node signing the right file hash with a wrong metadata hash
//! only splits off its own vote.

use crate::domain::entities::{
    NodeSignature, QuorumConfig, QuorumMode, QuorumResult, SignatureStatus,
};
use crate::domain::errors::SignatureError;
use mn_01_address_book::AddressBook;
use shared_types::Sha384Hash;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Default)]
struct Tally {
    weight: u128,
    nodes: BTreeSet<i64>,
}

/// `(file hash, metadata hash)` signed together by a node.
type Vote = (Sha384Hash, Sha384Hash);

/// Decides the agreed hash among verified signatures and marks the winning
/// voters `Consensus`.
pub fn reach_quorum(
    signatures: &mut [NodeSignature],
    book: &AddressBook,
    config: &QuorumConfig,
) -> Result<QuorumResult, SignatureError> {
    let mode = effective_mode(config.mode, book);
    let total = match mode {
        QuorumMode::Stake => u128::from(book.total_stake()),
        QuorumMode::Count => book.len() as u128,
    };

    let mut voted = BTreeSet::new();
    let mut tallies: BTreeMap<Vote, Tally> = BTreeMap::new();
    let mut ordered: Vec<&NodeSignature> =
        signatures.iter().filter(|s| s.is_verified()).collect();
    ordered.sort_by_key(|s| s.node_id);

    for signature in ordered {
        let Some(node) = book.node(signature.node_id) else {
            continue;
        };
        if !voted.insert(signature.node_id) {
            continue;
        }
        let weight = match mode {
            QuorumMode::Stake => u128::from(node.stake),
            QuorumMode::Count => 1,
        };
        let tally = tallies
            .entry((signature.file_hash, signature.metadata_hash))
            .or_default();
        tally.weight += weight;
        tally.nodes.insert(signature.node_id);
    }

    if tallies.is_empty() {
        return Err(SignatureError::NoSignatures);
    }

    let mut qualifying: Vec<(&Vote, &Tally)> = tallies
        .iter()
        .filter(|(_, tally)| config.threshold.is_met(tally.weight, total))
        .collect();
    qualifying.sort_by(|a, b| b.1.weight.cmp(&a.1.weight));

    let ((file_hash, metadata_hash), tally) = match qualifying.as_slice() {
        [] => {
            let best = tallies.values().map(|t| t.weight).max().unwrap_or(0);
            return Err(SignatureError::NoQuorum { best, total });
        }
        [(_, first), (_, second), ..] if first.weight == second.weight => {
            return Err(SignatureError::Tie {
                weight: first.weight,
            });
        }
        [(vote, tally), ..] => (**vote, *tally),
    };

    let result = QuorumResult {
        file_hash,
        metadata_hash,
        weight: tally.weight,
        total,
        mode,
        nodes: tally.nodes.iter().copied().collect(),
    };

    for signature in signatures.iter_mut() {
        if signature.is_verified()
            && signature.file_hash == file_hash
            && signature.metadata_hash == metadata_hash
            && result.nodes.contains(&signature.node_id)
        {
            signature.status = SignatureStatus::Consensus;
        }
    }
    Ok(result)
}

fn effective_mode(mode: QuorumMode, book: &AddressBook) -> QuorumMode {
    match mode {
        QuorumMode::Stake if book.total_stake() == 0 => QuorumMode::Count,
        mode => mode,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::Threshold;
    use mn_01_address_book::{
        ConsensusNode, KeyType, NodePublicKey, NODE_DETAILS_FILE_ID,
    };
    use proptest::prelude::*;
    use shared_types::{sha384, EntityId, StreamFilename};

    fn book(stakes: &[u64]) -> AddressBook {
        let nodes = stakes
            .iter()
            .enumerate()
            .map(|(i, stake)| ConsensusNode {
                node_id: i as i64,
                node_account_id: EntityId::from_raw(3 + i as u64),
                public_key: NodePublicKey::new(KeyType::Ed25519, vec![i as u8; 32]).unwrap(),
                stake: *stake,
                endpoints: vec![],
                description: String::new(),
            })
            .collect();
        AddressBook::new(NODE_DETAILS_FILE_ID, 0, nodes).unwrap()
    }

    fn vote(node_id: i64, hash: &[u8]) -> NodeSignature {
        NodeSignature {
            filename: StreamFilename::parse("2024-03-01T12_00_02.000000123Z.rcd_sig").unwrap(),
            node_id,
            signature_type: KeyType::Ed25519,
            file_hash: sha384(&[hash]),
            file_hash_signature: vec![],
            metadata_hash: sha384(&[b"meta", hash]),
            metadata_hash_signature: vec![],
            status: SignatureStatus::Verified,
        }
    }

    fn stake_majority() -> QuorumConfig {
        QuorumConfig::default()
    }

    #[test]
    fn test_stake_majority_wins() {
        let book = book(&[10, 20, 30, 40]);
        let mut votes = vec![vote(2, b"a"), vote(3, b"a"), vote(0, b"b")];
        let result = reach_quorum(&mut votes, &book, &stake_majority()).unwrap();

        assert_eq!(result.file_hash, sha384(&[b"a"]));
        assert_eq!(result.metadata_hash, sha384(&[b"meta", b"a"]));
        assert_eq!(result.weight, 70);
        assert_eq!(result.total, 100);
        assert_eq!(result.nodes, vec![2, 3]);
        assert_eq!(votes[0].status, SignatureStatus::Consensus);
        assert_eq!(votes[2].status, SignatureStatus::Verified);
    }

    #[test]
    fn test_exactly_half_fails() {
        let book = book(&[25, 25, 25, 25]);
        let mut votes = vec![vote(0, b"a"), vote(1, b"a")];
        assert_eq!(
            reach_quorum(&mut votes, &book, &stake_majority()),
            Err(SignatureError::NoQuorum {
                best: 50,
                total: 100
            })
        );
    }

    #[test]
    fn test_unverified_votes_ignored() {
        let book = book(&[1, 1, 1]);
        let mut votes = vec![vote(0, b"a"), vote(1, b"a"), vote(2, b"a")];
        votes[1].status = SignatureStatus::NotVerified;
        votes[2].status = SignatureStatus::NotVerified;
        assert!(matches!(
            reach_quorum(&mut votes, &book, &stake_majority()),
            Err(SignatureError::NoQuorum { best: 1, total: 3 })
        ));

        for vote in votes.iter_mut() {
            vote.status = SignatureStatus::NotVerified;
        }
        assert_eq!(
            reach_quorum(&mut votes, &book, &stake_majority()),
            Err(SignatureError::NoSignatures)
        );
    }

    #[test]
    fn test_zero_stake_falls_back_to_count() {
        let book = book(&[0, 0, 0]);
        let mut votes = vec![vote(0, b"a"), vote(1, b"a"), vote(2, b"b")];
        let result = reach_quorum(&mut votes, &book, &stake_majority()).unwrap();
        assert_eq!(result.mode, QuorumMode::Count);
        assert_eq!(result.weight, 2);
        assert_eq!(result.total, 3);
    }

    #[test]
    fn test_duplicate_and_unknown_nodes() {
        let book = book(&[1, 1, 1, 1]);
        let mut votes = vec![vote(0, b"a"), vote(0, b"a"), vote(0, b"a"), vote(9, b"a")];
        assert!(matches!(
            reach_quorum(&mut votes, &book, &stake_majority()),
            Err(SignatureError::NoQuorum { best: 1, total: 4 })
        ));
    }

    #[test]
    fn test_low_threshold_tie() {
        let book = book(&[1, 1, 1, 1]);
        let config = QuorumConfig {
            mode: QuorumMode::Count,
            threshold: Threshold::new(1, 3).unwrap(),
        };
        let mut votes = vec![vote(0, b"a"), vote(1, b"a"), vote(2, b"b"), vote(3, b"b")];
        assert_eq!(
            reach_quorum(&mut votes, &book, &config),
            Err(SignatureError::Tie { weight: 2 })
        );
    }

    #[test]
    fn test_wrong_metadata_hash_splits_only_its_vote() {
        let book = book(&[1, 1, 1, 1]);
        let mut votes = vec![vote(0, b"a"), vote(1, b"a"), vote(2, b"a"), vote(3, b"a")];
        votes[0].metadata_hash = sha384(&[b"bogus"]);

        let result = reach_quorum(&mut votes, &book, &stake_majority()).unwrap();
        assert_eq!(result.file_hash, sha384(&[b"a"]));
        assert_eq!(result.metadata_hash, sha384(&[b"meta", b"a"]));
        assert_eq!(result.nodes, vec![1, 2, 3]);
        assert_eq!(votes[0].status, SignatureStatus::Verified);
        assert_eq!(votes[1].status, SignatureStatus::Consensus);
    }

    #[test]
    fn test_split_metadata_hash_can_lose_quorum() {
        let book = book(&[1, 1, 1, 1]);
        let mut votes = vec![vote(0, b"a"), vote(1, b"a"), vote(2, b"a"), vote(3, b"a")];
        votes[0].metadata_hash = sha384(&[b"bogus"]);
        votes[1].metadata_hash = sha384(&[b"bogus"]);

        assert_eq!(
            reach_quorum(&mut votes, &book, &stake_majority()),
            Err(SignatureError::NoQuorum { best: 2, total: 4 })
        );
    }

    proptest! {
        #[test]
        fn prop_quorum_iff_weight_exceeds_threshold(
            stakes in proptest::collection::vec(0u64..1_000, 1..8),
            voters in proptest::collection::vec(any::<bool>(), 8),
        ) {
            let book = book(&stakes);
            let mut votes: Vec<NodeSignature> = (0..stakes.len())
                .filter(|i| voters[*i])
                .map(|i| vote(i as i64, b"a"))
                .collect();
            prop_assume!(!votes.is_empty());

            let total_stake: u64 = stakes.iter().sum();
            let (weight, total) = if total_stake == 0 {
                (votes.len() as u128, stakes.len() as u128)
            } else {
                let weight: u64 = votes.iter().map(|v| stakes[v.node_id as usize]).sum();
                (u128::from(weight), u128::from(total_stake))
            };

            let result = reach_quorum(&mut votes, &book, &stake_majority());
            prop_assert_eq!(result.is_ok(), weight * 2 > total);
        }
    }
}
