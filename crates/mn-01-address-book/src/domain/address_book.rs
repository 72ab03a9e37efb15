//! # Address Book Snapshot
//!
//! One immutable version of the node set, effective from its start
//! consensus timestamp until the next snapshot starts.

use crate::domain::errors::AddressBookError;
use crate::domain::node::ConsensusNode;
use crate::proto::NodeAddressBook;
use prost::Message;
use serde::{Deserialize, Serialize};
use shared_types::{ConsensusTimestamp, EntityId};
use std::collections::{HashMap, HashSet};

/// Node details file.
pub const NODE_DETAILS_FILE_ID: EntityId = EntityId::from_raw(102);
/// Address book file.
pub const ADDRESS_BOOK_FILE_ID: EntityId = EntityId::from_raw(101);

/// Whether updates to `file_id` carry address book contents.
pub fn is_address_book_file(file_id: EntityId) -> bool {
    file_id == NODE_DETAILS_FILE_ID || file_id == ADDRESS_BOOK_FILE_ID
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressBook {
    file_id: EntityId,
    start_consensus_timestamp: ConsensusTimestamp,
    /// Sorted by node id.
    nodes: Vec<ConsensusNode>,
    total_stake: u64,
}

impl AddressBook {
    pub fn new(
        file_id: EntityId,
        start_consensus_timestamp: ConsensusTimestamp,
        mut nodes: Vec<ConsensusNode>,
    ) -> Result<Self, AddressBookError> {
        if nodes.is_empty() {
            return Err(AddressBookError::Empty { file_id });
        }
        nodes.sort_by_key(|node| node.node_id);
        let mut seen = HashSet::with_capacity(nodes.len());
        for node in &nodes {
            if !seen.insert(node.node_id) {
                return Err(AddressBookError::DuplicateNode {
                    node_id: node.node_id,
                });
            }
        }
        let total_stake = nodes
            .iter()
            .fold(0u64, |total, node| total.saturating_add(node.stake));

        Ok(Self {
            file_id,
            start_consensus_timestamp,
            nodes,
            total_stake,
        })
    }

    /// Decodes the contents of an address book file.
    pub fn from_bytes(
        file_id: EntityId,
        start_consensus_timestamp: ConsensusTimestamp,
        bytes: &[u8],
    ) -> Result<Self, AddressBookError> {
        let book =
            NodeAddressBook::decode(bytes).map_err(|e| AddressBookError::Decode(e.to_string()))?;
        let nodes = book
            .node_address
            .iter()
            .map(ConsensusNode::from_proto)
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(file_id, start_consensus_timestamp, nodes)
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        NodeAddressBook {
            node_address: self.nodes.iter().map(ConsensusNode::to_proto).collect(),
        }
        .encode_to_vec()
    }

    pub fn file_id(&self) -> EntityId {
        self.file_id
    }

    pub fn start_consensus_timestamp(&self) -> ConsensusTimestamp {
        self.start_consensus_timestamp
    }

    pub fn nodes(&self) -> &[ConsensusNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn total_stake(&self) -> u64 {
        self.total_stake
    }

    pub fn node(&self, node_id: i64) -> Option<&ConsensusNode> {
        self.nodes
            .binary_search_by_key(&node_id, |node| node.node_id)
            .ok()
            .map(|idx| &self.nodes[idx])
    }

    pub fn node_by_account(&self, account: EntityId) -> Option<&ConsensusNode> {
        self.nodes
            .iter()
            .find(|node| node.node_account_id == account)
    }

    /// A successor snapshot with updated stakes. Nodes missing from `stakes`
    /// keep their current stake.
    pub fn with_stakes(
        &self,
        start_consensus_timestamp: ConsensusTimestamp,
        stakes: &HashMap<i64, u64>,
    ) -> Result<Self, AddressBookError> {
        let nodes = self
            .nodes
            .iter()
            .map(|node| ConsensusNode {
                stake: stakes.get(&node.node_id).copied().unwrap_or(node.stake),
                ..node.clone()
            })
            .collect();
        Self::new(self.file_id, start_consensus_timestamp, nodes)
    }

    /// Whether both snapshots hold the same nodes, ignoring start time.
    pub fn same_nodes(&self, other: &AddressBook) -> bool {
        self.nodes == other.nodes
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::domain::node::{KeyType, NodePublicKey};

    pub(crate) fn node(node_id: i64, stake: u64) -> ConsensusNode {
        ConsensusNode {
            node_id,
            node_account_id: EntityId::encode(0, 0, node_id + 3).unwrap(),
            public_key: NodePublicKey::new(KeyType::Ed25519, vec![node_id as u8; 32]).unwrap(),
            stake,
            endpoints: vec![],
            description: format!("node {node_id}"),
        }
    }

    pub(crate) fn book(start: ConsensusTimestamp, stakes: &[u64]) -> AddressBook {
        let nodes = stakes
            .iter()
            .enumerate()
            .map(|(i, stake)| node(i as i64, *stake))
            .collect();
        AddressBook::new(NODE_DETAILS_FILE_ID, start, nodes).unwrap()
    }

    #[test]
    fn test_empty_book_rejected() {
        assert_eq!(
            AddressBook::new(NODE_DETAILS_FILE_ID, 0, vec![]),
            Err(AddressBookError::Empty {
                file_id: NODE_DETAILS_FILE_ID
            })
        );
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let result = AddressBook::new(NODE_DETAILS_FILE_ID, 0, vec![node(1, 1), node(1, 2)]);
        assert_eq!(result, Err(AddressBookError::DuplicateNode { node_id: 1 }));
    }

    #[test]
    fn test_lookups_and_total_stake() {
        let nodes = vec![node(2, 30), node(0, 10), node(1, 20)];
        let book = AddressBook::new(NODE_DETAILS_FILE_ID, 5, nodes).unwrap();

        assert_eq!(book.total_stake(), 60);
        assert_eq!(
            book.nodes().iter().map(|n| n.node_id).collect::<Vec<_>>(),
            vec![0, 1, 2]
        );
        assert_eq!(book.node(1).unwrap().stake, 20);
        assert!(book.node(9).is_none());
        let account = EntityId::encode(0, 0, 5).unwrap();
        assert_eq!(book.node_by_account(account).unwrap().node_id, 2);
    }

    #[test]
    fn test_bytes_round_trip() {
        let original = book(0, &[1, 2, 3]);
        let decoded =
            AddressBook::from_bytes(NODE_DETAILS_FILE_ID, 0, &original.to_bytes()).unwrap();
        assert_eq!(decoded, original);
    }

    #[test]
    fn test_with_stakes() {
        let original = book(0, &[1, 2, 3]);
        let stakes = HashMap::from([(0, 10), (2, 30)]);
        let updated = original.with_stakes(100, &stakes).unwrap();

        assert_eq!(updated.start_consensus_timestamp(), 100);
        assert_eq!(updated.total_stake(), 42);
        assert_eq!(updated.node(1).unwrap().stake, 2);
        assert_eq!(original.total_stake(), 6);
    }

    #[test]
    fn test_address_book_files() {
        assert!(is_address_book_file(EntityId::encode(0, 0, 101).unwrap()));
        assert!(is_address_book_file(EntityId::encode(0, 0, 102).unwrap()));
        assert!(!is_address_book_file(EntityId::encode(0, 0, 111).unwrap()));
    }
}
