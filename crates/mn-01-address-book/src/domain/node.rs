//! Consensus node entities.

use crate::domain::errors::AddressBookError;
use crate::proto::{NodeAddress, NodeKeyType};
use mn_03_stream_files::proto::{AccountId, ServiceEndpoint};
use serde::{Deserialize, Serialize};
use shared_types::EntityId;
use std::fmt;

pub const ED25519_KEY_LEN: usize = 32;
pub const SECP256K1_COMPRESSED_KEY_LEN: usize = 33;
pub const SECP256K1_UNCOMPRESSED_KEY_LEN: usize = 65;

/// Signature algorithm a node signs stream files with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyType {
    Ed25519,
    EcdsaSecp256k1,
}

impl KeyType {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeyType::Ed25519 => "ed25519",
            KeyType::EcdsaSecp256k1 => "ecdsa_secp256k1",
        }
    }
}

impl fmt::Display for KeyType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<NodeKeyType> for KeyType {
    fn from(value: NodeKeyType) -> Self {
        match value {
            NodeKeyType::Ed25519 => KeyType::Ed25519,
            NodeKeyType::EcdsaSecp256k1 => KeyType::EcdsaSecp256k1,
        }
    }
}

impl From<KeyType> for NodeKeyType {
    fn from(value: KeyType) -> Self {
        match value {
            KeyType::Ed25519 => NodeKeyType::Ed25519,
            KeyType::EcdsaSecp256k1 => NodeKeyType::EcdsaSecp256k1,
        }
    }
}

/// Raw public key bytes with their algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodePublicKey {
    pub key_type: KeyType,
    pub bytes: Vec<u8>,
}

impl NodePublicKey {
    /// Checks the key length for its algorithm.
    pub fn new(key_type: KeyType, bytes: Vec<u8>) -> Result<Self, String> {
        let valid = match key_type {
            KeyType::Ed25519 => bytes.len() == ED25519_KEY_LEN,
            KeyType::EcdsaSecp256k1 => matches!(
                bytes.len(),
                SECP256K1_COMPRESSED_KEY_LEN | SECP256K1_UNCOMPRESSED_KEY_LEN
            ),
        };
        if !valid {
            return Err(format!("{} key of {} bytes", key_type, bytes.len()));
        }
        Ok(Self { key_type, bytes })
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.bytes)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

impl Endpoint {
    fn from_proto(endpoint: &ServiceEndpoint) -> Option<Self> {
        let host = match endpoint.ip_address_v4.as_slice() {
            [a, b, c, d] => format!("{a}.{b}.{c}.{d}"),
            _ if !endpoint.domain_name.is_empty() => endpoint.domain_name.clone(),
            _ => return None,
        };
        let port = u16::try_from(endpoint.port).ok()?;
        Some(Self { host, port })
    }

    fn to_proto(&self) -> ServiceEndpoint {
        let octets: Option<Vec<u8>> = self
            .host
            .split('.')
            .map(|part| part.parse::<u8>().ok())
            .collect();
        match octets {
            Some(octets) if octets.len() == 4 => ServiceEndpoint {
                ip_address_v4: octets,
                port: i32::from(self.port),
                domain_name: String::new(),
            },
            _ => ServiceEndpoint {
                ip_address_v4: Vec::new(),
                port: i32::from(self.port),
                domain_name: self.host.clone(),
            },
        }
    }
}

/// A consensus node eligible to sign stream files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsensusNode {
    pub node_id: i64,
    pub node_account_id: EntityId,
    pub public_key: NodePublicKey,
    /// Stake weight in tinybars.
    pub stake: u64,
    pub endpoints: Vec<Endpoint>,
    pub description: String,
}

impl ConsensusNode {
    pub fn from_proto(address: &NodeAddress) -> Result<Self, AddressBookError> {
        let node_id = address.node_id;
        let node_account_id = node_account(address)?;
        let key_bytes = hex::decode(address.public_key.trim()).map_err(|e| {
            AddressBookError::InvalidPublicKey {
                node_id,
                reason: e.to_string(),
            }
        })?;
        let key_type = NodeKeyType::try_from(address.key_type).map_err(|_| {
            AddressBookError::InvalidPublicKey {
                node_id,
                reason: format!("unknown key type {}", address.key_type),
            }
        })?;
        let public_key = NodePublicKey::new(key_type.into(), key_bytes)
            .map_err(|reason| AddressBookError::InvalidPublicKey { node_id, reason })?;

        Ok(Self {
            node_id,
            node_account_id,
            public_key,
            stake: u64::try_from(address.stake).unwrap_or(0),
            endpoints: address
                .service_endpoint
                .iter()
                .filter_map(Endpoint::from_proto)
                .collect(),
            description: address.description.clone(),
        })
    }

    pub fn to_proto(&self) -> NodeAddress {
        NodeAddress {
            memo: self.node_account_id.to_string().into_bytes(),
            public_key: self.public_key.to_hex(),
            node_id: self.node_id,
            node_account_id: Some(AccountId::from_entity_id(self.node_account_id)),
            service_endpoint: self.endpoints.iter().map(Endpoint::to_proto).collect(),
            description: self.description.clone(),
            stake: i64::try_from(self.stake).unwrap_or(i64::MAX),
            key_type: NodeKeyType::from(self.public_key.key_type) as i32,
            ..Default::default()
        }
    }
}

/// Account id field first, then the textual memo older books used.
fn node_account(address: &NodeAddress) -> Result<EntityId, AddressBookError> {
    if let Some(account) = address.node_account_id.as_ref() {
        if let Some(id) = account.to_entity_id()? {
            if !id.is_empty() {
                return Ok(id);
            }
        }
    }
    let memo = String::from_utf8_lossy(&address.memo);
    if memo.trim().is_empty() {
        return Err(AddressBookError::MissingNodeAccount {
            node_id: address.node_id,
        });
    }
    Ok(EntityId::parse(memo.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address() -> NodeAddress {
        NodeAddress {
            node_id: 0,
            node_account_id: Some(AccountId {
                account_num: 3,
                ..Default::default()
            }),
            public_key: hex::encode([7u8; 32]),
            stake: 100,
            service_endpoint: vec![ServiceEndpoint {
                ip_address_v4: vec![127, 0, 0, 1],
                port: 50211,
                domain_name: String::new(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_from_proto() {
        let node = ConsensusNode::from_proto(&address()).unwrap();
        assert_eq!(node.node_account_id, EntityId::encode(0, 0, 3).unwrap());
        assert_eq!(node.public_key.key_type, KeyType::Ed25519);
        assert_eq!(node.stake, 100);
        assert_eq!(
            node.endpoints,
            vec![Endpoint {
                host: "127.0.0.1".to_string(),
                port: 50211
            }]
        );
        assert_eq!(ConsensusNode::from_proto(&node.to_proto()).unwrap(), node);
    }

    #[test]
    fn test_memo_fallback() {
        let mut address = address();
        address.node_account_id = None;
        address.memo = b"0.0.7".to_vec();
        let node = ConsensusNode::from_proto(&address).unwrap();
        assert_eq!(node.node_account_id, EntityId::encode(0, 0, 7).unwrap());

        address.memo.clear();
        assert!(matches!(
            ConsensusNode::from_proto(&address),
            Err(AddressBookError::MissingNodeAccount { node_id: 0 })
        ));
    }

    #[test]
    fn test_invalid_keys() {
        let mut address = address();
        address.public_key = "zz".to_string();
        assert!(matches!(
            ConsensusNode::from_proto(&address),
            Err(AddressBookError::InvalidPublicKey { .. })
        ));

        address.public_key = hex::encode([1u8; 31]);
        assert!(ConsensusNode::from_proto(&address).is_err());

        address.public_key = hex::encode([2u8; 33]);
        address.key_type = NodeKeyType::EcdsaSecp256k1 as i32;
        assert!(ConsensusNode::from_proto(&address).is_ok());
    }

    #[test]
    fn test_negative_stake_is_zero() {
        let mut address = address();
        address.stake = -5;
        assert_eq!(ConsensusNode::from_proto(&address).unwrap().stake, 0);
    }
}
