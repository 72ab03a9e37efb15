//! Stream file signing, the counterpart of verification.
//!
//! Used to publish signature files from local tooling and tests.

use crate::domain::reader::write_signature_file;
use mn_01_address_book::{KeyType, NodePublicKey};
use shared_types::Sha384Hash;

pub enum NodeSigner {
    Ed25519(ed25519_dalek::SigningKey),
    Secp256k1(k256::ecdsa::SigningKey),
}

impl NodeSigner {
    pub fn ed25519(secret: [u8; 32]) -> Self {
        NodeSigner::Ed25519(ed25519_dalek::SigningKey::from_bytes(&secret))
    }

    /// Fails when `secret` is zero or not below the curve order.
    pub fn secp256k1(secret: [u8; 32]) -> Option<Self> {
        k256::ecdsa::SigningKey::from_slice(&secret)
            .ok()
            .map(NodeSigner::Secp256k1)
    }

    pub fn key_type(&self) -> KeyType {
        match self {
            NodeSigner::Ed25519(_) => KeyType::Ed25519,
            NodeSigner::Secp256k1(_) => KeyType::EcdsaSecp256k1,
        }
    }

    pub fn public_key(&self) -> NodePublicKey {
        let bytes = match self {
            NodeSigner::Ed25519(key) => key.verifying_key().to_bytes().to_vec(),
            NodeSigner::Secp256k1(key) => key
                .verifying_key()
                .to_encoded_point(true)
                .as_bytes()
                .to_vec(),
        };
        NodePublicKey {
            key_type: self.key_type(),
            bytes,
        }
    }

    pub fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            NodeSigner::Ed25519(key) => {
                use ed25519_dalek::Signer;
                key.sign(message).to_bytes().to_vec()
            }
            NodeSigner::Secp256k1(key) => {
                use k256::ecdsa::signature::Signer;
                let signature: k256::ecdsa::Signature = key.sign(message);
                signature.to_bytes().to_vec()
            }
        }
    }

    /// A complete signature file over both hashes.
    pub fn sign_file(&self, file_hash: &Sha384Hash, metadata_hash: &Sha384Hash) -> Vec<u8> {
        write_signature_file(
            self.key_type(),
            file_hash,
            &self.sign(file_hash.as_bytes()),
            metadata_hash,
            &self.sign(metadata_hash.as_bytes()),
        )
    }
}
