//! # Node Signature Verification
//!
//! Nodes sign the raw 48-byte hashes. Ed25519 signatures are checked with
//! `verify_strict`; secp256k1 signatures may be fixed-width or DER and are
//! checked over SHA-256 of the hash.

use crate::domain::entities::{NodeSignature, SignatureStatus};
use crate::domain::errors::SignatureError;
use mn_01_address_book::{ConsensusNode, KeyType, NodePublicKey};

/// Verifies one message signature against a node key.
pub fn verify_signature(
    node_id: i64,
    key: &NodePublicKey,
    message: &[u8],
    signature: &[u8],
    kind: &'static str,
) -> Result<(), SignatureError> {
    let invalid_key = |reason: String| SignatureError::InvalidPublicKey { node_id, reason };
    let failed = || SignatureError::VerificationFailed { node_id, kind };

    match key.key_type {
        KeyType::Ed25519 => {
            let bytes: [u8; 32] = key
                .bytes
                .as_slice()
                .try_into()
                .map_err(|_| invalid_key(format!("{} bytes", key.bytes.len())))?;
            let verifying_key = ed25519_dalek::VerifyingKey::from_bytes(&bytes)
                .map_err(|e| invalid_key(e.to_string()))?;
            let signature =
                ed25519_dalek::Signature::from_slice(signature).map_err(|_| failed())?;
            verifying_key
                .verify_strict(message, &signature)
                .map_err(|_| failed())
        }
        KeyType::EcdsaSecp256k1 => {
            use k256::ecdsa::signature::Verifier;

            let verifying_key = k256::ecdsa::VerifyingKey::from_sec1_bytes(&key.bytes)
                .map_err(|e| invalid_key(e.to_string()))?;
            let signature = k256::ecdsa::Signature::from_slice(signature)
                .or_else(|_| k256::ecdsa::Signature::from_der(signature))
                .map_err(|_| failed())?;
            verifying_key
                .verify(message, &signature)
                .map_err(|_| failed())
        }
    }
}

/// Checks both signatures of `signature` against `node` and records the
/// outcome in its status.
pub fn verify_node_signature(
    signature: &mut NodeSignature,
    node: &ConsensusNode,
) -> Result<(), SignatureError> {
    let result = check(signature, node);
    signature.status = if result.is_ok() {
        SignatureStatus::Verified
    } else {
        SignatureStatus::NotVerified
    };
    result
}

fn check(signature: &NodeSignature, node: &ConsensusNode) -> Result<(), SignatureError> {
    if signature.signature_type != node.public_key.key_type {
        return Err(SignatureError::KeyTypeMismatch {
            node_id: node.node_id,
            declared: signature.signature_type.to_string(),
            expected: node.public_key.key_type.to_string(),
        });
    }
    verify_signature(
        node.node_id,
        &node.public_key,
        signature.file_hash.as_bytes(),
        &signature.file_hash_signature,
        "file",
    )?;
    verify_signature(
        node.node_id,
        &node.public_key,
        signature.metadata_hash.as_bytes(),
        &signature.metadata_hash_signature,
        "metadata",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signer::NodeSigner;
    use shared_types::{sha384, StreamFilename};

    fn node(signer: &NodeSigner) -> ConsensusNode {
        ConsensusNode {
            node_id: 0,
            node_account_id: shared_types::EntityId::from_raw(3),
            public_key: signer.public_key(),
            stake: 1,
            endpoints: vec![],
            description: String::new(),
        }
    }

    fn signed(signer: &NodeSigner) -> NodeSignature {
        let file_hash = sha384(&[b"file"]);
        let metadata_hash = sha384(&[b"meta"]);
        NodeSignature {
            filename: StreamFilename::parse("2024-03-01T12_00_02.000000123Z.rcd_sig").unwrap(),
            node_id: 0,
            signature_type: signer.key_type(),
            file_hash,
            file_hash_signature: signer.sign(file_hash.as_bytes()),
            metadata_hash,
            metadata_hash_signature: signer.sign(metadata_hash.as_bytes()),
            status: SignatureStatus::Downloaded,
        }
    }

    #[test]
    fn test_both_algorithms_verify() {
        for signer in [NodeSigner::ed25519([7; 32]), NodeSigner::secp256k1([9; 32]).unwrap()] {
            let mut signature = signed(&signer);
            assert!(verify_node_signature(&mut signature, &node(&signer)).is_ok());
            assert_eq!(signature.status, SignatureStatus::Verified);
        }
    }

    #[test]
    fn test_wrong_key_not_verified() {
        let signer = NodeSigner::ed25519([7; 32]);
        let other = NodeSigner::ed25519([8; 32]);
        let mut signature = signed(&signer);

        assert_eq!(
            verify_node_signature(&mut signature, &node(&other)),
            Err(SignatureError::VerificationFailed {
                node_id: 0,
                kind: "file"
            })
        );
        assert_eq!(signature.status, SignatureStatus::NotVerified);
    }

    #[test]
    fn test_tampered_metadata_signature() {
        let signer = NodeSigner::secp256k1([9; 32]).unwrap();
        let mut signature = signed(&signer);
        signature.metadata_hash = sha384(&[b"other"]);

        assert_eq!(
            verify_node_signature(&mut signature, &node(&signer)),
            Err(SignatureError::VerificationFailed {
                node_id: 0,
                kind: "metadata"
            })
        );
    }

    #[test]
    fn test_key_type_mismatch() {
        let signer = NodeSigner::ed25519([7; 32]);
        let mut signature = signed(&signer);
        signature.signature_type = KeyType::EcdsaSecp256k1;

        assert!(matches!(
            verify_node_signature(&mut signature, &node(&signer)),
            Err(SignatureError::KeyTypeMismatch { .. })
        ));
    }
}
