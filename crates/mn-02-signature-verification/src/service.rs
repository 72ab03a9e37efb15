//! # Signature Verification Service
//!
//! Implements [`SignatureVerificationApi`]. Signatures of one round are
//! checked in parallel, then weighed by [`reach_quorum`].

use crate::domain::entities::{NodeSignature, QuorumConfig, QuorumResult, SignatureStatus};
use crate::domain::errors::SignatureError;
use crate::domain::quorum::reach_quorum;
use crate::domain::reader::SignatureFileReader;
use crate::domain::verify::verify_node_signature;
use crate::ports::inbound::SignatureVerificationApi;
use mirror_telemetry::metrics;
use mn_01_address_book::AddressBook;
use mn_03_stream_files::StreamFileData;
use rayon::prelude::*;
use tracing::{debug, warn};

pub struct SignatureVerificationService {
    config: QuorumConfig,
    reader: SignatureFileReader,
}

impl SignatureVerificationService {
    pub fn new(config: QuorumConfig) -> Self {
        Self {
            config,
            reader: SignatureFileReader,
        }
    }

    pub fn config(&self) -> &QuorumConfig {
        &self.config
    }
}

impl Default for SignatureVerificationService {
    fn default() -> Self {
        Self::new(QuorumConfig::default())
    }
}

impl SignatureVerificationApi for SignatureVerificationService {
    fn read_signature(
        &self,
        data: &StreamFileData,
        node_id: i64,
    ) -> Result<NodeSignature, SignatureError> {
        self.reader.read(data, node_id)
    }

    fn verify_signature(
        &self,
        signature: &mut NodeSignature,
        book: &AddressBook,
    ) -> Result<(), SignatureError> {
        let result = match book.node(signature.node_id) {
            Some(node) => verify_node_signature(signature, node),
            None => {
                signature.status = SignatureStatus::NotVerified;
                Err(SignatureError::UnknownNode {
                    node_id: signature.node_id,
                })
            }
        };
        metrics::record_signature(signature.signature_type.as_str(), result.is_ok());
        match &result {
            Ok(()) => debug!(
                node_id = signature.node_id,
                filename = %signature.filename,
                "Signature verified"
            ),
            Err(e) => warn!(
                node_id = signature.node_id,
                filename = %signature.filename,
                error = %e,
                "Discarding signature"
            ),
        }
        result
    }

    fn reach_quorum(
        &self,
        signatures: &mut [NodeSignature],
        book: &AddressBook,
    ) -> Result<QuorumResult, SignatureError> {
        reach_quorum(signatures, book, &self.config)
    }

    fn is_final(&self) -> bool {
        self.config.threshold.is_majority_or_more()
    }

    fn verify(
        &self,
        signatures: &mut [NodeSignature],
        book: &AddressBook,
    ) -> Result<QuorumResult, SignatureError> {
        signatures.par_iter_mut().for_each(|signature| {
            let _ = self.verify_signature(signature, book);
        });
        reach_quorum(signatures, book, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::signer::NodeSigner;
    use mn_01_address_book::{ConsensusNode, NODE_DETAILS_FILE_ID};
    use shared_types::{sha384, EntityId, StreamFilename};

    fn signers() -> Vec<NodeSigner> {
        vec![
            NodeSigner::ed25519([1; 32]),
            NodeSigner::secp256k1([2; 32]).unwrap(),
            NodeSigner::ed25519([3; 32]),
        ]
    }

    fn book(signers: &[NodeSigner]) -> AddressBook {
        let nodes = signers
            .iter()
            .enumerate()
            .map(|(i, signer)| ConsensusNode {
                node_id: i as i64,
                node_account_id: EntityId::from_raw(3 + i as u64),
                public_key: signer.public_key(),
                stake: 10,
                endpoints: vec![],
                description: String::new(),
            })
            .collect();
        AddressBook::new(NODE_DETAILS_FILE_ID, 0, nodes).unwrap()
    }

    fn read(service: &SignatureVerificationService, bytes: Vec<u8>, node_id: i64) -> NodeSignature {
        let name = StreamFilename::parse("2024-03-01T12_00_02.000000123Z.rcd_sig").unwrap();
        let data = StreamFileData::new(name, bytes).unwrap();
        service.read_signature(&data, node_id).unwrap()
    }

    #[test]
    fn test_round_with_one_forged_signature() {
        let service = SignatureVerificationService::default();
        let signers = signers();
        let book = book(&signers);
        let file_hash = sha384(&[b"body"]);
        let metadata_hash = sha384(&[b"metadata"]);

        let mut signatures: Vec<NodeSignature> = signers
            .iter()
            .enumerate()
            .map(|(i, signer)| read(&service, signer.sign_file(&file_hash, &metadata_hash), i as i64))
            .collect();
        // Node 2's file is signed with node 0's key.
        signatures[2] = read(&service, signers[0].sign_file(&file_hash, &metadata_hash), 2);

        let result = service.verify(&mut signatures, &book).unwrap();
        assert_eq!(result.file_hash, file_hash);
        assert_eq!(result.nodes, vec![0, 1]);
        assert_eq!(signatures[0].status, SignatureStatus::Consensus);
        assert_eq!(signatures[1].status, SignatureStatus::Consensus);
        assert_eq!(signatures[2].status, SignatureStatus::NotVerified);
    }

    #[test]
    fn test_unknown_node_discarded() {
        let service = SignatureVerificationService::default();
        let signers = signers();
        let book = book(&signers[..1]);
        let hash = sha384(&[b"body"]);
        let mut signatures = vec![read(&service, signers[0].sign_file(&hash, &hash), 7)];

        assert_eq!(
            service.verify(&mut signatures, &book),
            Err(SignatureError::NoSignatures)
        );
        assert_eq!(signatures[0].status, SignatureStatus::NotVerified);
    }
}
