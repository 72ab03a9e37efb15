//! # Inbound Ports (Driving Ports / API)

use crate::domain::entities::{NodeSignature, QuorumResult};
use crate::domain::errors::SignatureError;
use mn_01_address_book::AddressBook;
use mn_03_stream_files::StreamFileData;

/// Signature handling for one download round.
///
/// Implementations must be thread-safe (`Send + Sync`).
pub trait SignatureVerificationApi: Send + Sync {
    /// Parses a signature file downloaded from `node_id`.
    fn read_signature(
        &self,
        data: &StreamFileData,
        node_id: i64,
    ) -> Result<NodeSignature, SignatureError>;

    /// Checks one signature against its node's key in `book`, recording the
    /// outcome in the signature status.
    fn verify_signature(
        &self,
        signature: &mut NodeSignature,
        book: &AddressBook,
    ) -> Result<(), SignatureError>;

    /// Decides quorum among already verified signatures.
    fn reach_quorum(
        &self,
        signatures: &mut [NodeSignature],
        book: &AddressBook,
    ) -> Result<QuorumResult, SignatureError>;

    /// Whether further votes can no longer change the outcome once some
    /// hash has qualified.
    fn is_final(&self) -> bool;

    /// Verifies every signature against `book`, then decides quorum.
    ///
    /// Each signature ends `NotVerified`, `Verified` or `Consensus`. A node
    /// whose signature fails only loses its own vote.
    ///
    /// ## Errors
    ///
    /// - `NoSignatures`: nothing verified
    /// - `NoQuorum` / `Tie`: no single hash reached the threshold
    fn verify(
        &self,
        signatures: &mut [NodeSignature],
        book: &AddressBook,
    ) -> Result<QuorumResult, SignatureError>;
}
