//! # Signature File Reader
//!
//! ```text
//! [version: u8 = 6][SignatureFile protobuf]
//! ```
//!
//! The version byte is checked before any protobuf decoding. Both the file
//! and the metadata signature objects are required.

use crate::domain::entities::{NodeSignature, SignatureStatus};
use crate::domain::errors::SignatureError;
use crate::proto::{SignatureFile, SignatureObject, SignatureType};
use mn_01_address_book::KeyType;
use mn_03_stream_files::proto::{HashAlgorithm, HashObject};
use mn_03_stream_files::StreamFileData;
use prost::Message;
use shared_types::Sha384Hash;

pub const SIGNATURE_FILE_VERSION: u8 = 6;

/// Sum of `length` and `checksum` in every signature object.
const CHECKSUM_BASE: i32 = 101;

#[derive(Debug, Clone, Copy, Default)]
pub struct SignatureFileReader;

impl SignatureFileReader {
    pub fn read(
        &self,
        data: &StreamFileData,
        node_id: i64,
    ) -> Result<NodeSignature, SignatureError> {
        let filename = data.name();
        let malformed = |reason: String| SignatureError::Malformed {
            filename: filename.clone(),
            reason,
        };

        let (version, body) = data
            .bytes()
            .split_first()
            .ok_or_else(|| malformed("empty file".to_string()))?;
        if *version != SIGNATURE_FILE_VERSION {
            return Err(SignatureError::UnsupportedVersion {
                filename: filename.clone(),
                version: *version,
            });
        }

        let file = SignatureFile::decode(body).map_err(|e| malformed(e.to_string()))?;
        let file_signature = file
            .file_signature
            .ok_or_else(|| SignatureError::MissingSignature {
                filename: filename.clone(),
                kind: "file",
            })?;
        let metadata_signature =
            file.metadata_signature
                .ok_or_else(|| SignatureError::MissingSignature {
                    filename: filename.clone(),
                    kind: "metadata",
                })?;

        let declared = signature_type(&file_signature).map_err(&malformed)?;
        if declared != signature_type(&metadata_signature).map_err(&malformed)? {
            return Err(malformed("signature types differ".to_string()));
        }
        let (file_hash, file_hash_signature) =
            signed_hash(file_signature).map_err(&malformed)?;
        let (metadata_hash, metadata_hash_signature) =
            signed_hash(metadata_signature).map_err(&malformed)?;

        Ok(NodeSignature {
            filename: data.filename().clone(),
            node_id,
            signature_type: declared,
            file_hash,
            file_hash_signature,
            metadata_hash,
            metadata_hash_signature,
            status: SignatureStatus::Downloaded,
        })
    }
}

fn signature_type(object: &SignatureObject) -> Result<KeyType, String> {
    match SignatureType::try_from(object.r#type) {
        Ok(SignatureType::Ed25519) => Ok(KeyType::Ed25519),
        Ok(SignatureType::EcdsaSecp256k1) => Ok(KeyType::EcdsaSecp256k1),
        _ => Err(format!("unknown signature type {}", object.r#type)),
    }
}

fn signed_hash(object: SignatureObject) -> Result<(Sha384Hash, Vec<u8>), String> {
    if object.signature.is_empty() {
        return Err("empty signature".to_string());
    }
    if usize::try_from(object.length).ok() != Some(object.signature.len())
        || object.checksum != CHECKSUM_BASE - object.length
    {
        return Err(format!(
            "signature length {} checksum {} for {} bytes",
            object.length,
            object.checksum,
            object.signature.len()
        ));
    }
    let hash_object = object
        .hash_object
        .ok_or_else(|| "missing hash object".to_string())?;
    if hash_object.algorithm != HashAlgorithm::Sha384 as i32 {
        return Err(format!("unsupported hash algorithm {}", hash_object.algorithm));
    }
    let hash = Sha384Hash::from_slice(&hash_object.hash).map_err(|e| e.to_string())?;
    Ok((hash, object.signature))
}

// =============================================================================
// WRITER
// =============================================================================

/// Produces signature files in the layout [`SignatureFileReader`] accepts.
pub fn write_signature_file(
    signature_type: KeyType,
    file_hash: &Sha384Hash,
    file_hash_signature: &[u8],
    metadata_hash: &Sha384Hash,
    metadata_hash_signature: &[u8],
) -> Vec<u8> {
    let object = |hash: &Sha384Hash, signature: &[u8]| {
        let length = signature.len() as i32;
        SignatureObject {
            r#type: match signature_type {
                KeyType::Ed25519 => SignatureType::Ed25519,
                KeyType::EcdsaSecp256k1 => SignatureType::EcdsaSecp256k1,
            } as i32,
            length,
            checksum: CHECKSUM_BASE - length,
            signature: signature.to_vec(),
            hash_object: Some(HashObject::sha384(hash.as_bytes())),
        }
    };
    let file = SignatureFile {
        file_signature: Some(object(file_hash, file_hash_signature)),
        metadata_signature: Some(object(metadata_hash, metadata_hash_signature)),
    };
    let mut bytes = vec![SIGNATURE_FILE_VERSION];
    bytes.extend(file.encode_to_vec());
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_types::{sha384, StreamFilename};

    fn data(bytes: Vec<u8>) -> StreamFileData {
        let name = StreamFilename::parse("2024-03-01T12_00_02.000000123Z.rcd_sig").unwrap();
        StreamFileData::new(name, bytes).unwrap()
    }

    fn valid() -> Vec<u8> {
        write_signature_file(
            KeyType::Ed25519,
            &sha384(&[b"file"]),
            &[1; 64],
            &sha384(&[b"meta"]),
            &[2; 64],
        )
    }

    #[test]
    fn test_read_valid() {
        let signature = SignatureFileReader.read(&data(valid()), 3).unwrap();
        assert_eq!(signature.node_id, 3);
        assert_eq!(signature.signature_type, KeyType::Ed25519);
        assert_eq!(signature.file_hash, sha384(&[b"file"]));
        assert_eq!(signature.metadata_hash, sha384(&[b"meta"]));
        assert_eq!(signature.file_hash_signature, vec![1; 64]);
        assert_eq!(signature.status, SignatureStatus::Downloaded);
    }

    #[test]
    fn test_version_checked_first() {
        let mut bytes = valid();
        bytes[0] = 5;
        assert!(matches!(
            SignatureFileReader.read(&data(bytes), 0),
            Err(SignatureError::UnsupportedVersion { version: 5, .. })
        ));

        // Garbage after a wrong version byte still reports the version.
        assert!(matches!(
            SignatureFileReader.read(&data(vec![4, 0xff, 0xff]), 0),
            Err(SignatureError::UnsupportedVersion { version: 4, .. })
        ));
        assert!(matches!(
            SignatureFileReader.read(&data(vec![]), 0),
            Err(SignatureError::Malformed { .. })
        ));
    }

    #[test]
    fn test_missing_metadata_signature() {
        let mut file = SignatureFile::decode(&valid()[1..]).unwrap();
        file.metadata_signature = None;
        let mut bytes = vec![SIGNATURE_FILE_VERSION];
        bytes.extend(file.encode_to_vec());

        assert!(matches!(
            SignatureFileReader.read(&data(bytes), 0),
            Err(SignatureError::MissingSignature {
                kind: "metadata",
                ..
            })
        ));
    }

    #[test]
    fn test_bad_checksum_and_hash() {
        let mut file = SignatureFile::decode(&valid()[1..]).unwrap();
        if let Some(object) = file.file_signature.as_mut() {
            object.checksum += 1;
        }
        let mut bytes = vec![SIGNATURE_FILE_VERSION];
        bytes.extend(file.encode_to_vec());
        assert!(matches!(
            SignatureFileReader.read(&data(bytes), 0),
            Err(SignatureError::Malformed { .. })
        ));

        let mut file = SignatureFile::decode(&valid()[1..]).unwrap();
        if let Some(object) = file.file_signature.as_mut() {
            object.hash_object = Some(HashObject::sha384(&[0; 20]));
        }
        let mut bytes = vec![SIGNATURE_FILE_VERSION];
        bytes.extend(file.encode_to_vec());
        assert!(matches!(
            SignatureFileReader.read(&data(bytes), 0),
            Err(SignatureError::Malformed { .. })
        ));
    }
}
