//! # SHA-384 Digests
//!
//! Stream files, running hashes and signature hash objects all use SHA-384.

use crate::errors::HashError;
use serde::{Deserialize, Serialize};
use serde_with::{serde_as, Bytes};
use sha2::{Digest, Sha384};
use std::fmt;

pub const SHA384_LEN: usize = 48;

/// A 48-byte SHA-384 digest.
#[serde_as]
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Sha384Hash(#[serde_as(as = "Bytes")] pub [u8; SHA384_LEN]);

impl Sha384Hash {
    /// All-zero sentinel used where no previous hash exists.
    pub const ZERO: Sha384Hash = Sha384Hash([0u8; SHA384_LEN]);

    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|b| *b == 0)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn from_slice(bytes: &[u8]) -> Result<Self, HashError> {
        let array: [u8; SHA384_LEN] =
            bytes.try_into().map_err(|_| HashError::InvalidLength {
                expected: SHA384_LEN,
                actual: bytes.len(),
            })?;
        Ok(Self(array))
    }

    pub fn from_hex(s: &str) -> Result<Self, HashError> {
        let bytes = hex::decode(s).map_err(|e| HashError::InvalidHex(e.to_string()))?;
        Self::from_slice(&bytes)
    }

    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl Default for Sha384Hash {
    fn default() -> Self {
        Self::ZERO
    }
}

impl fmt::Debug for Sha384Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Sha384Hash({})", &self.to_hex()[..12])
    }
}

impl fmt::Display for Sha384Hash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Digest of the concatenation of `parts`.
pub fn sha384(parts: &[&[u8]]) -> Sha384Hash {
    let mut hasher = Sha384::new();
    for part in parts {
        hasher.update(part);
    }
    Sha384Hash(hasher.finalize().into())
}
