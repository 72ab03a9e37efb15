//! Signature file encoding.
//!
//! A signature file is one version byte followed by a serialized
//! [`SignatureFile`].

use mn_03_stream_files::proto::HashObject;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum SignatureType {
    Unknown = 0,
    Ed25519 = 1,
    EcdsaSecp256k1 = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignatureObject {
    #[prost(enumeration = "SignatureType", tag = "1")]
    pub r#type: i32,
    #[prost(int32, tag = "2")]
    pub length: i32,
    /// `101 - length`.
    #[prost(int32, tag = "3")]
    pub checksum: i32,
    #[prost(bytes = "vec", tag = "4")]
    pub signature: Vec<u8>,
    #[prost(message, optional, tag = "5")]
    pub hash_object: Option<HashObject>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SignatureFile {
    #[prost(message, optional, tag = "1")]
    pub file_signature: Option<SignatureObject>,
    #[prost(message, optional, tag = "2")]
    pub metadata_signature: Option<SignatureObject>,
}
