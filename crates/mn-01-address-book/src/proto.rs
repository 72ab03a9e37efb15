//! Address book file encoding.
//!
//! Files `0.0.101` and `0.0.102` hold a serialized [`NodeAddressBook`].

use mn_03_stream_files::proto::{AccountId, ServiceEndpoint};

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeAddressBook {
    #[prost(message, repeated, tag = "1")]
    pub node_address: Vec<NodeAddress>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum NodeKeyType {
    Ed25519 = 0,
    EcdsaSecp256k1 = 1,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct NodeAddress {
    #[prost(bytes = "vec", tag = "1")]
    pub ip_address: Vec<u8>,
    #[prost(int32, tag = "2")]
    pub portno: i32,
    /// Node account id as `shard.realm.num` text; older books only.
    #[prost(bytes = "vec", tag = "3")]
    pub memo: Vec<u8>,
    /// Hex-encoded public key.
    #[prost(string, tag = "4")]
    pub public_key: String,
    #[prost(int64, tag = "5")]
    pub node_id: i64,
    #[prost(message, optional, tag = "6")]
    pub node_account_id: Option<AccountId>,
    #[prost(bytes = "vec", tag = "7")]
    pub node_cert_hash: Vec<u8>,
    #[prost(message, repeated, tag = "8")]
    pub service_endpoint: Vec<ServiceEndpoint>,
    #[prost(string, tag = "9")]
    pub description: String,
    #[prost(int64, tag = "10")]
    pub stake: i64,
    #[prost(enumeration = "NodeKeyType", tag = "11")]
    pub key_type: i32,
}
