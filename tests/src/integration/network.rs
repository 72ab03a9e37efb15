//! # Simulated Network
//!
//! Consensus nodes that publish signed record and balance files into an
//! in-memory bucket, plus builders for the transactions inside them.

use importer_runtime::{ImporterConfig, ImporterContainer};
use mn_01_address_book::{AddressBook, ConsensusNode, NODE_DETAILS_FILE_ID};
use mn_02_signature_verification::NodeSigner;
use mn_03_stream_files::proto::transaction_body::Data;
use mn_03_stream_files::proto::{
    AccountAmount, AccountId, CryptoTransferBody, FileUpdateBody, ShardRealmNum, Timestamp,
    TransactionBody, TransactionId, TransactionReceipt, TransactionRecord, TransferList,
};
use mn_03_stream_files::{
    BalanceFileWriter, InMemoryStreamFileProvider, RecordFileReader, RecordFileWriter,
    ResponseCode, StreamFileData, StreamFileReader,
};
use mn_06_persistence::KeyValueStore;
use shared_types::{EntityId, Sha384Hash, StreamFilename, StreamType};
use std::sync::Arc;

pub const SECOND: i64 = 1_000_000_000;

/// Fee collector credited by every transfer.
pub const FEE_COLLECTOR: i64 = 98;

pub fn id(num: i64) -> EntityId {
    EntityId::encode(0, 0, num).unwrap()
}

/// Node `i` runs as account `0.0.(i + 3)`.
pub fn node_account(node_id: usize) -> EntityId {
    id(node_id as i64 + 3)
}

fn account_id(num: i64) -> AccountId {
    AccountId {
        account_num: num,
        ..Default::default()
    }
}

fn timestamp(seconds: i64) -> Timestamp {
    Timestamp { seconds, nanos: 0 }
}

// =============================================================================
// TRANSACTIONS
// =============================================================================

pub type Transaction = (TransactionBody, TransactionRecord);

fn body(seconds: i64, payer: i64, data: Data) -> TransactionBody {
    TransactionBody {
        transaction_id: Some(TransactionId {
            transaction_valid_start: Some(timestamp(seconds - 1)),
            account_id: Some(account_id(payer)),
            ..Default::default()
        }),
        node_account_id: Some(account_id(3)),
        transaction_fee: 100,
        data: Some(data),
        ..Default::default()
    }
}

fn record(seconds: i64, transfers: Vec<(i64, i64)>) -> TransactionRecord {
    TransactionRecord {
        receipt: Some(TransactionReceipt {
            status: ResponseCode::SUCCESS.code(),
            ..Default::default()
        }),
        consensus_timestamp: Some(timestamp(seconds)),
        transaction_fee: 10,
        transfer_list: Some(TransferList {
            account_amounts: transfers
                .into_iter()
                .map(|(account, amount)| AccountAmount {
                    account_id: Some(account_id(account)),
                    amount,
                    is_approval: false,
                })
                .collect(),
        }),
        ..Default::default()
    }
}

/// `payer` sends `amount` to `receiver` and pays a fee of 10.
pub fn transfer(seconds: i64, payer: i64, receiver: i64, amount: i64) -> Transaction {
    (
        body(
            seconds,
            payer,
            Data::CryptoTransfer(CryptoTransferBody::default()),
        ),
        record(
            seconds,
            vec![(payer, -amount - 10), (receiver, amount), (FEE_COLLECTOR, 10)],
        ),
    )
}

/// Replaces the node details file with `book`.
pub fn address_book_update(seconds: i64, book: &AddressBook) -> Transaction {
    (
        body(
            seconds,
            2,
            Data::FileUpdate(FileUpdateBody {
                file_id: Some(ShardRealmNum {
                    num: NODE_DETAILS_FILE_ID.num(),
                    ..Default::default()
                }),
                contents: book.to_bytes(),
                ..Default::default()
            }),
        ),
        record(seconds, vec![(2, -10), (FEE_COLLECTOR, 10)]),
    )
}

// =============================================================================
// FILES
// =============================================================================

pub struct TestFile {
    pub name: StreamFilename,
    pub bytes: Vec<u8>,
    pub file_hash: Sha384Hash,
    pub metadata_hash: Sha384Hash,
    /// End running hash, the next record file's previous hash.
    pub end_hash: Sha384Hash,
}

/// A record file named after its first transaction.
pub fn record_file(previous: Sha384Hash, transactions: &[Transaction]) -> TestFile {
    let first = transactions
        .first()
        .and_then(|(_, record)| record.consensus_timestamp.as_ref())
        .map_or(0, |ts| ts.seconds);
    let writer = transactions
        .iter()
        .fold(RecordFileWriter::new(previous).block_number(first), |writer, (body, record)| {
            writer.item(body, record)
        });
    let end_hash = writer.end_running_hash();
    let name = StreamFilename::data(StreamType::Record, first * SECOND);
    let bytes = writer.build();

    let data = StreamFileData::new(name.clone(), bytes.clone()).unwrap();
    let file = RecordFileReader.read(&data).unwrap();
    TestFile {
        name,
        file_hash: data.hash(),
        metadata_hash: file.metadata_hash,
        end_hash,
        bytes,
    }
}

/// A balance snapshot of `(account, balance)` pairs.
pub fn balance_file(seconds: i64, balances: &[(i64, u64)]) -> TestFile {
    let writer = balances
        .iter()
        .fold(BalanceFileWriter::new(seconds * SECOND), |writer, (account, balance)| {
            writer.account(id(*account), *balance, &[])
        });
    let name = StreamFilename::data(StreamType::Balance, seconds * SECOND);
    let bytes = writer.build();
    let data = StreamFileData::new(name.clone(), bytes.clone()).unwrap();
    TestFile {
        name,
        file_hash: data.hash(),
        metadata_hash: Sha384Hash::ZERO,
        end_hash: Sha384Hash::ZERO,
        bytes,
    }
}

// =============================================================================
// NETWORK
// =============================================================================

pub struct Network {
    signers: Vec<NodeSigner>,
    book: AddressBook,
    provider: Arc<InMemoryStreamFileProvider>,
}

impl Network {
    /// Nodes with Ed25519 keys seeded `1..=stakes.len()`.
    pub fn new(stakes: &[u64]) -> Self {
        let seeds: Vec<u8> = (1..=stakes.len() as u8).collect();
        Self::with_keys(&seeds, stakes, Arc::new(InMemoryStreamFileProvider::new()))
    }

    fn with_keys(seeds: &[u8], stakes: &[u64], provider: Arc<InMemoryStreamFileProvider>) -> Self {
        let signers: Vec<_> = seeds.iter().map(|seed| NodeSigner::ed25519([*seed; 32])).collect();
        let nodes = signers
            .iter()
            .zip(stakes)
            .enumerate()
            .map(|(i, (signer, stake))| ConsensusNode {
                node_id: i as i64,
                node_account_id: node_account(i),
                public_key: signer.public_key(),
                stake: *stake,
                endpoints: vec![],
                description: format!("node {i}"),
            })
            .collect();
        Self {
            signers,
            book: AddressBook::new(NODE_DETAILS_FILE_ID, 0, nodes).unwrap(),
            provider,
        }
    }

    /// The same bucket served by nodes with new keys, as after an address
    /// book update.
    pub fn rotate(&self, seeds: &[u8], stakes: &[u64]) -> Self {
        Self::with_keys(seeds, stakes, self.provider.clone())
    }

    pub fn book(&self) -> &AddressBook {
        &self.book
    }

    pub fn provider(&self) -> &Arc<InMemoryStreamFileProvider> {
        &self.provider
    }

    /// Node `i` serves the body and its signature of `file`.
    pub fn publish(&self, file: &TestFile, nodes: &[usize]) {
        for &i in nodes {
            let node = node_account(i);
            self.provider.put(node, file.name.clone(), file.bytes.clone());
            self.provider.put(
                node,
                file.name.to_signature(),
                self.signers[i].sign_file(&file.file_hash, &file.metadata_hash),
            );
        }
    }

    pub fn publish_all(&self, file: &TestFile) {
        let nodes: Vec<_> = (0..self.signers.len()).collect();
        self.publish(file, &nodes);
    }

    /// The importer over `store`, bootstrapped with this network's book.
    pub fn importer(&self, config: ImporterConfig, store: Arc<dyn KeyValueStore>) -> ImporterContainer {
        ImporterContainer::build(config, store, self.provider.clone(), self.book.clone()).unwrap()
    }
}
