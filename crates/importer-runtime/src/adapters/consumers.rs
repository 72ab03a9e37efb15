//! # Stream File Consumers
//!
//! Bridge verified stream files into the parser and the persistence layer.
//!
//! ```text
//! Downloader ──consume()──→ parse ──→ commit (one batch) ──→ publish stage
//!                                                              │
//!                                                AddressBookUpdated
//! ```
//!
//! Parsing and the store write run on the blocking pool. Staged address
//! book snapshots become visible to the downloader only after the commit
//! that persisted them.

use async_trait::async_trait;
use mn_01_address_book::{AddressBookApi, AddressBookStage};
use mn_03_stream_files::{AccountBalanceFile, RecordFile, StreamFile};
use mn_04_downloader::{DownloaderError, StreamCursor, StreamFileConsumer};
use mn_05_record_parser::RecordParserApi;
use mn_06_persistence::{CommitSummary, PersistenceApi};
use shared_bus::{EventPublisher, MirrorEvent};
use shared_types::{StreamFilename, StreamType};
use std::fmt::Display;
use std::sync::Arc;
use tracing::{debug, info};

/// Collaborators shared by both consumers.
#[derive(Clone)]
pub struct ConsumerPorts {
    pub parser: Arc<dyn RecordParserApi>,
    pub persistence: Arc<dyn PersistenceApi>,
    pub address_book: Arc<dyn AddressBookApi>,
    pub bus: Arc<dyn EventPublisher>,
}

fn consumer_error(e: impl Display) -> DownloaderError {
    DownloaderError::Consumer(e.to_string())
}

fn cursor_of<F: StreamFile>(file: &F) -> Result<StreamCursor, DownloaderError> {
    let filename = StreamFilename::parse(file.name()).map_err(consumer_error)?;
    Ok(StreamCursor::new(&filename, file))
}

impl ConsumerPorts {
    fn last_committed(
        &self,
        stream_type: StreamType,
    ) -> Result<Option<StreamCursor>, DownloaderError> {
        self.persistence
            .last_committed(stream_type)
            .map_err(consumer_error)
    }
}

// =============================================================================
// RECORD STREAM
// =============================================================================

pub struct RecordStreamConsumer {
    ports: ConsumerPorts,
}

impl RecordStreamConsumer {
    pub fn new(ports: ConsumerPorts) -> Self {
        Self { ports }
    }

    /// Makes persisted address book changes visible and announces them.
    async fn publish_stage(&self, stage: AddressBookStage) -> Result<(), DownloaderError> {
        for book in self.ports.address_book.commit(stage)? {
            info!(
                file_id = %book.file_id(),
                start = book.start_consensus_timestamp(),
                nodes = book.len(),
                total_stake = book.total_stake(),
                "Address book updated"
            );
            self.ports
                .bus
                .publish(MirrorEvent::AddressBookUpdated {
                    file_id: book.file_id(),
                    start_consensus_timestamp: book.start_consensus_timestamp(),
                    node_count: book.len(),
                })
                .await;
        }
        Ok(())
    }
}

#[async_trait]
impl StreamFileConsumer<RecordFile> for RecordStreamConsumer {
    async fn last_committed(&self) -> Result<Option<StreamCursor>, DownloaderError> {
        self.ports.last_committed(StreamType::Record)
    }

    async fn consume(&self, file: RecordFile) -> Result<(), DownloaderError> {
        let cursor = cursor_of(&file)?;
        let stage = self.ports.address_book.stage();
        let parser = Arc::clone(&self.ports.parser);
        let persistence = Arc::clone(&self.ports.persistence);

        let (summary, stage): (CommitSummary, Option<AddressBookStage>) =
            tokio::task::spawn_blocking(move || {
                let context = parser
                    .parse_record_file(&file, Some(stage))
                    .map_err(consumer_error)?;
                let summary = persistence
                    .commit(StreamType::Record, &cursor, &context)
                    .map_err(consumer_error)?;
                let (_, stage) = context.into_parts();
                Ok::<_, DownloaderError>((summary, stage))
            })
            .await
            .map_err(consumer_error)??;

        if summary.replayed {
            debug!(consensus_end = summary.consensus_end, "Record file replayed");
            return Ok(());
        }
        match stage {
            Some(stage) => self.publish_stage(stage).await,
            None => Ok(()),
        }
    }
}

// =============================================================================
// BALANCE STREAM
// =============================================================================

pub struct BalanceStreamConsumer {
    ports: ConsumerPorts,
}

impl BalanceStreamConsumer {
    pub fn new(ports: ConsumerPorts) -> Self {
        Self { ports }
    }
}

#[async_trait]
impl StreamFileConsumer<AccountBalanceFile> for BalanceStreamConsumer {
    async fn last_committed(&self) -> Result<Option<StreamCursor>, DownloaderError> {
        self.ports.last_committed(StreamType::Balance)
    }

    async fn consume(&self, file: AccountBalanceFile) -> Result<(), DownloaderError> {
        let cursor = cursor_of(&file)?;
        let parser = Arc::clone(&self.ports.parser);
        let persistence = Arc::clone(&self.ports.persistence);

        let summary = tokio::task::spawn_blocking(move || {
            let context = parser.parse_balance_file(&file).map_err(consumer_error)?;
            persistence
                .commit(StreamType::Balance, &cursor, &context)
                .map_err(consumer_error)
        })
        .await
        .map_err(consumer_error)??;

        debug!(
            consensus_end = summary.consensus_end,
            rows = summary.rows.inserted,
            replayed = summary.replayed,
            "Balance file consumed"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mn_01_address_book::{
        AddressBook, AddressBookService, ConsensusNode, KeyType, NodePublicKey,
        NODE_DETAILS_FILE_ID,
    };
    use mn_03_stream_files::proto::transaction_body::Data;
    use mn_03_stream_files::proto::{
        AccountId, FileUpdateBody, ShardRealmNum, Timestamp, TransactionBody, TransactionId,
        TransactionReceipt, TransactionRecord,
    };
    use mn_03_stream_files::{AccountBalance, RecordItem, ResponseCode};
    use mn_05_record_parser::{ParserConfig, RecordFileParser};
    use mn_06_persistence::{InMemoryKVStore, PersistenceService};
    use shared_bus::{EventFilter, InMemoryEventBus};
    use shared_types::{EntityId, Sha384Hash};

    const SECOND: i64 = 1_000_000_000;

    fn id(num: i64) -> EntityId {
        EntityId::encode(0, 0, num).unwrap()
    }

    fn book(start: i64, stakes: &[u64]) -> AddressBook {
        let nodes = stakes
            .iter()
            .enumerate()
            .map(|(i, stake)| ConsensusNode {
                node_id: i as i64,
                node_account_id: id(i as i64 + 3),
                public_key: NodePublicKey::new(KeyType::Ed25519, vec![i as u8; 32]).unwrap(),
                stake: *stake,
                endpoints: vec![],
                description: format!("node {i}"),
            })
            .collect();
        AddressBook::new(NODE_DETAILS_FILE_ID, start, nodes).unwrap()
    }

    struct Fixture {
        persistence: Arc<PersistenceService>,
        address_book: Arc<AddressBookService>,
        bus: Arc<InMemoryEventBus>,
        ports: ConsumerPorts,
    }

    fn fixture() -> Fixture {
        let persistence = Arc::new(PersistenceService::new(Arc::new(InMemoryKVStore::new())));
        let parser =
            RecordFileParser::new(ParserConfig::default(), persistence.clone()).unwrap();
        let address_book = Arc::new(AddressBookService::new(book(0, &[1])));
        let bus = Arc::new(InMemoryEventBus::new());
        let ports = ConsumerPorts {
            parser: Arc::new(parser),
            persistence: persistence.clone(),
            address_book: address_book.clone(),
            bus: bus.clone(),
        };
        Fixture {
            persistence,
            address_book,
            bus,
            ports,
        }
    }

    fn timestamp(nanos: i64) -> Timestamp {
        Timestamp {
            seconds: nanos / SECOND,
            nanos: (nanos % SECOND) as i32,
        }
    }

    fn file_update(at: i64, contents: Vec<u8>) -> RecordItem {
        let body = TransactionBody {
            transaction_id: Some(TransactionId {
                transaction_valid_start: Some(timestamp(at - SECOND)),
                account_id: Some(AccountId {
                    account_num: 2,
                    ..Default::default()
                }),
                ..Default::default()
            }),
            node_account_id: Some(AccountId {
                account_num: 3,
                ..Default::default()
            }),
            transaction_fee: 100,
            data: Some(Data::FileUpdate(FileUpdateBody {
                file_id: Some(ShardRealmNum {
                    num: 102,
                    ..Default::default()
                }),
                contents,
                ..Default::default()
            })),
            ..Default::default()
        };
        let record = TransactionRecord {
            receipt: Some(TransactionReceipt {
                status: ResponseCode::SUCCESS.code(),
                ..Default::default()
            }),
            consensus_timestamp: Some(timestamp(at)),
            ..Default::default()
        };
        RecordItem::from_parts(0, &body, &record).unwrap()
    }

    fn record_file(start: i64, end: i64, items: Vec<RecordItem>) -> RecordFile {
        RecordFile {
            name: StreamFilename::data(StreamType::Record, start).filename(),
            version: 6,
            hapi_version: (0, 50, 0),
            consensus_start: start,
            consensus_end: end,
            file_hash: Sha384Hash::ZERO,
            metadata_hash: Sha384Hash::ZERO,
            previous_hash: Sha384Hash::ZERO,
            hash: Sha384Hash::ZERO,
            index: 0,
            size: 0,
            node: None,
            items,
        }
    }

    #[tokio::test]
    async fn test_record_file_commits_cursor() {
        let fixture = fixture();
        let consumer = RecordStreamConsumer::new(fixture.ports.clone());
        assert_eq!(consumer.last_committed().await.unwrap(), None);

        consumer
            .consume(record_file(SECOND, 2 * SECOND, vec![]))
            .await
            .unwrap();

        let cursor = consumer.last_committed().await.unwrap().unwrap();
        assert_eq!(cursor.consensus_end, 2 * SECOND);
        assert_eq!(
            fixture
                .persistence
                .last_committed(StreamType::Record)
                .unwrap(),
            Some(cursor)
        );
    }

    #[tokio::test]
    async fn test_address_book_published_after_commit() {
        let fixture = fixture();
        let mut subscription = fixture.bus.subscribe(EventFilter::all());
        let consumer = RecordStreamConsumer::new(fixture.ports.clone());
        let update = file_update(10 * SECOND, book(0, &[4, 4]).to_bytes());

        consumer
            .consume(record_file(10 * SECOND, 10 * SECOND, vec![update]))
            .await
            .unwrap();

        let current = fixture.address_book.current();
        assert_eq!(current.start_consensus_timestamp(), 10 * SECOND + 1);
        assert_eq!(current.total_stake(), 8);
        match subscription.recv().await {
            Some(MirrorEvent::AddressBookUpdated {
                start_consensus_timestamp,
                node_count,
                ..
            }) => {
                assert_eq!(start_consensus_timestamp, 10 * SECOND + 1);
                assert_eq!(node_count, 2);
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_replayed_file_does_not_republish() {
        let fixture = fixture();
        let consumer = RecordStreamConsumer::new(fixture.ports.clone());
        let file = record_file(SECOND, 2 * SECOND, vec![]);

        consumer.consume(file.clone()).await.unwrap();
        consumer.consume(file).await.unwrap();

        assert_eq!(fixture.address_book.current().start_consensus_timestamp(), 0);
    }

    #[tokio::test]
    async fn test_older_file_is_rejected() {
        let fixture = fixture();
        let consumer = RecordStreamConsumer::new(fixture.ports.clone());
        consumer
            .consume(record_file(5 * SECOND, 6 * SECOND, vec![]))
            .await
            .unwrap();

        let result = consumer
            .consume(record_file(SECOND, 2 * SECOND, vec![]))
            .await;
        assert!(matches!(result, Err(DownloaderError::Consumer(_))));
    }

    #[tokio::test]
    async fn test_balance_file_commits() {
        let fixture = fixture();
        let consumer = BalanceStreamConsumer::new(fixture.ports.clone());
        let file = AccountBalanceFile {
            name: StreamFilename::data(StreamType::Balance, 7 * SECOND).filename(),
            version: 2,
            consensus_timestamp: 7 * SECOND,
            file_hash: Sha384Hash::ZERO,
            size: 0,
            node: None,
            balances: vec![AccountBalance {
                account_id: id(2),
                balance: 100,
                token_balances: vec![],
            }],
        };

        consumer.consume(file).await.unwrap();

        let cursor = consumer.last_committed().await.unwrap().unwrap();
        assert_eq!(cursor.consensus_end, 7 * SECOND);
        assert_eq!(cursor.count, 1);
    }
}
