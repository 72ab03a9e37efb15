//! # Importer Container
//!
//! Holds every subsystem instance and wires their ports together.
//!
//! ## Initialization Order
//!
//! 1. Key-value store and the persistence service on top of it
//! 2. Address book: bootstrap snapshot, then stored history
//! 3. Record parser, using persistence for alias lookups
//! 4. Event bus and stream file consumers
//! 5. One downloader per stream kind, each with its own quorum policy
//! 6. Retention

use crate::adapters::consumers::{BalanceStreamConsumer, ConsumerPorts, RecordStreamConsumer};
use crate::config::ImporterConfig;
use anyhow::{Context, Result};
use mn_01_address_book::{
    load_bootstrap, AddressBook, AddressBookApi, AddressBookService, NODE_DETAILS_FILE_ID,
};
use mn_02_signature_verification::SignatureVerificationService;
use mn_03_stream_files::{
    AccountBalanceFile, BalanceFileReader, LocalStreamFileProvider, RecordFile,
    RecordFileReader, StreamFileProvider,
};
use mn_04_downloader::{
    BusNotifier, DateRangeCalculator, Downloader, DownloaderPorts, StreamFileConsumer,
};
use mn_05_record_parser::RecordFileParser;
use mn_06_persistence::{KeyValueStore, PersistenceService, RetentionService};
use shared_bus::InMemoryEventBus;
use shared_types::StreamType;
use std::sync::Arc;
use tracing::info;

pub struct ImporterContainer {
    pub config: ImporterConfig,
    pub store: Arc<dyn KeyValueStore>,
    pub persistence: Arc<PersistenceService>,
    pub address_book: Arc<AddressBookService>,
    pub bus: Arc<InMemoryEventBus>,
    pub record_downloader: Arc<Downloader<RecordFileReader>>,
    pub balance_downloader: Arc<Downloader<BalanceFileReader>>,
    pub retention: Arc<RetentionService>,
}

impl ImporterContainer {
    /// Opens the configured store, stream bucket and bootstrap address book.
    pub fn open(config: ImporterConfig) -> Result<Self> {
        std::fs::create_dir_all(&config.importer.data_dir).with_context(|| {
            format!(
                "Failed to create data dir {}",
                config.importer.data_dir.display()
            )
        })?;
        let store = open_store(&config)?;
        let provider = Arc::new(LocalStreamFileProvider::new(&config.importer.network));
        let bootstrap = load_bootstrap(&config.importer.bootstrap_address_book, NODE_DETAILS_FILE_ID)
            .context("Failed to load bootstrap address book")?;
        Self::build(config, store, provider, bootstrap)
    }

    /// Wires the subsystems around the given store and artifact source.
    pub fn build(
        config: ImporterConfig,
        store: Arc<dyn KeyValueStore>,
        provider: Arc<dyn StreamFileProvider>,
        bootstrap: AddressBook,
    ) -> Result<Self> {
        let persistence = Arc::new(PersistenceService::new(Arc::clone(&store)));
        let address_book = Arc::new(
            AddressBookService::restore(bootstrap, persistence.as_ref())
                .context("Failed to restore address book history")?,
        );
        let parser = RecordFileParser::new(config.parser.clone(), persistence.clone())
            .context("Failed to create record parser")?;
        let bus = Arc::new(InMemoryEventBus::new());

        let ports = ConsumerPorts {
            parser: Arc::new(parser),
            persistence: persistence.clone(),
            address_book: address_book.clone(),
            bus: bus.clone(),
        };
        let record_consumer: Arc<dyn StreamFileConsumer<RecordFile>> =
            Arc::new(RecordStreamConsumer::new(ports.clone()));
        let balance_consumer: Arc<dyn StreamFileConsumer<AccountBalanceFile>> =
            Arc::new(BalanceStreamConsumer::new(ports));

        let date_range = || -> Result<DateRangeCalculator> {
            Ok(DateRangeCalculator::new(
                config.start_date()?,
                config.end_date()?,
            ))
        };
        let record = &config.downloader.record;
        let record_downloader = Arc::new(Downloader::new(
            StreamType::Record,
            record.to_downloader_config()?,
            date_range()?,
            RecordFileReader,
            DownloaderPorts {
                provider: provider.clone(),
                address_book: address_book.clone(),
                verifier: Arc::new(SignatureVerificationService::new(record.quorum()?)),
                consumer: record_consumer,
                notifier: Arc::new(BusNotifier::new(bus.clone())),
            },
        ));
        let balance = &config.downloader.balance;
        let balance_downloader = Arc::new(Downloader::new(
            StreamType::Balance,
            balance.to_downloader_config()?,
            date_range()?,
            BalanceFileReader,
            DownloaderPorts {
                provider,
                address_book: address_book.clone(),
                verifier: Arc::new(SignatureVerificationService::new(balance.quorum()?)),
                consumer: balance_consumer,
                notifier: Arc::new(BusNotifier::new(bus.clone())),
            },
        ));

        let retention = Arc::new(
            RetentionService::new(Arc::clone(&store), config.retention.clone())
                .context("Invalid retention configuration")?,
        );

        info!(
            nodes = address_book.current().len(),
            record = record.enabled,
            balance = balance.enabled,
            retention = config.retention.enabled,
            "Importer subsystems wired"
        );
        Ok(Self {
            config,
            store,
            persistence,
            address_book,
            bus,
            record_downloader,
            balance_downloader,
            retention,
        })
    }
}

#[cfg(feature = "rocksdb")]
fn open_store(config: &ImporterConfig) -> Result<Arc<dyn KeyValueStore>> {
    use crate::adapters::rocksdb::{RocksDbConfig, RocksDbStore};

    let path = config.store_path();
    let store = RocksDbStore::open(RocksDbConfig::new(&path))
        .with_context(|| format!("Failed to open store at {}", path.display()))?;
    info!(path = %path.display(), "Opened RocksDB store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "rocksdb"))]
fn open_store(_config: &ImporterConfig) -> Result<Arc<dyn KeyValueStore>> {
    tracing::warn!("Built without RocksDB, using a volatile in-memory store");
    Ok(Arc::new(mn_06_persistence::InMemoryKVStore::new()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mn_01_address_book::{AddressBookApi, ConsensusNode, KeyType, NodePublicKey};
    use mn_03_stream_files::InMemoryStreamFileProvider;
    use mn_04_downloader::DownloaderApi;
    use mn_06_persistence::InMemoryKVStore;
    use shared_types::EntityId;

    fn bootstrap() -> AddressBook {
        let node = ConsensusNode {
            node_id: 0,
            node_account_id: EntityId::encode(0, 0, 3).unwrap(),
            public_key: NodePublicKey::new(KeyType::Ed25519, vec![1; 32]).unwrap(),
            stake: 1,
            endpoints: vec![],
            description: String::new(),
        };
        AddressBook::new(NODE_DETAILS_FILE_ID, 0, vec![node]).unwrap()
    }

    #[tokio::test]
    async fn test_build_wires_subsystems() {
        let container = ImporterContainer::build(
            ImporterConfig::default(),
            Arc::new(InMemoryKVStore::new()),
            Arc::new(InMemoryStreamFileProvider::new()),
            bootstrap(),
        )
        .unwrap();

        assert_eq!(container.address_book.current().len(), 1);
        assert_eq!(container.record_downloader.stream_type(), StreamType::Record);
        assert_eq!(container.balance_downloader.stream_type(), StreamType::Balance);

        let summary = container.record_downloader.download_round().await.unwrap();
        assert!(summary.committed.is_empty());
    }

    #[test]
    fn test_invalid_dates_fail_wiring() {
        let mut config = ImporterConfig::default();
        config.importer.start_date = Some("not a date".to_string());
        let result = ImporterContainer::build(
            config,
            Arc::new(InMemoryKVStore::new()),
            Arc::new(InMemoryStreamFileProvider::new()),
            bootstrap(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_open_reads_bootstrap_and_store() {
        let dir = tempfile::tempdir().unwrap();
        let bootstrap_path = dir.path().join("addressbook.bin");
        std::fs::write(&bootstrap_path, bootstrap().to_bytes()).unwrap();

        let mut config = ImporterConfig::default();
        config.importer.data_dir = dir.path().join("data");
        config.importer.network = dir.path().join("streams");
        config.importer.bootstrap_address_book = bootstrap_path;

        let container = ImporterContainer::open(config).unwrap();
        assert_eq!(container.address_book.current(), Arc::new(bootstrap()));
    }
}
