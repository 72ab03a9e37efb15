//! # Pipeline Tests
//!
//! Signed files published by simulated nodes travel through the wired
//! importer:
//!
//! 1. **Download**: list, fetch signatures, reach quorum, fetch the body
//! 2. **Verify**: file hash, metadata hash, hash chain and ordering
//! 3. **Parse + Persist**: rows, cursor and address book in one commit
//! 4. **Notify**: `StreamFileParsed` / `AddressBookUpdated` on the bus

#[cfg(test)]
mod tests {
    use super::super::network::{
        address_book_update, balance_file, record_file, transfer, Network, SECOND,
    };
    use importer_runtime::ImporterConfig;
    use mn_01_address_book::AddressBookApi;
    use mn_04_downloader::{DownloaderApi, DownloaderError};
    use mn_05_record_parser::Table;
    use mn_06_persistence::domain::keys::table_prefix;
    use mn_06_persistence::{InMemoryKVStore, KeyValueStore, PersistenceApi};
    use shared_bus::{EventFilter, EventTopic, MirrorEvent};
    use shared_types::{sha384, Sha384Hash, StreamType};
    use std::sync::Arc;

    fn rows(store: &InMemoryKVStore, table: Table) -> usize {
        store.prefix_scan(table_prefix(table).as_bytes()).unwrap().len()
    }

    // =========================================================================
    // RECORD STREAM
    // =========================================================================

    #[tokio::test]
    async fn test_record_files_flow_into_store() {
        let network = Network::new(&[1, 1, 1, 1]);
        let first = record_file(
            sha384(&[b"genesis"]),
            &[transfer(10, 2, 1001, 50), transfer(11, 2, 1002, 70)],
        );
        let second = record_file(first.end_hash, &[transfer(20, 1001, 1002, 5)]);
        network.publish_all(&first);
        network.publish_all(&second);

        let store = Arc::new(InMemoryKVStore::new());
        let importer = network.importer(ImporterConfig::default(), store.clone());
        let mut events = importer
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::StreamFiles]));

        let summary = importer.record_downloader.download_round().await.unwrap();
        assert_eq!(summary.committed.len(), 2);

        let cursor = importer
            .persistence
            .last_committed(StreamType::Record)
            .unwrap()
            .unwrap();
        assert_eq!(cursor.consensus_end, 20 * SECOND);
        assert_eq!(cursor.hash, second.end_hash);
        assert_eq!(rows(&store, Table::Transaction), 3);
        assert!(rows(&store, Table::CryptoTransfer) >= 3);

        for expected_end in [11 * SECOND, 20 * SECOND] {
            match events.recv().await {
                Some(MirrorEvent::StreamFileParsed { consensus_end, .. }) => {
                    assert_eq!(consensus_end, expected_end)
                }
                other => panic!("unexpected event {other:?}"),
            }
        }
    }

    #[tokio::test]
    async fn test_restart_resumes_after_cursor() {
        let network = Network::new(&[1, 1, 1]);
        let first = record_file(Sha384Hash::ZERO, &[transfer(10, 2, 1001, 50)]);
        network.publish_all(&first);
        let store = Arc::new(InMemoryKVStore::new());
        {
            let importer = network.importer(ImporterConfig::default(), store.clone());
            let summary = importer.record_downloader.download_round().await.unwrap();
            assert_eq!(summary.committed.len(), 1);
        }

        let second = record_file(first.end_hash, &[transfer(20, 2, 1001, 5)]);
        network.publish_all(&second);
        let importer = network.importer(ImporterConfig::default(), store.clone());
        let summary = importer.record_downloader.download_round().await.unwrap();

        assert_eq!(summary.committed.len(), 1);
        assert_eq!(summary.committed[0].filename, second.name);
        assert_eq!(rows(&store, Table::Transaction), 2);
    }

    #[tokio::test]
    async fn test_minority_signatures_commit_nothing() {
        let network = Network::new(&[1, 1, 1, 1]);
        let file = record_file(Sha384Hash::ZERO, &[transfer(10, 2, 1001, 50)]);
        network.publish(&file, &[0]);

        let store = Arc::new(InMemoryKVStore::new());
        let importer = network.importer(ImporterConfig::default(), store.clone());
        let result = importer.record_downloader.download_round().await;

        assert!(matches!(result, Err(DownloaderError::Signature(_))));
        assert_eq!(
            importer.persistence.last_committed(StreamType::Record).unwrap(),
            None
        );
        assert_eq!(rows(&store, Table::Transaction), 0);
    }

    #[tokio::test]
    async fn test_broken_hash_chain_keeps_earlier_files() {
        let network = Network::new(&[1, 1, 1]);
        let first = record_file(Sha384Hash::ZERO, &[transfer(10, 2, 1001, 50)]);
        let forked = record_file(sha384(&[b"elsewhere"]), &[transfer(20, 2, 1001, 5)]);
        network.publish_all(&first);
        network.publish_all(&forked);

        let store = Arc::new(InMemoryKVStore::new());
        let importer = network.importer(ImporterConfig::default(), store.clone());
        let result = importer.record_downloader.download_round().await;

        assert!(matches!(result, Err(DownloaderError::HashChain { .. })));
        let cursor = importer
            .persistence
            .last_committed(StreamType::Record)
            .unwrap()
            .unwrap();
        assert_eq!(cursor.filename, first.name);
        assert_eq!(rows(&store, Table::Transaction), 1);
    }

    // =========================================================================
    // ADDRESS BOOK
    // =========================================================================

    #[tokio::test]
    async fn test_rotated_address_book_verifies_next_file() {
        let network = Network::new(&[1, 1, 1, 1]);
        let rotated = network.rotate(&[11, 12], &[5, 5]);
        let first = record_file(
            Sha384Hash::ZERO,
            &[
                transfer(10, 2, 1001, 50),
                address_book_update(11, rotated.book()),
            ],
        );
        let second = record_file(first.end_hash, &[transfer(20, 2, 1001, 5)]);
        network.publish_all(&first);
        // Only the new keys sign the file after the update.
        rotated.publish_all(&second);

        let store = Arc::new(InMemoryKVStore::new());
        let importer = network.importer(ImporterConfig::default(), store.clone());
        let mut events = importer
            .bus
            .subscribe(EventFilter::topics(vec![EventTopic::AddressBook]));

        let summary = importer.record_downloader.download_round().await.unwrap();
        assert_eq!(summary.committed.len(), 2);

        let current = importer.address_book.current();
        assert_eq!(current.start_consensus_timestamp(), 11 * SECOND + 1);
        assert_eq!(current.len(), 2);
        assert_eq!(current.total_stake(), 10);
        match events.recv().await {
            Some(MirrorEvent::AddressBookUpdated {
                start_consensus_timestamp,
                node_count,
                ..
            }) => {
                assert_eq!(start_consensus_timestamp, 11 * SECOND + 1);
                assert_eq!(node_count, 2);
            }
            other => panic!("unexpected event {other:?}"),
        }

        // Restored from the store on restart.
        let restarted = network.importer(ImporterConfig::default(), store);
        assert_eq!(restarted.address_book.current(), current);
    }

    #[tokio::test]
    async fn test_old_keys_rejected_after_rotation() {
        let network = Network::new(&[1, 1, 1, 1]);
        let rotated = network.rotate(&[11, 12], &[5, 5]);
        let first = record_file(
            Sha384Hash::ZERO,
            &[address_book_update(10, rotated.book())],
        );
        let second = record_file(first.end_hash, &[transfer(20, 2, 1001, 5)]);
        network.publish_all(&first);
        network.publish_all(&second);

        let store = Arc::new(InMemoryKVStore::new());
        let importer = network.importer(ImporterConfig::default(), store.clone());
        let result = importer.record_downloader.download_round().await;

        assert!(result.is_err());
        let cursor = importer
            .persistence
            .last_committed(StreamType::Record)
            .unwrap()
            .unwrap();
        assert_eq!(cursor.filename, first.name);
    }

    // =========================================================================
    // BALANCE STREAM
    // =========================================================================

    #[tokio::test]
    async fn test_disabled_balance_stream_imports_first_file_only() {
        let network = Network::new(&[1, 1, 1]);
        network.publish_all(&balance_file(30, &[(2, 1_000), (1001, 50)]));

        let store = Arc::new(InMemoryKVStore::new());
        let importer = network.importer(ImporterConfig::default(), store.clone());
        assert!(!importer.config.downloader.balance.enabled);

        let summary = importer.balance_downloader.download_round().await.unwrap();
        assert_eq!(summary.committed.len(), 1);
        assert_eq!(rows(&store, Table::AccountBalance), 2);

        network.publish_all(&balance_file(60, &[(2, 900)]));
        let summary = importer.balance_downloader.download_round().await.unwrap();
        assert!(summary.skipped);
        assert_eq!(rows(&store, Table::AccountBalance), 2);
    }

    #[tokio::test]
    async fn test_enabled_balance_stream_follows_new_files() {
        let network = Network::new(&[1, 1, 1]);
        network.publish_all(&balance_file(30, &[(2, 1_000)]));
        network.publish_all(&balance_file(60, &[(2, 900), (1001, 100)]));

        let mut config = ImporterConfig::default();
        config.downloader.balance.enabled = true;
        let store = Arc::new(InMemoryKVStore::new());
        let importer = network.importer(config, store.clone());

        let summary = importer.balance_downloader.download_round().await.unwrap();
        assert_eq!(summary.committed.len(), 2);
        assert_eq!(rows(&store, Table::AccountBalance), 3);
        let cursor = importer
            .persistence
            .last_committed(StreamType::Balance)
            .unwrap()
            .unwrap();
        assert_eq!(cursor.consensus_end, 60 * SECOND);
    }
}
