//! # Persistence Service
//!
//! Commits one parsed stream file at a time. Every table mutation, the
//! entity alias indexes, staged address book changes, the file summary and
//! the advanced cursor go into a single atomic batch, so a crash leaves the
//! store at the previous file boundary.

pub mod retention;


use crate::domain::errors::PersistenceError;
use crate::domain::keys::{
    address_book_key, address_book_pending_key, alias_key, cursor_key, evm_address_key,
    stream_file_key, ADDRESS_BOOK_PENDING_PREFIX, ADDRESS_BOOK_PREFIX,
};
use crate::domain::upsert::{decode, encode, upsert_tables, UpsertBatch, UpsertStats};
use crate::ports::inbound::{CommitSummary, PersistenceApi};
use crate::ports::outbound::{BatchOperation, KeyValueStore};
use mn_01_address_book::{
    AddressBook, AddressBookError, AddressBookRepository, AddressBookStage, PendingContents,
};
use mn_04_downloader::StreamCursor;
use mn_05_record_parser::{Entity, EntityLookup, ParserContext, ParserError};
use shared_types::{EntityId, Patch, StreamType};
use std::sync::Arc;
use tracing::{debug, info};

pub struct PersistenceService {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceService {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn KeyValueStore> {
        &self.store
    }

    fn get<T: serde::de::DeserializeOwned>(
        &self,
        key: &[u8],
    ) -> Result<Option<T>, PersistenceError> {
        match self.store.get(key)? {
            Some(bytes) => decode(key, &bytes).map(Some),
            None => Ok(None),
        }
    }

    fn find_entity(&self, key: &[u8]) -> Result<Option<EntityId>, PersistenceError> {
        self.get(key)
    }
}

/// Index entries for entities whose alias or EVM address is set.
fn entity_indexes(
    batch: &mut UpsertBatch<'_>,
    context: &ParserContext,
) -> Result<(), PersistenceError> {
    for (_, mutations) in context.rows::<Entity>().iter() {
        for entity in mutations {
            let value = encode("entity id", &entity.id)?;
            if let Patch::Set(alias) = &entity.alias {
                if !alias.is_empty() {
                    batch.push(BatchOperation::put(alias_key(alias), value.clone()));
                }
            }
            if let Patch::Set(address) = &entity.evm_address {
                if !address.is_empty() {
                    batch.push(BatchOperation::put(evm_address_key(address), value));
                }
            }
        }
    }
    Ok(())
}

impl PersistenceService {
    /// Snapshots and the pending uploads that replace the stored ones.
    fn address_book_operations(
        &self,
        books: &[AddressBook],
        pending: &PendingContents,
    ) -> Result<Vec<BatchOperation>, PersistenceError> {
        let mut operations = Vec::with_capacity(books.len() + pending.len());
        for book in books {
            operations.push(BatchOperation::put(
                address_book_key(book.start_consensus_timestamp()),
                encode("address book", book)?,
            ));
        }
        for (key, _) in self
            .store
            .prefix_scan(ADDRESS_BOOK_PENDING_PREFIX.as_bytes())?
        {
            operations.push(BatchOperation::delete(key));
        }
        for (file_id, contents) in pending {
            operations.push(BatchOperation::put(
                address_book_pending_key(*file_id),
                encode("pending address book", &(*file_id, contents))?,
            ));
        }
        Ok(operations)
    }

    fn stage_operations(
        &self,
        stage: Option<&AddressBookStage>,
    ) -> Result<(Vec<BatchOperation>, usize), PersistenceError> {
        match stage {
            Some(stage) if stage.is_dirty() => {
                let operations = self.address_book_operations(stage.completed(), stage.pending())?;
                Ok((operations, stage.completed().len()))
            }
            _ => Ok((Vec::new(), 0)),
        }
    }
}

impl PersistenceApi for PersistenceService {
    fn commit(
        &self,
        stream_type: StreamType,
        cursor: &StreamCursor,
        context: &ParserContext,
    ) -> Result<CommitSummary, PersistenceError> {
        if let Some(committed) = self.last_committed(stream_type)? {
            if committed.consensus_end == cursor.consensus_end {
                debug!(
                    stream = %stream_type,
                    file = %committed.filename,
                    "File already committed"
                );
                return Ok(CommitSummary {
                    stream_type,
                    consensus_end: cursor.consensus_end,
                    operations: 0,
                    rows: UpsertStats::default(),
                    address_books: 0,
                    replayed: true,
                });
            }
            if committed.consensus_end > cursor.consensus_end {
                return Err(PersistenceError::CursorRegression {
                    stream_type: stream_type.as_str(),
                    committed: committed.consensus_end,
                    consensus_end: cursor.consensus_end,
                });
            }
        }

        let mut batch = UpsertBatch::new(self.store.as_ref());
        upsert_tables(&mut batch, context.tables())?;
        entity_indexes(&mut batch, context)?;

        let (book_operations, address_books) = self.stage_operations(context.stage())?;
        for operation in book_operations {
            batch.push(operation);
        }

        let value = encode("stream cursor", cursor)?;
        batch.push(BatchOperation::put(
            stream_file_key(stream_type, cursor.consensus_end),
            value.clone(),
        ));
        batch.push(BatchOperation::put(cursor_key(stream_type), value));

        let (operations, rows) = batch.into_operations();
        let count = operations.len();
        self.store.atomic_batch_write(operations)?;

        info!(
            stream = %stream_type,
            file = %cursor.filename,
            operations = count,
            inserted = rows.inserted,
            updated = rows.updated,
            history = rows.history,
            address_books,
            "Committed stream file"
        );
        Ok(CommitSummary {
            stream_type,
            consensus_end: cursor.consensus_end,
            operations: count,
            rows,
            address_books,
            replayed: false,
        })
    }

    fn last_committed(
        &self,
        stream_type: StreamType,
    ) -> Result<Option<StreamCursor>, PersistenceError> {
        self.get(&cursor_key(stream_type))
    }
}

impl AddressBookRepository for PersistenceService {
    fn load(&self) -> Result<(Vec<AddressBook>, PendingContents), AddressBookError> {
        let mut books = Vec::new();
        for (key, value) in self
            .store
            .prefix_scan(ADDRESS_BOOK_PREFIX.as_bytes())
            .map_err(PersistenceError::from)?
        {
            books.push(decode::<AddressBook>(&key, &value)?);
        }
        let mut pending = PendingContents::new();
        for (key, value) in self
            .store
            .prefix_scan(ADDRESS_BOOK_PENDING_PREFIX.as_bytes())
            .map_err(PersistenceError::from)?
        {
            let (file_id, contents) = decode::<(EntityId, Vec<u8>)>(&key, &value)?;
            pending.insert(file_id, contents);
        }
        Ok((books, pending))
    }

    fn save(
        &self,
        books: &[AddressBook],
        pending: &PendingContents,
    ) -> Result<(), AddressBookError> {
        let operations = self.address_book_operations(books, pending)?;
        self.store
            .atomic_batch_write(operations)
            .map_err(PersistenceError::from)?;
        Ok(())
    }
}

impl EntityLookup for PersistenceService {
    fn find_by_alias(&self, alias: &[u8]) -> Result<Option<EntityId>, ParserError> {
        Ok(self.find_entity(&alias_key(alias))?)
    }

    fn find_by_evm_address(&self, evm_address: &[u8]) -> Result<Option<EntityId>, ParserError> {
        Ok(self.find_entity(&evm_address_key(evm_address))?)
    }
}
