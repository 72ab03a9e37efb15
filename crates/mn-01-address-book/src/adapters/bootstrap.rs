//! Bootstrap address book loader.
//!
//! The file holds the raw protobuf contents of an address book file, as
//! published by the network. The resulting snapshot is effective from
//! timestamp zero.

use crate::domain::address_book::AddressBook;
use crate::domain::errors::AddressBookError;
use shared_types::EntityId;
use std::path::Path;
use tracing::info;

pub fn load_bootstrap(path: &Path, file_id: EntityId) -> Result<AddressBook, AddressBookError> {
    let bootstrap_error = |reason: String| AddressBookError::Bootstrap {
        path: path.display().to_string(),
        reason,
    };
    let bytes = std::fs::read(path).map_err(|e| bootstrap_error(e.to_string()))?;
    let book = AddressBook::from_bytes(file_id, 0, &bytes)
        .map_err(|e| bootstrap_error(e.to_string()))?;

    info!(
        path = %path.display(),
        nodes = book.len(),
        total_stake = book.total_stake(),
        "Loaded bootstrap address book"
    );
    Ok(book)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::address_book::tests::book;
    use crate::domain::address_book::NODE_DETAILS_FILE_ID;

    #[test]
    fn test_load_bootstrap() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("addressbook.bin");
        std::fs::write(&path, book(0, &[1, 2]).to_bytes()).unwrap();

        let loaded = load_bootstrap(&path, NODE_DETAILS_FILE_ID).unwrap();
        assert_eq!(loaded, book(0, &[1, 2]));
    }

    #[test]
    fn test_missing_or_empty_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.bin");
        assert!(matches!(
            load_bootstrap(&path, NODE_DETAILS_FILE_ID),
            Err(AddressBookError::Bootstrap { .. })
        ));

        std::fs::write(&path, b"").unwrap();
        assert!(matches!(
            load_bootstrap(&path, NODE_DETAILS_FILE_ID),
            Err(AddressBookError::Bootstrap { .. })
        ));
    }
}
