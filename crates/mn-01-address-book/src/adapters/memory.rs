//! In-memory address book repository.

use crate::domain::address_book::AddressBook;
use crate::domain::errors::AddressBookError;
use crate::domain::stage::PendingContents;
use crate::ports::outbound::AddressBookRepository;
use parking_lot::RwLock;

#[derive(Debug, Default)]
pub struct InMemoryAddressBookRepository {
    books: RwLock<Vec<AddressBook>>,
    pending: RwLock<PendingContents>,
}

impl AddressBookRepository for InMemoryAddressBookRepository {
    fn load(&self) -> Result<(Vec<AddressBook>, PendingContents), AddressBookError> {
        Ok((self.books.read().clone(), self.pending.read().clone()))
    }

    fn save(
        &self,
        books: &[AddressBook],
        pending: &PendingContents,
    ) -> Result<(), AddressBookError> {
        let mut stored = self.books.write();
        for book in books {
            if !stored.contains(book) {
                stored.push(book.clone());
            }
        }
        *self.pending.write() = pending.clone();
        Ok(())
    }
}
