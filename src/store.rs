//! The library store: the ordered list of books plus the slot it is mirrored
//! into. Every mutation rewrites the whole slot before returning, and a failed
//! write undoes the mutation, so memory and storage never disagree.

use tracing::{info, warn};

use crate::db::{SlotStore, LIBRARY_SLOT};
use crate::error::{LibraryError, Result};
use crate::models::{seed_books, Book, BookId};

/// Where the books of a freshly loaded library came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOrigin {
    Stored,
    Seeded,
    /// The stored slot was malformed; the seed replaced it. Carries the parse
    /// error text.
    Recovered(String),
}

pub struct Library {
    books: Vec<Book>,
    slots: Box<dyn SlotStore>,
    origin: LoadOrigin,
}

impl Library {
    /// Hydrate from the `library` slot, falling back to the two seed books
    /// when nothing usable is stored. Only a failing backend is an error.
    pub fn load(slots: Box<dyn SlotStore>) -> Result<Self> {
        let (books, origin) = match slots.read(LIBRARY_SLOT)? {
            None => (seed_books(), LoadOrigin::Seeded),
            Some(raw) => match decode(&raw) {
                Ok(books) => (books, LoadOrigin::Stored),
                Err(err) => {
                    warn!(error = %err, "stored library is malformed, using seed books");
                    (seed_books(), LoadOrigin::Recovered(err.to_string()))
                }
            },
        };

        info!(count = books.len(), origin = ?origin, "library loaded");
        Ok(Self {
            books,
            slots,
            origin,
        })
    }

    pub fn origin(&self) -> &LoadOrigin {
        &self.origin
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn len(&self) -> usize {
        self.books.len()
    }

    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    pub fn get(&self, id: BookId) -> Option<&Book> {
        self.books.iter().find(|book| book.id == id)
    }

    pub fn index_of(&self, id: BookId) -> Option<usize> {
        self.books.iter().position(|book| book.id == id)
    }

    pub fn read_count(&self) -> usize {
        self.books.iter().filter(|book| book.read).count()
    }

    pub fn unread_count(&self) -> usize {
        self.len() - self.read_count()
    }

    /// Append a new book and persist. Field validation belongs to the caller.
    pub fn add(
        &mut self,
        title: impl Into<String>,
        author: impl Into<String>,
        pages: impl Into<String>,
        read: bool,
    ) -> Result<Book> {
        let book = Book::new(title, author, pages, read);
        self.books.push(book.clone());

        if let Err(err) = self.persist() {
            self.books.pop();
            return Err(err);
        }

        info!(id = %book.id, title = %book.title, "book added");
        Ok(book)
    }

    /// Flip the read flag of the book with `id`, returning the new value.
    pub fn toggle_read(&mut self, id: BookId) -> Result<bool> {
        let index = self.require(id)?;
        self.toggle_read_at(index)
    }

    /// Positional variant of [`Library::toggle_read`].
    pub fn toggle_read_at(&mut self, index: usize) -> Result<bool> {
        self.check_index(index)?;
        self.books[index].toggle_read();

        if let Err(err) = self.persist() {
            self.books[index].toggle_read();
            return Err(err);
        }

        let book = &self.books[index];
        info!(id = %book.id, read = book.read, "read status toggled");
        Ok(book.read)
    }

    /// Delete the book with `id`. Later books shift one position left.
    pub fn remove(&mut self, id: BookId) -> Result<Book> {
        let index = self.require(id)?;
        self.remove_at(index)
    }

    /// Positional variant of [`Library::remove`].
    pub fn remove_at(&mut self, index: usize) -> Result<Book> {
        self.check_index(index)?;
        let book = self.books.remove(index);

        if let Err(err) = self.persist() {
            self.books.insert(index, book);
            return Err(err);
        }

        info!(id = %book.id, title = %book.title, "book removed");
        Ok(book)
    }

    /// Serialize the whole list and overwrite the stored slot.
    pub fn persist(&self) -> Result<()> {
        let raw = serde_json::to_string(&self.books).map_err(LibraryError::Serialization)?;
        self.slots.write(LIBRARY_SLOT, &raw)
    }

    fn require(&self, id: BookId) -> Result<usize> {
        self.index_of(id).ok_or_else(|| {
            warn!(%id, "rejected reference to a missing book");
            LibraryError::UnknownBook(id)
        })
    }

    fn check_index(&self, index: usize) -> Result<()> {
        if index < self.books.len() {
            Ok(())
        } else {
            warn!(index, len = self.books.len(), "rejected stale position");
            Err(LibraryError::IndexOutOfRange {
                index,
                len: self.books.len(),
            })
        }
    }
}

/// Parse the stored slot back into books.
pub fn decode(raw: &str) -> Result<Vec<Book>> {
    serde_json::from_str(raw).map_err(LibraryError::StorageDeserialization)
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::db::MemorySlots;

    /// Shares the backing slots between the library and the test body.
    struct SharedSlots(Rc<MemorySlots>);

    impl SlotStore for SharedSlots {
        fn read(&self, key: &str) -> Result<Option<String>> {
            self.0.read(key)
        }

        fn write(&self, key: &str, value: &str) -> Result<()> {
            self.0.write(key, value)
        }

        fn remove(&self, key: &str) -> Result<()> {
            self.0.remove(key)
        }
    }

    fn library_with(slots: MemorySlots) -> (Library, Rc<MemorySlots>) {
        let shared = Rc::new(slots);
        let library = Library::load(Box::new(SharedSlots(Rc::clone(&shared)))).unwrap();
        (library, shared)
    }

    fn stored_books(slots: &MemorySlots) -> Vec<Book> {
        decode(&slots.read(LIBRARY_SLOT).unwrap().unwrap()).unwrap()
    }

    fn titles(library: &Library) -> Vec<&str> {
        library.books().iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn empty_storage_loads_the_seed_without_writing_it() {
        let (library, slots) = library_with(MemorySlots::new());
        assert_eq!(library.origin(), &LoadOrigin::Seeded);
        assert_eq!(titles(&library), vec!["Mindset", "One Day"]);
        assert_eq!(slots.read(LIBRARY_SLOT).unwrap(), None);
    }

    #[test]
    fn malformed_storage_falls_back_to_the_seed() {
        let (library, _) = library_with(MemorySlots::with_slot(LIBRARY_SLOT, "{not json"));
        assert!(matches!(library.origin(), LoadOrigin::Recovered(_)));
        assert_eq!(titles(&library), vec!["Mindset", "One Day"]);
    }

    #[test]
    fn wrong_shape_counts_as_malformed() {
        let (library, _) = library_with(MemorySlots::with_slot(LIBRARY_SLOT, r#"{"title":"x"}"#));
        assert!(matches!(library.origin(), LoadOrigin::Recovered(_)));
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn stored_books_are_loaded_in_order() {
        let raw = r#"[
            {"title":"A","author":"x","pages":"1","read":true},
            {"title":"B","author":"y","pages":"2","read":false}
        ]"#;
        let (library, _) = library_with(MemorySlots::with_slot(LIBRARY_SLOT, raw));
        assert_eq!(library.origin(), &LoadOrigin::Stored);
        assert_eq!(titles(&library), vec!["A", "B"]);
        assert_eq!(library.read_count(), 1);
        assert_eq!(library.unread_count(), 1);
    }

    #[test]
    fn every_mutation_leaves_storage_equal_to_memory() {
        let (mut library, slots) = library_with(MemorySlots::new());

        let dune = library.add("Dune", "Frank Herbert", "412", false).unwrap();
        assert_eq!(stored_books(&slots), library.books());

        library.toggle_read(dune.id).unwrap();
        assert_eq!(stored_books(&slots), library.books());

        library.remove_at(0).unwrap();
        assert_eq!(stored_books(&slots), library.books());
        assert_eq!(library.len(), 2);
    }

    #[test]
    fn length_tracks_adds_minus_removes() {
        let (mut library, slots) = library_with(MemorySlots::new());
        let start = library.len();

        let mut ids = Vec::new();
        for n in 0..5 {
            ids.push(library.add(format!("Book {n}"), "Someone", "10", n % 2 == 0).unwrap().id);
        }
        library.toggle_read(ids[1]).unwrap();
        library.remove(ids[0]).unwrap();
        library.remove(ids[3]).unwrap();

        assert_eq!(library.len(), start + 5 - 2);
        assert_eq!(stored_books(&slots), library.books());
    }

    #[test]
    fn added_book_defaults_to_given_flag_and_goes_last() {
        let (mut library, _) = library_with(MemorySlots::new());
        let book = library.add("Dune", "Frank Herbert", "412", false).unwrap();
        assert_eq!(library.books().last(), Some(&book));
        assert!(!book.read);
        assert_eq!(library.index_of(book.id), Some(2));
    }

    #[test]
    fn double_toggle_is_identity() {
        let (mut library, _) = library_with(MemorySlots::new());
        let id = library.books()[1].id;
        assert!(library.toggle_read(id).unwrap());
        assert!(!library.toggle_read(id).unwrap());
        assert!(!library.get(id).unwrap().read);
    }

    #[test]
    fn removing_shifts_later_entries_only() {
        let (mut library, _) = library_with(MemorySlots::new());
        library.add("C", "c", "3", false).unwrap();
        library.add("D", "d", "4", true).unwrap();
        let before: Vec<Book> = library.books().to_vec();

        let removed = library.remove_at(1).unwrap();
        assert_eq!(removed, before[1]);
        assert_eq!(library.books()[0], before[0]);
        assert_eq!(library.books()[1], before[2]);
        assert_eq!(library.books()[2], before[3]);
    }

    #[test]
    fn stale_positions_and_ids_leave_the_store_untouched() {
        let (mut library, slots) = library_with(MemorySlots::new());
        let gone = library.books()[0].id;
        library.remove(gone).unwrap();
        let snapshot = library.books().to_vec();

        assert!(matches!(
            library.toggle_read_at(5),
            Err(LibraryError::IndexOutOfRange { index: 5, len: 1 })
        ));
        assert!(matches!(
            library.remove_at(1),
            Err(LibraryError::IndexOutOfRange { .. })
        ));
        assert!(matches!(
            library.toggle_read(gone),
            Err(LibraryError::UnknownBook(id)) if id == gone
        ));
        assert!(matches!(library.remove(gone), Err(LibraryError::UnknownBook(_))));

        assert_eq!(library.books(), snapshot.as_slice());
        assert_eq!(stored_books(&slots), snapshot);
    }

    #[test]
    fn failed_writes_roll_the_mutation_back() {
        let (mut library, slots) = library_with(MemorySlots::new());
        library.persist().unwrap();
        let snapshot = library.books().to_vec();
        slots.set_simulate_write_error(true);

        assert!(library.add("Dune", "Frank Herbert", "412", false).is_err());
        assert!(library.toggle_read_at(0).is_err());
        assert!(library.remove_at(1).is_err());

        assert_eq!(library.books(), snapshot.as_slice());
        assert_eq!(stored_books(&slots), snapshot);
    }

    #[test]
    fn persisted_state_round_trips_through_a_reload() {
        let (mut library, slots) = library_with(MemorySlots::new());
        library.add("Dune", "Frank Herbert", "412", false).unwrap();
        library.toggle_read_at(1).unwrap();
        let expected = library.books().to_vec();
        drop(library);

        let reloaded = Library::load(Box::new(SharedSlots(slots))).unwrap();
        assert_eq!(reloaded.origin(), &LoadOrigin::Stored);
        assert_eq!(reloaded.books(), expected.as_slice());
    }
}
