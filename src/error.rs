use thiserror::Error;

use crate::models::BookId;

/// Rejections raised by the add-book form before the store is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Please fill in a title")]
    EmptyTitle,
    #[error("Please fill in an author")]
    EmptyAuthor,
}

#[derive(Debug, Error)]
pub enum LibraryError {
    #[error("No book at position {index}; the library holds {len}.")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Book {0} is no longer in the library.")]
    UnknownBook(BookId),

    #[error("Stored library could not be read: {0}")]
    StorageDeserialization(#[source] serde_json::Error),

    #[error("Library could not be serialized: {0}")]
    Serialization(#[source] serde_json::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type Result<T> = std::result::Result<T, LibraryError>;
