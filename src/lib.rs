//! # Libris - Library catalog and lending engine
//!
//! Manages a library's books, membership cards and loans on top of SQLite.
//!
//! Libris provides:
//! - A typed SQLite data store with parameter-checked statements and RAII transactions
//! - A search predicate builder that turns optional filters into bound parameters
//! - A lending engine whose borrow/return operations are atomic under concurrent access
//! - Thin catalog, card and manager services
//! - A CLI and an HTTP surface over the same library

pub mod book;
pub mod card;
pub mod loan;
pub mod search;
pub mod storage;
pub mod library;
pub mod server;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use book::{Book, BookColumn, BookInfo};
pub use card::{Card, CardInfo, CardType, Manager};
pub use loan::{BorrowOutcome, Loan};
pub use search::{BookQuery, Range, SearchPredicate, SortOrder};
pub use storage::{Executor, SqliteStore, StoreTransaction};
pub use library::{Library, LibraryOptions};

/// Result type alias for Libris operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for Libris operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    #[error("Statement expects {expected} parameters but {actual} were supplied")]
    ParameterCount { expected: usize, actual: usize },

    #[error("Book not found: {0}")]
    BookNotFound(i64),

    #[error("Card not found: {0}")]
    CardNotFound(i64),

    #[error("Card {0} still has books on loan")]
    CardHasLoans(i64),

    #[error("Card {card_id} already holds book {book_id}")]
    LoanConflict { card_id: i64, book_id: i64 },

    #[error("Invalid column: {0}")]
    InvalidColumn(String),

    #[error("Invalid card type: {0}")]
    InvalidCardType(String),

    #[error("Invalid date: {0}")]
    InvalidDate(String),
}

impl Error {
    /// A referenced book or card does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::BookNotFound(_) | Error::CardNotFound(_))
    }

    /// A borrow lost a race on the (book, card) uniqueness constraint.
    ///
    /// Callers should report this as a denied borrow rather than a system failure.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Error::LoanConflict { .. })
    }
}
