//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - book(id, title, author, press, category, year, price, total, stock)
//! - card(id, name, address, type)
//! - manager(id, name, password)
//! - borrow(book_id, card_id, borrow_date, due_date, manager_id)

pub mod schema;
pub mod sqlite;

pub use sqlite::{Executor, SqliteStore, StoreTransaction, row_to_book, row_to_card, row_to_loan};
