//! Lending engine
//!
//! Per (card, book) pair a loan is either absent or open:
//! - borrow: absent -> open, guarded by stock > 0 and no open loan for the pair
//! - return: open -> absent, guarded by the loan existing
//!
//! Both transitions run inside one immediate transaction, so the stock
//! decrement/increment and the loan insert/delete apply together or not at all,
//! and concurrent borrowers of the last copy are serialized by the store.

use chrono::{DateTime, Utc};
use rusqlite::ErrorCode;
use rusqlite::types::Value;
use crate::{Error, Result};
use crate::book::Book;
use crate::loan::{BorrowOutcome, Loan, format_date};
use crate::storage::schema::BOOK_COLUMNS;
use crate::storage::sqlite::optional_date_column;
use crate::storage::{Executor, StoreTransaction, row_to_book, row_to_loan};
use super::{Library, exists};

const LOAN_COLUMNS: &str = "book_id, card_id, borrow_date, due_date, manager_id";

impl Library {
    /// Lend `book_id` to `card_id` on behalf of `manager_id`, starting now
    pub fn borrow_book(&mut self, card_id: i64, book_id: i64, manager_id: i64) -> Result<BorrowOutcome> {
        self.borrow_book_at(card_id, book_id, manager_id, Utc::now())
    }

    /// Lend `book_id` to `card_id` with an explicit borrow time.
    ///
    /// Denied when no copy is on the shelf or the card already holds the book;
    /// a denial writes nothing. A missing book or card is an error.
    pub fn borrow_book_at(
        &mut self,
        card_id: i64,
        book_id: i64,
        manager_id: i64,
        now: DateTime<Utc>,
    ) -> Result<BorrowOutcome> {
        let loan = Loan::starting_at(book_id, card_id, Some(manager_id), now, self.options.loan_duration_days)?;
        let tx = self.store.transaction()?;

        let stock = current_stock(&tx, book_id)?.ok_or(Error::BookNotFound(book_id))?;
        if !exists(&tx, "SELECT EXISTS(SELECT 1 FROM card WHERE id = ?1)", card_id)? {
            return Err(Error::CardNotFound(card_id));
        }
        let already_borrowed = has_open_loan(&tx, card_id, book_id)?;

        if stock <= 0 || already_borrowed {
            tracing::debug!(
                "Borrow denied: card {} book {} (stock {}, already borrowed: {})",
                card_id,
                book_id,
                stock,
                already_borrowed
            );
            return deny(tx, book_id);
        }

        let taken = tx.execute(
            "UPDATE book SET stock = stock - 1 WHERE id = ?1 AND stock > 0",
            &[Value::Integer(book_id)],
        )?;
        if taken == 0 {
            tracing::warn!("Stock of book {} was not decremented; denying borrow by card {}", book_id, card_id);
            return deny(tx, book_id);
        }
        tx.execute(
            &format!("INSERT INTO borrow ({}) VALUES (?1, ?2, ?3, ?4, ?5)", LOAN_COLUMNS),
            &[
                Value::Integer(loan.book_id),
                Value::Integer(loan.card_id),
                Value::Text(format_date(&loan.borrow_date)),
                Value::Text(format_date(&loan.due_date)),
                loan.manager_id.map_or(Value::Null, Value::Integer),
            ],
        )
        .map_err(|e| conflict_or(e, card_id, book_id))?;
        tx.commit()?;

        tracing::info!(
            "Lent book {} to card {} (manager {}), due {}",
            book_id,
            card_id,
            manager_id,
            format_date(&loan.due_date)
        );
        Ok(BorrowOutcome::Granted { loan })
    }

    /// Take back `book_id` from `card_id`.
    ///
    /// Returns false, changing nothing, when the card does not hold the book.
    pub fn return_book(&mut self, card_id: i64, book_id: i64) -> Result<bool> {
        let tx = self.store.transaction()?;

        if !has_open_loan(&tx, card_id, book_id)? {
            return Ok(false);
        }

        let restocked = tx.execute(
            "UPDATE book SET stock = stock + 1 WHERE id = ?1",
            &[Value::Integer(book_id)],
        )?;
        if restocked == 0 {
            return Err(Error::BookNotFound(book_id));
        }
        tx.execute(
            "DELETE FROM borrow WHERE book_id = ?1 AND card_id = ?2",
            &[Value::Integer(book_id), Value::Integer(card_id)],
        )?;
        tx.commit()?;

        tracing::info!("Card {} returned book {}", card_id, book_id);
        Ok(true)
    }

    /// Whether `card_id` currently holds `book_id`
    pub fn is_borrowed(&self, card_id: i64, book_id: i64) -> Result<bool> {
        has_open_loan(&self.store, card_id, book_id)
    }

    /// The open loan for a pair, if any
    pub fn loan(&self, card_id: i64, book_id: i64) -> Result<Option<Loan>> {
        self.store.query_optional(
            &format!("SELECT {} FROM borrow WHERE book_id = ?1 AND card_id = ?2", LOAN_COLUMNS),
            &[Value::Integer(book_id), Value::Integer(card_id)],
            row_to_loan,
        )
    }

    /// Open loans of one book, soonest due first
    pub fn loans_for_book(&self, book_id: i64) -> Result<Vec<Loan>> {
        self.store.query(
            &format!("SELECT {} FROM borrow WHERE book_id = ?1 ORDER BY due_date, card_id", LOAN_COLUMNS),
            &[Value::Integer(book_id)],
            row_to_loan,
        )
    }

    /// Books currently held by a card, ordered by title
    pub fn borrowed_books(&self, card_id: i64) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {} FROM book WHERE id IN (SELECT book_id FROM borrow WHERE card_id = ?1) ORDER BY title",
            BOOK_COLUMNS
        );
        self.store.query(&sql, &[Value::Integer(card_id)], row_to_book)
    }
}

fn current_stock(executor: &impl Executor, book_id: i64) -> Result<Option<i64>> {
    executor.query_optional(
        "SELECT stock FROM book WHERE id = ?1",
        &[Value::Integer(book_id)],
        |row| row.get(0),
    )
}

fn has_open_loan(executor: &impl Executor, card_id: i64, book_id: i64) -> Result<bool> {
    let found = executor.query_optional(
        "SELECT EXISTS(SELECT 1 FROM borrow WHERE card_id = ?1 AND book_id = ?2)",
        &[Value::Integer(card_id), Value::Integer(book_id)],
        |row| row.get::<_, bool>(0),
    )?;
    Ok(found.unwrap_or(false))
}

/// Soonest due date among a book's open loans; `None` when it has none
fn earliest_due_date(executor: &impl Executor, book_id: i64) -> Result<Option<DateTime<Utc>>> {
    let earliest = executor.query_optional(
        "SELECT MIN(due_date) FROM borrow WHERE book_id = ?1",
        &[Value::Integer(book_id)],
        |row| optional_date_column(row, 0),
    )?;
    Ok(earliest.flatten())
}

/// Roll back a borrow attempt and report when a copy is expected back
fn deny(tx: StoreTransaction<'_>, book_id: i64) -> Result<BorrowOutcome> {
    let estimated_available = earliest_due_date(&tx, book_id)?;
    tx.rollback()?;

    if estimated_available.is_none() {
        tracing::warn!("Book {} cannot be lent but has no open loans", book_id);
    }
    Ok(BorrowOutcome::Denied { estimated_available })
}

/// A constraint failure on the loan insert means another borrow won the pair
fn conflict_or(err: Error, card_id: i64, book_id: i64) -> Error {
    if let Error::Storage(e) = &err {
        if e.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) {
            return Error::LoanConflict { card_id, book_id };
        }
    }
    err
}
