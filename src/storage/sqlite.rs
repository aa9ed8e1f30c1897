//! SQLite storage implementation

use std::path::Path;
use std::time::Duration;
use rusqlite::types::{Type, Value};
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior, params_from_iter};
use chrono::{DateTime, Utc};
use crate::{Error, Result};
use crate::book::Book;
use crate::card::{Card, CardType};
use crate::loan::{Loan, parse_date};
use super::schema;

/// How long a connection waits on another connection's write lock
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Parameterized statement execution, shared by the store and its transactions.
///
/// Every call checks the statement's placeholder count against the supplied
/// parameters before anything is bound.
pub trait Executor {
    /// The connection statements run on
    fn connection(&self) -> &Connection;

    /// Run one mutation, returning the number of affected rows
    fn execute(&self, sql: &str, params: &[Value]) -> Result<usize> {
        let mut stmt = self.connection().prepare_cached(sql)?;
        check_parameter_count(stmt.parameter_count(), params)?;
        let affected = stmt.execute(params_from_iter(params))?;
        Ok(affected)
    }

    /// Run one query and map every row
    fn query<T, F>(&self, sql: &str, params: &[Value], map: F) -> Result<Vec<T>>
    where
        F: FnMut(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.connection().prepare_cached(sql)?;
        check_parameter_count(stmt.parameter_count(), params)?;
        let rows = stmt
            .query_map(params_from_iter(params), map)?
            .collect::<rusqlite::Result<Vec<T>>>()?;
        Ok(rows)
    }

    /// Run one query expected to yield at most one row
    fn query_optional<T, F>(&self, sql: &str, params: &[Value], map: F) -> Result<Option<T>>
    where
        F: FnOnce(&Row<'_>) -> rusqlite::Result<T>,
    {
        let mut stmt = self.connection().prepare_cached(sql)?;
        check_parameter_count(stmt.parameter_count(), params)?;
        let row = stmt.query_row(params_from_iter(params), map).optional()?;
        Ok(row)
    }
}

fn check_parameter_count(expected: usize, params: &[Value]) -> Result<()> {
    if expected != params.len() {
        return Err(Error::ParameterCount {
            expected,
            actual: params.len(),
        });
    }
    Ok(())
}

/// SQLite-backed store for the library.
///
/// One store owns one connection. Services hold a store for the lifetime of a
/// request (or of the process for the CLI) and close it explicitly.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open a database file (creates if doesn't exist)
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self { conn };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initialize the database schema
    fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    /// Begin an immediate transaction.
    ///
    /// The write lock is taken at `BEGIN`, so a second connection doing the same
    /// waits until this one commits or rolls back and then sees its writes.
    /// Dropping the guard without `commit` rolls back.
    pub fn transaction(&mut self) -> Result<StoreTransaction<'_>> {
        let tx = self.conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        Ok(StoreTransaction { tx })
    }

    /// Run `action` in a transaction: commit on `Ok`, roll back and propagate on `Err`
    pub fn with_transaction<T, F>(&mut self, action: F) -> Result<T>
    where
        F: FnOnce(&StoreTransaction<'_>) -> Result<T>,
    {
        let tx = self.transaction()?;
        match action(&tx) {
            Ok(value) => {
                tx.commit()?;
                Ok(value)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback() {
                    tracing::warn!("Rollback failed after {}: {}", e, rollback_err);
                }
                Err(e)
            }
        }
    }

    /// Release the connection
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Storage(e))
    }
}

impl Executor for SqliteStore {
    fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// An open immediate transaction
pub struct StoreTransaction<'a> {
    tx: Transaction<'a>,
}

impl StoreTransaction<'_> {
    /// Make every mutation in this transaction durable
    pub fn commit(self) -> Result<()> {
        self.tx.commit()?;
        Ok(())
    }

    /// Discard every mutation in this transaction
    pub fn rollback(self) -> Result<()> {
        self.tx.rollback()?;
        Ok(())
    }
}

impl Executor for StoreTransaction<'_> {
    fn connection(&self) -> &Connection {
        &self.tx
    }
}

// ========== Row Conversion ==========

/// Convert a row selected with `schema::BOOK_COLUMNS` to a Book
pub fn row_to_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        author: row.get(2)?,
        press: row.get(3)?,
        category: row.get(4)?,
        year: row.get(5)?,
        price: row.get(6)?,
        total: row.get(7)?,
        stock: row.get(8)?,
    })
}

/// Convert an `id, name, address, type` row to a Card
pub fn row_to_card(row: &Row<'_>) -> rusqlite::Result<Card> {
    let type_str: String = row.get(3)?;
    let card_type: CardType = type_str.parse().map_err(|e: Error| {
        rusqlite::Error::FromSqlConversionFailure(3, Type::Text, Box::new(e))
    })?;

    Ok(Card {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        card_type,
    })
}

/// Convert a `book_id, card_id, borrow_date, due_date, manager_id` row to a Loan
pub fn row_to_loan(row: &Row<'_>) -> rusqlite::Result<Loan> {
    Ok(Loan {
        book_id: row.get(0)?,
        card_id: row.get(1)?,
        borrow_date: date_column(row, 2)?,
        due_date: date_column(row, 3)?,
        manager_id: row.get(4)?,
    })
}

/// Read a nullable date column, e.g. the result of `MIN(due_date)`
pub fn optional_date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let text: Option<String> = row.get(idx)?;
    text.map(|t| {
        parse_date(&t).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
    })
    .transpose()
}

fn date_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let text: String = row.get(idx)?;
    parse_date(&text).map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn insert_book(store: &impl Executor, title: &str, total: i64) -> i64 {
        store
            .execute(
                "INSERT INTO book (title, author, press, category, year, price, total, stock) \
                 VALUES (?1, 'a', 'p', 'c', 2000, 10.0, ?2, ?2)",
                &[Value::Text(title.to_string()), Value::Integer(total)],
            )
            .unwrap();
        store.connection().last_insert_rowid()
    }

    fn stock(store: &impl Executor, id: i64) -> i64 {
        store
            .query_optional("SELECT stock FROM book WHERE id = ?1", &[Value::Integer(id)], |row| row.get(0))
            .unwrap()
            .unwrap()
    }

    #[test]
    fn test_query_maps_typed_rows() {
        let store = SqliteStore::open_in_memory().unwrap();
        let id = insert_book(&store, "Dune", 3);

        let sql = format!("SELECT {} FROM book WHERE id = ?1", schema::BOOK_COLUMNS);
        let books = store.query(&sql, &[Value::Integer(id)], row_to_book).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].title, "Dune");
        assert_eq!(books[0].stock, 3);
    }

    #[test]
    fn test_parameter_count_mismatch_is_rejected() {
        let store = SqliteStore::open_in_memory().unwrap();

        let err = store
            .execute("DELETE FROM book WHERE id = ?1 AND title = ?2", &[Value::Integer(1)])
            .unwrap_err();
        assert!(matches!(err, Error::ParameterCount { expected: 2, actual: 1 }));

        let err = store
            .query("SELECT id FROM book", &[Value::Integer(1)], |row| row.get::<_, i64>(0))
            .unwrap_err();
        assert!(matches!(err, Error::ParameterCount { expected: 0, actual: 1 }));
    }

    #[test]
    fn test_query_optional_none() {
        let store = SqliteStore::open_in_memory().unwrap();
        let missing: Option<i64> = store
            .query_optional("SELECT stock FROM book WHERE id = ?1", &[Value::Integer(42)], |row| row.get(0))
            .unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_dropped_transaction_rolls_back() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = insert_book(&store, "Dune", 3);

        {
            let tx = store.transaction().unwrap();
            tx.execute("UPDATE book SET stock = stock - 1 WHERE id = ?1", &[Value::Integer(id)]).unwrap();
        }

        assert_eq!(stock(&store, id), 3);
    }

    #[test]
    fn test_committed_transaction_persists() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = insert_book(&store, "Dune", 3);

        let tx = store.transaction().unwrap();
        tx.execute("UPDATE book SET stock = stock - 1 WHERE id = ?1", &[Value::Integer(id)]).unwrap();
        tx.commit().unwrap();

        assert_eq!(stock(&store, id), 2);
    }

    #[test]
    fn test_with_transaction_rolls_back_partial_work_on_error() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = insert_book(&store, "Dune", 1);

        let result: Result<()> = store.with_transaction(|tx| {
            tx.execute("UPDATE book SET stock = stock - 1 WHERE id = ?1", &[Value::Integer(id)])?;
            // stock is now 0; this violates the CHECK constraint
            tx.execute("UPDATE book SET stock = stock - 1 WHERE id = ?1", &[Value::Integer(id)])?;
            Ok(())
        });

        assert!(matches!(result, Err(Error::Storage(_))));
        assert_eq!(stock(&store, id), 1);
    }

    #[test]
    fn test_with_transaction_returns_value_on_commit() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let id = store
            .with_transaction(|tx| Ok(insert_book(tx, "Emma", 2)))
            .unwrap();
        assert_eq!(stock(&store, id), 2);
    }

    #[test]
    fn test_unknown_card_type_is_a_conversion_error() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .connection()
            .execute_batch(
                "PRAGMA ignore_check_constraints = ON; \
                 INSERT INTO card (name, address, type) VALUES ('x', NULL, 'Visitor');",
            )
            .unwrap();

        let result = store.query("SELECT id, name, address, type FROM card", &[], row_to_card);
        assert!(matches!(result, Err(Error::Storage(rusqlite::Error::FromSqlConversionFailure(3, _, _)))));
    }

    #[test]
    fn test_close() {
        let store = SqliteStore::open_in_memory().unwrap();
        store.close().unwrap();
    }
}
