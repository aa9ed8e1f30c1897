//! Library service - catalog, cards, managers and lending over one store
//!
//! `Library` owns its `SqliteStore`. The lending engine lives in `lending`;
//! this module holds the thin single-statement services around it.

pub mod lending;

use rusqlite::types::Value;
use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::book::{Book, BookColumn, BookInfo};
use crate::card::{Card, CardInfo, Manager};
use crate::search::{self, BookQuery, SearchPredicate, SortOrder};
use crate::storage::schema::BOOK_COLUMNS;
use crate::storage::{Executor, SqliteStore, row_to_book, row_to_card};

/// Days between borrow date and due date when nothing else is configured
pub const DEFAULT_LOAN_DURATION_DAYS: i64 = 60;

/// Tunables for the lending engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryOptions {
    pub loan_duration_days: i64,
}

impl Default for LibraryOptions {
    fn default() -> Self {
        Self {
            loan_duration_days: DEFAULT_LOAN_DURATION_DAYS,
        }
    }
}

/// The library: one store handle plus lending options
pub struct Library {
    store: SqliteStore,
    options: LibraryOptions,
}

impl Library {
    /// Create a library over an open store
    pub fn new(store: SqliteStore, options: LibraryOptions) -> Self {
        Self { store, options }
    }

    /// Release the underlying connection
    pub fn close(self) -> Result<()> {
        self.store.close()
    }

    // ========== Managers ==========

    /// Register a staff member, returning its id
    pub fn add_manager(&self, name: &str, password: &str) -> Result<i64> {
        self.store.execute(
            "INSERT INTO manager (name, password) VALUES (?1, ?2)",
            &[Value::Text(name.to_string()), Value::Text(password.to_string())],
        )?;
        Ok(self.store.connection().last_insert_rowid())
    }

    /// Look up a manager by credentials
    pub fn authenticate_manager(&self, name: &str, password: &str) -> Result<Option<Manager>> {
        self.store.query_optional(
            "SELECT id, name FROM manager WHERE name = ?1 AND password = ?2",
            &[Value::Text(name.to_string()), Value::Text(password.to_string())],
            |row| {
                Ok(Manager {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
    }

    // ========== Catalog ==========

    /// Add new titles; all or none are inserted. Returns the new ids in input order.
    pub fn add_books(&mut self, books: &[BookInfo]) -> Result<Vec<i64>> {
        let ids = self.store.with_transaction(|tx| {
            let mut ids = Vec::with_capacity(books.len());
            for book in books {
                tx.execute(
                    r#"
                    INSERT INTO book (title, author, press, category, year, price, total, stock)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
                    "#,
                    &[
                        Value::Text(book.title.clone()),
                        Value::Text(book.author.clone()),
                        Value::Text(book.press.clone()),
                        Value::Text(book.category.clone()),
                        Value::Integer(book.year),
                        Value::Real(book.price),
                        Value::Integer(book.count),
                    ],
                )?;
                ids.push(tx.connection().last_insert_rowid());
            }
            Ok(ids)
        })?;

        tracing::info!("Added {} book(s) to the catalog", ids.len());
        Ok(ids)
    }

    /// Get a book by id
    pub fn book(&self, book_id: i64) -> Result<Option<Book>> {
        let sql = format!("SELECT {} FROM book WHERE id = ?1", BOOK_COLUMNS);
        self.store.query_optional(&sql, &[Value::Integer(book_id)], row_to_book)
    }

    pub fn book_exists(&self, book_id: i64) -> Result<bool> {
        exists(&self.store, "SELECT EXISTS(SELECT 1 FROM book WHERE id = ?1)", book_id)
    }

    /// Search the catalog. An empty query returns every book.
    pub fn search_books(&self, query: &BookQuery, sort: BookColumn, order: SortOrder) -> Result<Vec<Book>> {
        let predicate = SearchPredicate::build(query);
        tracing::debug!("Book filters: {:?}", predicate.conditions());

        let (clause, params) = predicate.into_parts();
        let sql = format!(
            "SELECT {} FROM book{}{}",
            BOOK_COLUMNS,
            clause,
            search::order_clause(sort, order)
        );
        tracing::debug!("Searching books: {} ({} params)", sql, params.len());
        self.store.query(&sql, &params, row_to_book)
    }

    // ========== Cards ==========

    /// Issue a card, returning its id
    pub fn add_card(&self, card: &CardInfo) -> Result<i64> {
        self.store.execute(
            "INSERT INTO card (name, address, type) VALUES (?1, ?2, ?3)",
            &[
                Value::Text(card.name.clone()),
                card.address.clone().map_or(Value::Null, Value::Text),
                Value::Text(card.card_type.as_str().to_string()),
            ],
        )?;
        let id = self.store.connection().last_insert_rowid();
        tracing::info!("Issued {} card {} to {}", card.card_type, id, card.name);
        Ok(id)
    }

    /// Remove a card. Returns false if no such card exists.
    ///
    /// A card with books still on loan cannot be removed.
    pub fn delete_card(&mut self, card_id: i64) -> Result<bool> {
        self.store.with_transaction(|tx| {
            if exists(tx, "SELECT EXISTS(SELECT 1 FROM borrow WHERE card_id = ?1)", card_id)? {
                return Err(Error::CardHasLoans(card_id));
            }
            let removed = tx.execute("DELETE FROM card WHERE id = ?1", &[Value::Integer(card_id)])?;
            Ok(removed > 0)
        })
    }

    pub fn card_exists(&self, card_id: i64) -> Result<bool> {
        exists(&self.store, "SELECT EXISTS(SELECT 1 FROM card WHERE id = ?1)", card_id)
    }

    /// All cards ordered by id
    pub fn list_cards(&self) -> Result<Vec<Card>> {
        self.store.query("SELECT id, name, address, type FROM card ORDER BY id", &[], row_to_card)
    }
}

/// Evaluate a `SELECT EXISTS(...)` keyed by one id
pub(crate) fn exists(executor: &impl Executor, sql: &str, id: i64) -> Result<bool> {
    let found = executor.query_optional(sql, &[Value::Integer(id)], |row| row.get::<_, bool>(0))?;
    Ok(found.unwrap_or(false))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::card::CardType;
    use crate::search::Range;

    pub(crate) fn book_info(title: &str, price: f64, year: i64, count: i64) -> BookInfo {
        BookInfo {
            title: title.to_string(),
            author: format!("Author of {}", title),
            press: "Test Press".to_string(),
            category: "Fiction".to_string(),
            year,
            price,
            count,
        }
    }

    pub(crate) fn student(name: &str) -> CardInfo {
        CardInfo {
            name: name.to_string(),
            address: None,
            card_type: CardType::Student,
        }
    }

    pub(crate) fn library() -> Library {
        Library::new(SqliteStore::open_in_memory().unwrap(), LibraryOptions::default())
    }

    fn titles(books: &[Book]) -> Vec<&str> {
        books.iter().map(|b| b.title.as_str()).collect()
    }

    #[test]
    fn test_add_books_sets_stock_to_total() {
        let mut lib = library();
        let ids = lib.add_books(&[book_info("Dune", 12.5, 1965, 3)]).unwrap();

        let book = lib.book(ids[0]).unwrap().unwrap();
        assert_eq!(book.total, 3);
        assert_eq!(book.stock, 3);
        assert!(lib.book_exists(ids[0]).unwrap());
        assert!(!lib.book_exists(ids[0] + 100).unwrap());
    }

    #[test]
    fn test_add_books_is_all_or_nothing() {
        let mut lib = library();
        let bad = book_info("Broken", 1.0, 2000, -1);

        let result = lib.add_books(&[book_info("Good", 1.0, 2000, 1), bad]);
        assert!(result.is_err());
        assert!(lib.search_books(&BookQuery::new(), BookColumn::Title, SortOrder::Ascending).unwrap().is_empty());
    }

    #[test]
    fn test_search_without_filters_sorts_by_title() {
        let mut lib = library();
        lib.add_books(&[
            book_info("Walden", 8.0, 1854, 1),
            book_info("Emma", 9.0, 1815, 1),
            book_info("Hamlet", 5.0, 1603, 1),
        ])
        .unwrap();

        let books = lib.search_books(&BookQuery::new(), BookColumn::default(), SortOrder::default()).unwrap();
        assert_eq!(titles(&books), vec!["Emma", "Hamlet", "Walden"]);

        let books = lib.search_books(&BookQuery::new(), BookColumn::Year, SortOrder::Descending).unwrap();
        assert_eq!(titles(&books), vec!["Walden", "Emma", "Hamlet"]);
    }

    #[test]
    fn test_search_title_and_max_price() {
        let mut lib = library();
        lib.add_books(&[
            book_info("Hamlet", 5.0, 1603, 1),
            book_info("The Hobbit", 25.0, 1937, 1),
            book_info("Hyperion", 20.0, 1989, 1),
            book_info("Emma", 9.0, 1815, 1),
        ])
        .unwrap();

        let query = BookQuery::new().title("H").price(Range::at_most(20.0));
        let books = lib.search_books(&query, BookColumn::Title, SortOrder::Ascending).unwrap();
        assert_eq!(titles(&books), vec!["Hamlet", "Hyperion"]);
    }

    #[test]
    fn test_search_year_range() {
        let mut lib = library();
        lib.add_books(&[
            book_info("A", 1.0, 1990, 1),
            book_info("B", 1.0, 2000, 1),
            book_info("C", 1.0, 2010, 1),
        ])
        .unwrap();

        let query = BookQuery::new().year(Range::new(Some(1995), Some(2010)));
        let books = lib.search_books(&query, BookColumn::Year, SortOrder::Ascending).unwrap();
        assert_eq!(titles(&books), vec!["B", "C"]);
    }

    #[test]
    fn test_manager_authentication() {
        let lib = library();
        let id = lib.add_manager("cobalt", "12345678").unwrap();

        let manager = lib.authenticate_manager("cobalt", "12345678").unwrap().unwrap();
        assert_eq!(manager.id, id);
        assert!(lib.authenticate_manager("cobalt", "wrong").unwrap().is_none());
    }

    #[test]
    fn test_card_lifecycle() {
        let mut lib = library();
        let id = lib.add_card(&student("Ada")).unwrap();

        assert!(lib.card_exists(id).unwrap());
        let cards = lib.list_cards().unwrap();
        assert_eq!(cards.len(), 1);
        assert_eq!(cards[0].card_type, CardType::Student);

        assert!(lib.delete_card(id).unwrap());
        assert!(!lib.delete_card(id).unwrap());
        assert!(!lib.card_exists(id).unwrap());
    }
}
