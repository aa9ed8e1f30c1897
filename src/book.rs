//! Book types - catalog entries and the columns they can be filtered or sorted by
//!
//! `BookColumn` is the only way a column name reaches SQL text. Everything
//! user-supplied travels as a bound parameter.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Columns of the `book` table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookColumn {
    Id,
    #[default]
    Title,
    Author,
    Press,
    Category,
    Year,
    Price,
    Total,
    Stock,
}

impl BookColumn {
    /// Get the SQL column name
    pub fn as_str(&self) -> &'static str {
        match self {
            BookColumn::Id => "id",
            BookColumn::Title => "title",
            BookColumn::Author => "author",
            BookColumn::Press => "press",
            BookColumn::Category => "category",
            BookColumn::Year => "year",
            BookColumn::Price => "price",
            BookColumn::Total => "total",
            BookColumn::Stock => "stock",
        }
    }

    /// Get all columns
    pub fn all() -> &'static [BookColumn] {
        &[
            BookColumn::Id,
            BookColumn::Title,
            BookColumn::Author,
            BookColumn::Press,
            BookColumn::Category,
            BookColumn::Year,
            BookColumn::Price,
            BookColumn::Total,
            BookColumn::Stock,
        ]
    }
}

impl FromStr for BookColumn {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        BookColumn::all()
            .iter()
            .copied()
            .find(|column| column.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::InvalidColumn(s.to_string()))
    }
}

impl std::fmt::Display for BookColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A catalog entry as stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub press: String,
    pub category: String,
    pub year: i64,
    pub price: f64,
    /// Copies owned by the library
    pub total: i64,
    /// Copies currently on the shelf
    pub stock: i64,
}

impl Book {
    /// Whether at least one copy can be lent right now
    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    /// Copies currently out on loan
    pub fn on_loan(&self) -> i64 {
        self.total - self.stock
    }
}

/// Information needed to add copies of a new title to the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookInfo {
    pub title: String,
    pub author: String,
    pub press: String,
    pub category: String,
    pub year: i64,
    pub price: f64,
    /// Number of copies; becomes both `total` and initial `stock`
    pub count: i64,
}
