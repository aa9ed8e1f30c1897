//! Book search - filter criteria and ordering
//!
//! A `BookQuery` carries optional filters. `SearchPredicate` turns it into a
//! conjunctive WHERE clause of placeholders plus the values to bind.

pub mod predicate;

pub use predicate::SearchPredicate;

use crate::book::BookColumn;
use serde::{Deserialize, Serialize};

/// Inclusive bounds; either end may be open
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Range<T> {
    pub low: Option<T>,
    pub high: Option<T>,
}

impl<T> Range<T> {
    pub fn new(low: Option<T>, high: Option<T>) -> Self {
        Self { low, high }
    }

    pub fn at_least(low: T) -> Self {
        Self { low: Some(low), high: None }
    }

    pub fn at_most(high: T) -> Self {
        Self { low: None, high: Some(high) }
    }

    /// Build a range only when at least one bound is given
    pub fn from_bounds(low: Option<T>, high: Option<T>) -> Option<Self> {
        if low.is_none() && high.is_none() {
            None
        } else {
            Some(Self { low, high })
        }
    }
}

/// Filters for a catalog search. All supplied filters must match.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BookQuery {
    /// Substring of the title
    pub title: Option<String>,
    /// Substring of the author
    pub author: Option<String>,
    /// Substring of the press
    pub press: Option<String>,
    /// Substring of the category
    pub category: Option<String>,
    pub year: Option<Range<i64>>,
    pub price: Option<Range<f64>>,
}

impl BookQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn author(mut self, author: impl Into<String>) -> Self {
        self.author = Some(author.into());
        self
    }

    pub fn press(mut self, press: impl Into<String>) -> Self {
        self.press = Some(press.into());
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn year(mut self, range: Range<i64>) -> Self {
        self.year = Some(range);
        self
    }

    pub fn price(mut self, range: Range<f64>) -> Self {
        self.price = Some(range);
        self
    }
}

/// Direction of a sorted search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }

    pub fn from_descending(descending: bool) -> Self {
        if descending {
            SortOrder::Descending
        } else {
            SortOrder::Ascending
        }
    }
}

/// ` ORDER BY <column> <direction>`; the column can only come from `BookColumn`
pub fn order_clause(column: BookColumn, order: SortOrder) -> String {
    format!(" ORDER BY {} {}", column.as_str(), order.as_sql())
}
