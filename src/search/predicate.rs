//! Search predicate builder
//!
//! Translates a `BookQuery` into a conjunctive predicate:
//! - substring filters become `instr(<column>, ?N) > 0`
//! - each present range bound becomes `<column> >= ?N` or `<column> <= ?N`
//!
//! Column names come from `BookColumn`; filter values are only ever bound.
//! Empty strings, zero and NaN count as "not supplied" and add nothing.

use rusqlite::types::Value;
use crate::book::BookColumn;
use super::{BookQuery, Range};

/// A filter value that may be treated as absent
trait FilterValue {
    fn is_supplied(&self) -> bool;
    fn to_value(&self) -> Value;
}

impl FilterValue for String {
    fn is_supplied(&self) -> bool {
        !self.is_empty()
    }

    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FilterValue for i64 {
    fn is_supplied(&self) -> bool {
        *self != 0
    }

    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl FilterValue for f64 {
    fn is_supplied(&self) -> bool {
        *self != 0.0 && !self.is_nan()
    }

    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

/// Parameterized WHERE fragment and its bound values, in placeholder order
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SearchPredicate {
    conditions: Vec<String>,
    params: Vec<Value>,
}

impl SearchPredicate {
    /// Build the predicate for a query
    pub fn build(query: &BookQuery) -> Self {
        let mut predicate = Self::default();

        predicate.contains(BookColumn::Title, query.title.as_ref());
        predicate.contains(BookColumn::Author, query.author.as_ref());
        predicate.contains(BookColumn::Press, query.press.as_ref());
        predicate.contains(BookColumn::Category, query.category.as_ref());

        predicate.within(BookColumn::Price, query.price.as_ref());
        predicate.within(BookColumn::Year, query.year.as_ref());

        predicate
    }

    /// No filters were supplied
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Individual conditions, e.g. `price <= ?2`
    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    /// Values matching the placeholders, in order
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// ` WHERE a AND b`, or an empty string when there are no conditions
    pub fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", self.conditions.join(" AND "))
        }
    }

    /// Split into clause text and parameters
    pub fn into_parts(self) -> (String, Vec<Value>) {
        let clause = self.where_clause();
        (clause, self.params)
    }

    fn contains(&mut self, column: BookColumn, needle: Option<&String>) {
        if let Some(needle) = needle.filter(|n| n.is_supplied()) {
            let placeholder = self.bind(needle.to_value());
            self.conditions.push(format!("instr({}, {}) > 0", column.as_str(), placeholder));
        }
    }

    fn within<T: FilterValue>(&mut self, column: BookColumn, range: Option<&Range<T>>) {
        let Some(range) = range else {
            return;
        };

        if let Some(low) = range.low.as_ref().filter(|v| v.is_supplied()) {
            let placeholder = self.bind(low.to_value());
            self.conditions.push(format!("{} >= {}", column.as_str(), placeholder));
        }
        if let Some(high) = range.high.as_ref().filter(|v| v.is_supplied()) {
            let placeholder = self.bind(high.to_value());
            self.conditions.push(format!("{} <= {}", column.as_str(), placeholder));
        }
    }

    /// Bind a value and return its numbered placeholder
    fn bind(&mut self, value: Value) -> String {
        self.params.push(value);
        format!("?{}", self.params.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_filters_is_empty() {
        let predicate = SearchPredicate::build(&BookQuery::new());
        assert!(predicate.is_empty());
        assert_eq!(predicate.where_clause(), "");
        assert!(predicate.params().is_empty());
    }

    #[test]
    fn test_title_and_upper_price() {
        let query = BookQuery::new().title("H").price(Range::at_most(20.0));
        let (clause, params) = SearchPredicate::build(&query).into_parts();

        assert_eq!(clause, " WHERE instr(title, ?1) > 0 AND price <= ?2");
        assert_eq!(params, vec![Value::Text("H".into()), Value::Real(20.0)]);
    }

    #[test]
    fn test_every_filter_in_placeholder_order() {
        let query = BookQuery::new()
            .title("Rust")
            .author("Klabnik")
            .press("No Starch")
            .category("Programming")
            .price(Range::new(Some(10.0), Some(50.0)))
            .year(Range::new(Some(2015), Some(2023)));
        let predicate = SearchPredicate::build(&query);

        assert_eq!(
            predicate.conditions(),
            &[
                "instr(title, ?1) > 0",
                "instr(author, ?2) > 0",
                "instr(press, ?3) > 0",
                "instr(category, ?4) > 0",
                "price >= ?5",
                "price <= ?6",
                "year >= ?7",
                "year <= ?8",
            ]
        );
        assert_eq!(predicate.params().len(), 8);
        assert_eq!(predicate.params()[6], Value::Integer(2015));
    }

    #[test]
    fn test_values_never_reach_the_clause_text() {
        let hostile = "x') OR 1=1; DROP TABLE book; --";
        let predicate = SearchPredicate::build(&BookQuery::new().author(hostile));

        assert!(!predicate.where_clause().contains(hostile));
        assert_eq!(predicate.params(), &[Value::Text(hostile.to_string())]);
    }

    #[test]
    fn test_empty_and_zero_values_count_as_absent() {
        let query = BookQuery::new()
            .title("")
            .price(Range::new(Some(0.0), Some(f64::NAN)))
            .year(Range::new(Some(0), Some(1999)));
        let predicate = SearchPredicate::build(&query);

        assert_eq!(predicate.conditions(), &["year <= ?1"]);
        assert_eq!(predicate.params(), &[Value::Integer(1999)]);
    }

    #[test]
    fn test_each_bound_is_independent() {
        let predicate = SearchPredicate::build(&BookQuery::new().year(Range::at_least(1990)));
        assert_eq!(predicate.where_clause(), " WHERE year >= ?1");
    }
}
