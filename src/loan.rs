//! Loans and the result of a borrow attempt
//!
//! Dates are persisted as fixed-width RFC 3339 UTC text with second precision
//! ("2026-10-19T09:30:00Z"), so lexical order in SQL equals chronological order.

use crate::{Error, Result};
use chrono::{DateTime, SecondsFormat, SubsecRound, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// An open loan of one book to one card
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub book_id: i64,
    pub card_id: i64,
    pub borrow_date: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    /// Staff member who issued the loan
    pub manager_id: Option<i64>,
}

impl Loan {
    /// Build a loan starting at `now` that runs for `duration_days`.
    ///
    /// `now` is truncated to whole seconds so the value matches what the store keeps.
    pub fn starting_at(
        book_id: i64,
        card_id: i64,
        manager_id: Option<i64>,
        now: DateTime<Utc>,
        duration_days: i64,
    ) -> Result<Self> {
        let borrow_date = now.trunc_subsecs(0);
        let due_date = TimeDelta::try_days(duration_days)
            .and_then(|delta| borrow_date.checked_add_signed(delta))
            .ok_or_else(|| Error::InvalidDate(format!("{} + {} days", borrow_date, duration_days)))?;

        Ok(Self {
            book_id,
            card_id,
            borrow_date,
            due_date,
            manager_id,
        })
    }

    /// Whether the loan is past its due date at `now`
    pub fn is_overdue(&self, now: DateTime<Utc>) -> bool {
        now > self.due_date
    }
}

/// Result of a borrow attempt. Denial is a normal outcome, not an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "lowercase")]
pub enum BorrowOutcome {
    /// Stock was taken and the loan recorded
    Granted { loan: Loan },
    /// Nothing changed.
    ///
    /// `estimated_available` is the earliest due date among the book's open
    /// loans, or `None` when no loans exist.
    Denied { estimated_available: Option<DateTime<Utc>> },
}

impl BorrowOutcome {
    pub fn is_granted(&self) -> bool {
        matches!(self, BorrowOutcome::Granted { .. })
    }

    /// Earliest expected return for a denied borrow
    pub fn estimated_available(&self) -> Option<DateTime<Utc>> {
        match self {
            BorrowOutcome::Granted { .. } => None,
            BorrowOutcome::Denied { estimated_available } => *estimated_available,
        }
    }
}

/// Format a timestamp the way the store keeps it
pub fn format_date(date: &DateTime<Utc>) -> String {
    date.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Parse a stored timestamp
pub fn parse_date(text: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(text)
        .map(|date| date.with_timezone(&Utc))
        .map_err(|e| Error::InvalidDate(format!("{}: {}", text, e)))
}
