use chrono::{DateTime, Utc};
use owo_colors::OwoColorize;
use crate::loan::{Loan, format_date};
use crate::ui::{theme, Icons};

pub fn header(icon: &str, text: &str) {
    println!("{} {}", icon, text.style(theme().header.clone()));
}

pub fn success(label: &str) {
    println!("{} {}", Icons::CHECK, label.style(theme().granted.clone()));
}

pub fn warn(label: &str) {
    eprintln!("{} {}", Icons::WARN, label.style(theme().warn.clone()));
}

pub fn error(message: &str) {
    eprintln!("{} {}", Icons::ERROR, message.style(theme().failure.clone()));
}

pub fn info(label: &str, value: &str) {
    println!(
        "{} {}: {}",
        Icons::INFO.style(theme().label.clone()),
        label.style(theme().label.clone()),
        value
    );
}

pub fn dim(text: &str) -> String {
    text.style(theme().label.clone()).to_string()
}

pub fn summary_row(label: &str, value: &str) {
    println!("  {} {}", label.style(theme().label.clone()), value);
}

/// Due date, flagged when it has passed at `now`
pub fn due_date(loan: &Loan, now: DateTime<Utc>) -> String {
    let date = format_date(&loan.due_date);
    if loan.is_overdue(now) {
        format!("{} {}", date.style(theme().overdue.clone()), "(overdue)".style(theme().overdue.clone()))
    } else {
        date.style(theme().due.clone()).to_string()
    }
}

/// Report a granted loan
pub fn granted(loan: &Loan) {
    success(&format!("Book {} lent to card {}", loan.book_id, loan.card_id));
    summary_row("Borrowed:", &format_date(&loan.borrow_date));
    summary_row("Due:", &format_date(&loan.due_date).style(theme().due.clone()).to_string());
}

/// Report a denied borrow and when a copy is expected back
pub fn denied(book_id: i64, estimated_available: Option<&DateTime<Utc>>) {
    warn(&format!("Book {} cannot be lent right now", book_id));
    match estimated_available {
        Some(date) => summary_row(
            "Earliest return:",
            &format_date(date).style(theme().due.clone()).to_string(),
        ),
        None => summary_row("Earliest return:", &dim("unknown")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    #[test]
    fn test_due_date_flags_overdue_loans() {
        let start = Utc.with_ymd_and_hms(2026, 10, 1, 9, 0, 0).unwrap();
        let loan = Loan::starting_at(1, 2, None, start, 30).unwrap();

        let on_time = due_date(&loan, start + TimeDelta::days(1));
        assert!(on_time.contains("2026-10-31T09:00:00Z"));
        assert!(!on_time.contains("overdue"));

        let late = due_date(&loan, start + TimeDelta::days(31));
        assert!(late.contains("2026-10-31T09:00:00Z"));
        assert!(late.contains("(overdue)"));
    }
}
