//! Display formatting for terminal output
//!
//! Provides utilities for formatting transactions, installment schedules and
//! invoice periods for terminal display.

pub mod cycle;
pub mod transaction;

pub use cycle::{format_period_details, format_period_table};
pub use transaction::{
    format_schedule, format_transaction_details, format_transaction_register,
    format_transaction_row,
};

use std::fmt::Write;

use chrono::NaiveDate;
use tabled::settings::Style;
use tabled::{Table, Tabled};

/// Render rows as a borderless table
pub(crate) fn render_table<T: Tabled>(rows: Vec<T>) -> String {
    let mut table = Table::new(rows);
    table.with(Style::psql());
    table.to_string()
}

/// Format a date with a strftime pattern, falling back to ISO when the pattern is invalid
pub(crate) fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut output = String::new();
    match write!(output, "{}", date.format(pattern)) {
        Ok(()) => output,
        Err(_) => date.format("%Y-%m-%d").to_string(),
    }
}

/// Truncate a string to a maximum number of characters
pub(crate) fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
