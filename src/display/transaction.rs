//! Transaction display formatting
//!
//! Register views of stored transactions and the installment schedule a
//! purchase expands into.

use tabled::Tabled;

use crate::models::Transaction;
use crate::services::{CivilClock, ExpandedEntry};

use super::{format_date, render_table, truncate};

#[derive(Tabled)]
struct RegisterRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Description")]
    description: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Method")]
    method: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

#[derive(Tabled)]
struct ScheduleRow {
    #[tabled(rename = "#")]
    index: String,
    #[tabled(rename = "Date")]
    date: String,
    #[tabled(rename = "Invoice")]
    invoice_month: String,
    #[tabled(rename = "Period")]
    period: String,
    #[tabled(rename = "Amount")]
    amount: String,
}

/// Format a single transaction for display (register row)
pub fn format_transaction_row(
    txn: &Transaction,
    clock: &CivilClock,
    date_format: &str,
    symbol: &str,
) -> String {
    let installments = if txn.is_installment() {
        format!(" [{}x]", txn.installment_count)
    } else {
        String::new()
    };

    format!(
        "{} {} {:20} {:>14}{}",
        txn.id,
        format_date(clock.date_of(&txn.timestamp), date_format),
        truncate(&txn.description, 20),
        txn.amount.format_with_symbol(symbol),
        installments
    )
}

/// Format a list of transactions as a register
pub fn format_transaction_register(
    transactions: &[Transaction],
    clock: &CivilClock,
    date_format: &str,
    symbol: &str,
) -> String {
    if transactions.is_empty() {
        return "No transactions found.\n".to_string();
    }

    let rows = transactions
        .iter()
        .map(|txn| {
            let mut amount = txn.amount.format_with_symbol(symbol);
            if txn.is_installment() {
                amount.push_str(&format!(" in {}x", txn.installment_count));
            }
            RegisterRow {
                id: txn.id.to_string(),
                date: format_date(clock.date_of(&txn.timestamp), date_format),
                description: truncate(&txn.description, 28),
                category: truncate(&txn.category, 16),
                method: truncate(&txn.method, 12),
                amount,
            }
        })
        .collect();

    let mut output = render_table(rows);
    output.push('\n');
    output
}

/// Format transaction details for display
pub fn format_transaction_details(
    txn: &Transaction,
    clock: &CivilClock,
    date_format: &str,
    symbol: &str,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("Transaction: {}\n", txn.id));
    output.push_str(&format!(
        "Date:        {}\n",
        format_date(clock.date_of(&txn.timestamp), date_format)
    ));
    output.push_str(&format!("Amount:      {}\n", txn.amount.format_with_symbol(symbol)));

    if txn.is_installment() {
        output.push_str(&format!("Installments: {}\n", txn.installment_count));
    }
    if txn.is_refund() {
        output.push_str("Type:        Refund\n");
    }

    output.push_str(&format!("Description: {}\n", txn.description));
    output.push_str(&format!("Category:    {}\n", txn.category));
    if !txn.tag.is_empty() {
        output.push_str(&format!("Tag:         {}\n", txn.tag));
    }
    output.push_str(&format!("Method:      {}\n", txn.method));

    output
}

/// Format the installment entries of one transaction
pub fn format_schedule(txn: &Transaction, entries: &[ExpandedEntry], symbol: &str) -> String {
    let mut output = format!("{} ({})\n", txn.description, txn.id);

    let rows = entries
        .iter()
        .map(|entry| ScheduleRow {
            index: format!("{}/{}", entry.installment_index, entry.installment_count),
            date: entry.date.format("%Y-%m-%d").to_string(),
            invoice_month: entry.period.invoice_month.to_string(),
            period: entry.period.range.to_string(),
            amount: entry.prorated_amount.format_with_symbol(symbol),
        })
        .collect();

    output.push_str(&render_table(rows));
    output.push('\n');
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::Money;
    use crate::services::AccountingCore;
    use chrono::{FixedOffset, NaiveDate, NaiveTime};

    fn clock() -> CivilClock {
        CivilClock::new(FixedOffset::west_opt(3 * 3600).unwrap())
    }

    fn purchase() -> Transaction {
        let at = clock().instant_at(
            NaiveDate::from_ymd_opt(2025, 9, 10).unwrap(),
            NaiveTime::from_hms_opt(23, 30, 0).unwrap(),
        );
        Transaction::new(at, Money::from_cents(60000), "Notebook")
            .with_installments(3)
            .with_metadata("Eletrônicos", "Pessoal", "Crédito")
    }

    #[test]
    fn test_row_uses_civil_date() {
        // 23:30 at UTC-3 is already the next day in UTC
        let row = format_transaction_row(&purchase(), &clock(), "%Y-%m-%d", "R$");
        assert!(row.contains("2025-09-10"));
        assert!(row.contains("R$ 600.00"));
        assert!(row.ends_with("[3x]"));
    }

    #[test]
    fn test_row_shows_evening_purchase_on_its_civil_day() {
        // 22:30 at UTC-3 is 01:30 UTC, inside the next invoice window
        let at = clock().instant_at(
            NaiveDate::from_ymd_opt(2025, 10, 3).unwrap(),
            NaiveTime::from_hms_opt(22, 30, 0).unwrap(),
        );
        let txn = Transaction::new(at, Money::from_cents(1000), "Jantar")
            .with_metadata("Alimentação", "", "Pix");

        let row = format_transaction_row(&txn, &clock(), "%Y-%m-%d", "R$");
        assert!(row.contains("2025-10-03"));
        assert!(!row.contains("2025-10-04"));
    }

    #[test]
    fn test_register() {
        let empty = format_transaction_register(&[], &clock(), "%Y-%m-%d", "R$");
        assert_eq!(empty, "No transactions found.\n");

        let txn = purchase();
        let output =
            format_transaction_register(std::slice::from_ref(&txn), &clock(), "%d/%m/%Y", "R$");
        assert!(output.contains("Description"));
        assert!(output.contains("10/09/2025"));
        assert!(output.contains(&txn.id.to_string()));
        assert!(output.contains("R$ 600.00 in 3x"));
    }

    #[test]
    fn test_details() {
        let output = format_transaction_details(&purchase(), &clock(), "%d.%m.%Y", "R$");
        assert!(output.contains("Date:        10.09.2025"));
        assert!(output.contains("Installments: 3"));
        assert!(output.contains("Category:    Eletrônicos"));
        assert!(output.contains("Method:      Crédito"));
        assert!(!output.contains("Refund"));
    }

    #[test]
    fn test_schedule_lists_each_installment() {
        let settings = Settings::default();
        let core = AccountingCore::with_clock(&settings, clock());
        let txn = purchase();
        let entries = core.expand(&txn);

        let output = format_schedule(&txn, &entries, "R$");
        assert!(output.contains("1/3"));
        assert!(output.contains("3/3"));
        assert!(output.contains("2025-11-17"));
        assert!(output.contains("R$ 200.00"));
    }
}
