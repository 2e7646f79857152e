//! Amortization expander
//!
//! Expands one transaction into the installment entries that land on
//! successive invoice periods. Entries are derived on every query and never
//! stored, so the prorated share is computed here and nowhere else.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::{InvoicePeriod, Money, Transaction, TransactionId};

use super::calendar::{add_one_month, CivilClock};
use super::cycle::CycleResolver;

/// One installment of a transaction, assigned to an invoice period
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpandedEntry {
    pub source_transaction_id: TransactionId,
    /// 1-based position within the transaction's installments
    pub installment_index: u32,
    pub installment_count: u32,
    /// Civil date the installment is billed on
    pub date: NaiveDate,
    pub period: InvoicePeriod,
    /// Exact share of the transaction total (not yet rounded)
    pub prorated_amount: Money,
}

impl ExpandedEntry {
    /// Display label, suffixed with "(i/N)" for installment purchases
    pub fn label(&self, description: &str) -> String {
        if self.installment_count > 1 {
            format!(
                "{} ({}/{})",
                description, self.installment_index, self.installment_count
            )
        } else {
            description.to_string()
        }
    }
}

/// Iterator over `(installment_index, date)` for one transaction
///
/// Each date is one calendar month after the previous one, except that a
/// previous date inside the snap window jumps to the first new cycle day.
#[derive(Debug, Clone)]
pub struct InstallmentSchedule<'a> {
    resolver: CycleResolver<'a>,
    next_date: NaiveDate,
    index: u32,
    count: u32,
}

impl Iterator for InstallmentSchedule<'_> {
    type Item = (u32, NaiveDate);

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }

        self.index += 1;
        let date = self.next_date;

        self.next_date = if self.resolver.in_snap_window(date) {
            let snapped = self.resolver.settings().first_new_cycle_day();
            tracing::debug!(from = %date, to = %snapped, "installment snapped past transition");
            snapped
        } else {
            add_one_month(date)
        };

        Some((self.index, date))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.count - self.index) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for InstallmentSchedule<'_> {}

/// Expands transactions into period-assigned installment entries
#[derive(Debug, Clone, Copy)]
pub struct AmortizationExpander<'a> {
    resolver: CycleResolver<'a>,
    clock: CivilClock,
}

impl<'a> AmortizationExpander<'a> {
    pub fn new(resolver: CycleResolver<'a>, clock: CivilClock) -> Self {
        Self { resolver, clock }
    }

    /// Installment dates for a transaction, starting from its civil date
    ///
    /// Assumes the transaction passed the creation boundary checks; a zero
    /// installment count yields an empty schedule.
    pub fn schedule(&self, transaction: &Transaction) -> InstallmentSchedule<'a> {
        InstallmentSchedule {
            resolver: self.resolver,
            next_date: self.clock.date_of(&transaction.timestamp),
            index: 0,
            count: transaction.installment_count,
        }
    }

    /// Expand a transaction into one entry per installment, in order
    pub fn expand(&self, transaction: &Transaction) -> Vec<ExpandedEntry> {
        let count = transaction.installment_count;

        if count == 1 {
            let date = self.clock.date_of(&transaction.timestamp);
            return vec![ExpandedEntry {
                source_transaction_id: transaction.id,
                installment_index: 1,
                installment_count: 1,
                date,
                period: self.resolver.resolve_invoice_month(date),
                prorated_amount: transaction.amount,
            }];
        }

        let share = transaction.amount.divide(count);

        self.schedule(transaction)
            .map(|(installment_index, date)| ExpandedEntry {
                source_transaction_id: transaction.id,
                installment_index,
                installment_count: count,
                date,
                period: self.resolver.resolve_invoice_month(date),
                prorated_amount: share,
            })
            .collect()
    }
}
