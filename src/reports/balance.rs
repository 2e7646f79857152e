//! Current-cycle balance
//!
//! How much has been billed in the open invoice period so far, and how that
//! compares with the month's cap when one is configured.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::CycleResult;
use crate::models::{DateRange, InvoicePeriod, Money, Transaction};
use crate::services::{daily_average, AccountingCore, EntryFilter};
use crate::storage::{HolidayCalendar, TransactionStore};

#[derive(Debug, Clone, Serialize)]
pub struct CycleBalance {
    pub period: InvoicePeriod,
    pub today: NaiveDate,
    /// Billed from the period start through today
    pub spent: Money,
    pub count: usize,
    pub days_elapsed: i64,
    pub days_remaining: i64,
    pub daily_average: Money,
    pub cap: Option<Money>,
    /// Cap minus spent, when a cap applies
    pub remaining: Option<Money>,
}

impl CycleBalance {
    /// Balance of the period containing `today`
    pub fn generate<S, H>(
        core: &AccountingCore<'_>,
        store: &S,
        holidays: &H,
        filter: &EntryFilter,
        today: NaiveDate,
    ) -> CycleResult<Self>
    where
        S: TransactionStore + ?Sized,
        H: HolidayCalendar + ?Sized,
    {
        let period = core.resolve_invoice_month(today);
        let elapsed = DateRange::spanning(period.start(), today);

        let transactions = store.read_all(Some(&elapsed))?;
        let aggregate = core.aggregate(
            &transactions,
            &elapsed,
            |t: &Transaction| filter.matches(t),
            None,
        );

        let cap = core
            .compute_cap(period.invoice_month, holidays)
            .map(|breakdown| breakdown.net_cap);

        Ok(Self {
            period,
            today,
            spent: aggregate.total,
            count: aggregate.count,
            days_elapsed: elapsed.duration_days(),
            days_remaining: (period.end() - today).num_days(),
            daily_average: daily_average(aggregate.total, &elapsed),
            cap,
            remaining: cap.map(|c| c - aggregate.total),
        })
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(symbol);
        let mut output = String::new();

        output.push_str(&format!(
            "Invoice {}: {}\n",
            self.period.invoice_month, self.period.range
        ));
        output.push_str(&format!(
            "Day {} of {} ({} left)\n",
            self.days_elapsed,
            self.period.duration_days(),
            self.days_remaining
        ));
        output.push_str(&format!(
            "Spent so far: {} in {} entries\n",
            money(self.spent),
            self.count
        ));
        output.push_str(&format!("Daily average: {}\n", money(self.daily_average)));

        if let (Some(cap), Some(remaining)) = (self.cap, self.remaining) {
            output.push_str(&format!("Cap: {}\n", money(cap)));
            output.push_str(&format!("Remaining: {}\n", money(remaining)));
        }

        output
    }
}
