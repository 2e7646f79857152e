//! Invoice summary report
//!
//! Totals for an invoice month (or any date range) next to the period before
//! it, with variances, per-day averages at each period's real length, and an
//! optional per-group breakdown.

use std::collections::HashSet;
use std::io::Write;

use serde::Serialize;

use crate::error::{CycleError, CycleResult};
use crate::models::{DateRange, InvoiceMonth, Money, Transaction};
use crate::services::{
    compute_variance, daily_average, normalize, AccountingCore, ComparisonMode, EntryFilter,
    GroupKey, Variance,
};
use crate::storage::TransactionStore;

/// What a summary covers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportScope {
    /// One invoice month, compared with the previous invoice month
    Invoice(InvoiceMonth),
    /// A free-form range, compared with the same number of days before it
    Range(DateRange),
}

/// One group's totals in both periods
#[derive(Debug, Clone, Serialize)]
pub struct SummaryRow {
    pub key: String,
    pub current: Money,
    pub previous: Money,
    pub variance: Variance,
}

/// Summary of one period against the one before it
#[derive(Debug, Clone, Serialize)]
pub struct SummaryReport {
    /// Invoice month label when the scope is an invoice month
    pub invoice_month: Option<InvoiceMonth>,
    pub mode: ComparisonMode,
    pub current_range: DateRange,
    pub previous_range: DateRange,
    pub current_total: Money,
    pub previous_total: Money,
    pub current_count: usize,
    pub previous_count: usize,
    pub variance: Variance,
    pub current_daily_average: Money,
    pub previous_daily_average: Money,
    pub daily_average_variance: Variance,
    pub group_key: Option<GroupKey>,
    pub rows: Vec<SummaryRow>,
}

impl SummaryReport {
    /// Generate a summary over transactions read from `store`
    pub fn generate<S>(
        core: &AccountingCore<'_>,
        store: &S,
        scope: ReportScope,
        filter: &EntryFilter,
        group: Option<GroupKey>,
    ) -> CycleResult<Self>
    where
        S: TransactionStore + ?Sized,
    {
        let (invoice_month, current_range, mode) = match scope {
            ReportScope::Invoice(month) => (
                Some(month),
                core.period_for_invoice_month(month).range,
                ComparisonMode::InvoiceCycle,
            ),
            ReportScope::Range(range) => (None, range, ComparisonMode::ArbitraryRange),
        };
        let previous_range = core.previous_period(&current_range, mode);

        let hint = DateRange::spanning(previous_range.start(), current_range.end());
        let transactions = store.read_all(Some(&hint))?;

        let aggregator = core.aggregator();
        let predicate = |t: &Transaction| filter.matches(t);
        let current = aggregator.aggregate(&transactions, &current_range, predicate, group);
        let previous = aggregator.aggregate(&transactions, &previous_range, predicate, group);

        let current_daily_average = daily_average(current.total, &current_range);
        let previous_daily_average = daily_average(previous.total, &previous_range);

        let mut rows = Vec::new();
        let mut seen = HashSet::new();
        for g in current.groups.iter().flatten() {
            seen.insert(normalize(&g.key));
            let prev = previous.group_total(&g.key);
            rows.push(SummaryRow {
                key: g.key.clone(),
                current: g.total,
                previous: prev,
                variance: compute_variance(g.total, prev),
            });
        }
        // Groups that disappeared keep their previous-period ordering
        for g in previous.groups.iter().flatten() {
            if !seen.contains(&normalize(&g.key)) {
                rows.push(SummaryRow {
                    key: g.key.clone(),
                    current: Money::zero(),
                    previous: g.total,
                    variance: compute_variance(Money::zero(), g.total),
                });
            }
        }

        Ok(Self {
            invoice_month,
            mode,
            current_range,
            previous_range,
            current_total: current.total,
            previous_total: previous.total,
            current_count: current.count,
            previous_count: previous.count,
            variance: compute_variance(current.total, previous.total),
            current_daily_average,
            previous_daily_average,
            daily_average_variance: compute_variance(
                current_daily_average.round(),
                previous_daily_average.round(),
            ),
            group_key: group,
            rows,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(symbol);
        let mut output = String::new();

        let title = match self.invoice_month {
            Some(month) => format!("Invoice {}", month),
            None => "Custom range".to_string(),
        };
        output.push_str(&format!(
            "{}: {} ({} days)\n",
            title,
            self.current_range,
            self.current_range.duration_days()
        ));
        output.push_str(&"=".repeat(72));
        output.push('\n');
        output.push_str(&format!(
            "{:<22} {:>16} {:>16} {:>14}\n",
            "", "Current", "Previous", "Change"
        ));
        output.push_str(&format!(
            "{:<22} {:>16} {:>16} {:>14}\n",
            "Period",
            format!("{} days", self.current_range.duration_days()),
            format!("{} days", self.previous_range.duration_days()),
            ""
        ));
        output.push_str(&format!(
            "{:<22} {:>16} {:>16} {:>14}\n",
            "Total",
            money(self.current_total),
            money(self.previous_total),
            self.variance.to_string()
        ));
        output.push_str(&format!(
            "{:<22} {:>16} {:>16} {:>14}\n",
            "Daily average",
            money(self.current_daily_average),
            money(self.previous_daily_average),
            self.daily_average_variance.to_string()
        ));
        output.push_str(&format!(
            "{:<22} {:>16} {:>16}\n",
            "Entries", self.current_count, self.previous_count
        ));
        output.push_str(&format!("Previous period: {}\n", self.previous_range));

        if let Some(key) = self.group_key {
            output.push('\n');
            output.push_str(&format!(
                "{:<22} {:>16} {:>16} {:>14}\n",
                key.to_string().to_uppercase(),
                "Current",
                "Previous",
                "Change"
            ));
            output.push_str(&"-".repeat(72));
            output.push('\n');
            for row in &self.rows {
                output.push_str(&format!(
                    "{:<22} {:>16} {:>16} {:>14}\n",
                    row.key,
                    money(row.current),
                    money(row.previous),
                    row.variance.to_string()
                ));
            }
        }

        output
    }

    /// Export the per-group rows (or the totals alone) as CSV
    pub fn export_csv<W: Write>(&self, writer: W) -> CycleResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let to_err = |e: csv::Error| CycleError::Export(e.to_string());

        csv.write_record([
            "current_start",
            "current_end",
            "previous_start",
            "previous_end",
            "group",
            "current",
            "previous",
            "absolute_change",
            "percent_change",
        ])
        .map_err(to_err)?;

        let range_fields = [
            self.current_range.start().to_string(),
            self.current_range.end().to_string(),
            self.previous_range.start().to_string(),
            self.previous_range.end().to_string(),
        ];

        let mut write_row = |group: &str, current: Money, previous: Money, v: &Variance| {
            let mut record = range_fields.to_vec();
            record.extend([
                group.to_string(),
                current.to_plain_string(),
                previous.to_plain_string(),
                v.absolute.to_plain_string(),
                v.percentage.to_string(),
            ]);
            csv.write_record(&record).map_err(to_err)
        };

        for row in &self.rows {
            write_row(&row.key, row.current, row.previous, &row.variance)?;
        }
        write_row(
            "TOTAL",
            self.current_total,
            self.previous_total,
            &self.variance,
        )?;

        csv.flush()
            .map_err(|e| CycleError::Export(e.to_string()))
    }
}
