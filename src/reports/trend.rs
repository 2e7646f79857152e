//! Trend report
//!
//! Totals per invoice month over an inclusive range of months.

use std::io::Write;

use serde::Serialize;

use crate::error::{CycleError, CycleResult};
use crate::models::{DateRange, InvoiceMonth, Money, Transaction};
use crate::services::{compute_variance, daily_average, AccountingCore, EntryFilter, Variance};
use crate::storage::TransactionStore;

/// One invoice month in the trend
#[derive(Debug, Clone, Serialize)]
pub struct TrendRow {
    pub invoice_month: InvoiceMonth,
    pub range: DateRange,
    pub total: Money,
    pub count: usize,
    pub daily_average: Money,
    /// Change from the row before; absent for the first month
    pub change: Option<Variance>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendReport {
    pub from: InvoiceMonth,
    pub to: InvoiceMonth,
    pub rows: Vec<TrendRow>,
    pub total: Money,
}

impl TrendReport {
    pub fn generate<S>(
        core: &AccountingCore<'_>,
        store: &S,
        from: InvoiceMonth,
        to: InvoiceMonth,
        filter: &EntryFilter,
    ) -> CycleResult<Self>
    where
        S: TransactionStore + ?Sized,
    {
        if from > to {
            return Err(CycleError::OutOfRangeQuery {
                start: from.first_day(),
                end: to.first_day(),
            });
        }

        let periods = core.resolver().periods_between(from, to);
        let hint = match (periods.first(), periods.last()) {
            (Some(first), Some(last)) => Some(DateRange::spanning(first.start(), last.end())),
            _ => None,
        };
        let transactions = store.read_all(hint.as_ref())?;

        let aggregator = core.aggregator();
        let predicate = |t: &Transaction| filter.matches(t);

        let mut rows: Vec<TrendRow> = Vec::with_capacity(periods.len());
        for period in periods {
            let aggregate = aggregator.aggregate(&transactions, &period.range, predicate, None);
            let change = rows
                .last()
                .map(|prev| compute_variance(aggregate.total, prev.total));
            rows.push(TrendRow {
                invoice_month: period.invoice_month,
                range: period.range,
                total: aggregate.total,
                count: aggregate.count,
                daily_average: daily_average(aggregate.total, &period.range),
                change,
            });
        }

        let total = rows.iter().map(|r| r.total).sum();
        Ok(Self {
            from,
            to,
            rows,
            total,
        })
    }

    /// Format the report for terminal display
    pub fn format_terminal(&self, symbol: &str) -> String {
        let mut output = String::new();

        output.push_str(&format!("Trend: {} to {}\n", self.from, self.to));
        output.push_str(&"=".repeat(84));
        output.push('\n');
        output.push_str(&format!(
            "{:<9} {:<24} {:>5} {:>14} {:>12} {:>7} {:>8}\n",
            "Invoice", "Period", "Days", "Total", "Per day", "Count", "Change"
        ));
        output.push_str(&"-".repeat(84));
        output.push('\n');

        for row in &self.rows {
            let change = row
                .change
                .map(|v| v.to_string())
                .unwrap_or_else(|| "-".to_string());
            output.push_str(&format!(
                "{:<9} {:<24} {:>5} {:>14} {:>12} {:>7} {:>8}\n",
                row.invoice_month.to_string(),
                row.range.to_string(),
                row.range.duration_days(),
                row.total.format_with_symbol(symbol),
                row.daily_average.format_with_symbol(symbol),
                row.count,
                change
            ));
        }

        output.push_str(&"-".repeat(84));
        output.push('\n');
        output.push_str(&format!(
            "{:<40} {:>14}\n",
            "TOTAL",
            self.total.format_with_symbol(symbol)
        ));
        output
    }

    pub fn export_csv<W: Write>(&self, writer: W) -> CycleResult<()> {
        let mut csv = csv::Writer::from_writer(writer);
        let to_err = |e: csv::Error| CycleError::Export(e.to_string());

        csv.write_record([
            "invoice_month",
            "start",
            "end",
            "days",
            "total",
            "daily_average",
            "count",
        ])
        .map_err(to_err)?;

        for row in &self.rows {
            csv.write_record([
                row.invoice_month.to_string(),
                row.range.start().to_string(),
                row.range.end().to_string(),
                row.range.duration_days().to_string(),
                row.total.to_plain_string(),
                row.daily_average.to_plain_string(),
                row.count.to_string(),
            ])
            .map_err(to_err)?;
        }

        csv.flush()
            .map_err(|e| CycleError::Export(e.to_string()))
    }
}
