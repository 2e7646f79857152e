//! JSON export of expanded entries
//!
//! Also defines the export document shared by the CSV and YAML writers.

use std::io::Write;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{CycleError, CycleResult};
use crate::models::{DateRange, Money, Transaction};
use crate::services::{AccountingCore, EntryFilter, MatchedEntry};
use crate::storage::TransactionStore;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: u32 = 1;

/// One installment entry, flattened for spreadsheets
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedEntry {
    pub transaction_id: String,
    pub date: NaiveDate,
    pub invoice_month: String,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub label: String,
    pub installment_index: u32,
    pub installment_count: u32,
    /// Share rounded to cents
    pub amount: String,
    pub category: String,
    pub tag: String,
    pub method: String,
}

impl From<&MatchedEntry<'_>> for ExportedEntry {
    fn from(matched: &MatchedEntry<'_>) -> Self {
        let txn = matched.transaction;
        let entry = &matched.entry;
        Self {
            transaction_id: txn.id.as_uuid().to_string(),
            date: entry.date,
            invoice_month: entry.period.invoice_month.to_string(),
            period_start: entry.period.start(),
            period_end: entry.period.end(),
            label: matched.label(),
            installment_index: entry.installment_index,
            installment_count: entry.installment_count,
            amount: entry.prorated_amount.to_plain_string(),
            category: txn.category.clone(),
            tag: txn.tag.clone(),
            method: txn.method.clone(),
        }
    }
}

/// Entries of a date range, ready to serialize
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryExport {
    pub schema_version: u32,
    pub exported_at: DateTime<Utc>,
    pub app_version: String,
    pub range: DateRange,
    pub total: String,
    pub entries: Vec<ExportedEntry>,
}

impl EntryExport {
    /// Expand and collect every entry dated inside `range`
    pub fn build<S>(
        core: &AccountingCore<'_>,
        store: &S,
        range: &DateRange,
        filter: &EntryFilter,
    ) -> CycleResult<Self>
    where
        S: TransactionStore + ?Sized,
    {
        let transactions = store.read_all(Some(range))?;
        let matched =
            core.aggregator()
                .entries_in(&transactions, range, |t: &Transaction| filter.matches(t));

        let total: Money = matched.iter().map(|m| m.entry.prorated_amount).sum();
        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION,
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            range: *range,
            total: total.to_plain_string(),
            entries: matched.iter().map(ExportedEntry::from).collect(),
        })
    }
}

/// Write the export as pretty JSON
pub fn export_entries_json<W: Write>(export: &EntryExport, writer: &mut W) -> CycleResult<()> {
    serde_json::to_writer_pretty(&mut *writer, export)
        .map_err(|e| CycleError::Export(e.to_string()))?;
    writeln!(writer).map_err(|e| CycleError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::services::CivilClock;
    use chrono::{FixedOffset, NaiveTime};

    fn sample_export() -> EntryExport {
        let settings = Settings::default();
        let clock = CivilClock::new(FixedOffset::west_opt(3 * 3600).unwrap());
        let core = AccountingCore::with_clock(&settings, clock);

        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let on = NaiveDate::from_ymd_opt(2025, 9, 10).unwrap();
        let store = vec![Transaction::new(
            clock.instant_at(on, noon),
            Money::from_cents(60000),
            "Notebook",
        )
        .with_installments(3)
        .with_metadata("Eletrônicos", "Pessoal", "Crédito")];

        let range = DateRange::new(
            NaiveDate::from_ymd_opt(2025, 10, 4).unwrap(),
            NaiveDate::from_ymd_opt(2025, 12, 16).unwrap(),
        )
        .unwrap();
        EntryExport::build(&core, &store, &range, &EntryFilter::new()).unwrap()
    }

    #[test]
    fn test_build_collects_entries_in_range() {
        let export = sample_export();
        assert_eq!(export.entries.len(), 2);
        assert_eq!(export.total, "400.00");
        assert_eq!(export.entries[0].label, "Notebook (2/3)");
        assert_eq!(export.entries[0].invoice_month, "2025-11");
        assert_eq!(export.entries[1].date, NaiveDate::from_ymd_opt(2025, 11, 17).unwrap());
        assert_eq!(export.entries[1].amount, "200.00");
    }

    #[test]
    fn test_json_round_trips() {
        let export = sample_export();
        let mut buf = Vec::new();
        export_entries_json(&export, &mut buf).unwrap();

        let parsed: EntryExport = serde_json::from_slice(&buf).unwrap();
        assert_eq!(parsed.entries, export.entries);
        assert_eq!(parsed.schema_version, EXPORT_SCHEMA_VERSION);
    }
}
