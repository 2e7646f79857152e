//! CSV export of expanded entries
//!
//! One row per installment entry, suitable for spreadsheets.

use std::io::Write;

use crate::error::{CycleError, CycleResult};

use super::json::EntryExport;

/// Write every entry as a CSV row with a header
pub fn export_entries_csv<W: Write>(export: &EntryExport, writer: &mut W) -> CycleResult<()> {
    let mut csv = csv::Writer::from_writer(writer);

    for entry in &export.entries {
        csv.serialize(entry)
            .map_err(|e| CycleError::Export(e.to_string()))?;
    }

    // An empty export still gets a header row
    if export.entries.is_empty() {
        csv.write_record([
            "transaction_id",
            "date",
            "invoice_month",
            "period_start",
            "period_end",
            "label",
            "installment_index",
            "installment_count",
            "amount",
            "category",
            "tag",
            "method",
        ])
        .map_err(|e| CycleError::Export(e.to_string()))?;
    }

    csv.flush().map_err(|e| CycleError::Export(e.to_string()))
}
