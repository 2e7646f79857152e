//! YAML export of expanded entries

use std::io::Write;

use crate::error::{CycleError, CycleResult};

use super::json::EntryExport;

/// Write the export as YAML with a short comment header
pub fn export_entries_yaml<W: Write>(export: &EntryExport, writer: &mut W) -> CycleResult<()> {
    let to_err = |e: std::io::Error| CycleError::Export(e.to_string());

    writeln!(writer, "# cyclebook entries {}", export.range).map_err(to_err)?;
    writeln!(writer, "# Generated: {}", export.exported_at).map_err(to_err)?;
    writeln!(writer).map_err(to_err)?;

    serde_yaml::to_writer(writer, export).map_err(|e| CycleError::Export(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::models::{DateRange, Money, Transaction};
    use crate::services::{AccountingCore, CivilClock, EntryFilter};
    use chrono::{FixedOffset, NaiveDate, NaiveTime};

    #[test]
    fn test_yaml_export_parses_back() {
        let settings = Settings::default();
        let clock = CivilClock::new(FixedOffset::west_opt(3 * 3600).unwrap());
        let core = AccountingCore::with_clock(&settings, clock);

        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let on = NaiveDate::from_ymd_opt(2025, 12, 1).unwrap();
        let store = vec![Transaction::new(
            clock.instant_at(on, noon),
            Money::from_cents(4500),
            "Cinema",
        )
        .with_metadata("Lazer", "Pessoal", "Débito")];

        let range = DateRange::new(on, on).unwrap();
        let export = EntryExport::build(&core, &store, &range, &EntryFilter::new()).unwrap();

        let mut buf = Vec::new();
        export_entries_yaml(&export, &mut buf).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(text.starts_with("# cyclebook entries 2025-12-01..2025-12-01"));

        let parsed: EntryExport = serde_yaml::from_str(&text).unwrap();
        assert_eq!(parsed.entries, export.entries);
        assert_eq!(parsed.total, "45.00");
    }
}
