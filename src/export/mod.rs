//! Export module for cyclebook
//!
//! Writes the expanded entries of a date range in three formats:
//! - CSV: one row per installment (spreadsheet-compatible)
//! - JSON: machine-readable document with totals
//! - YAML: human-readable version of the JSON document

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_entries_csv;
pub use json::{export_entries_json, EntryExport, ExportedEntry, EXPORT_SCHEMA_VERSION};
pub use yaml::export_entries_yaml;

use std::io::Write;
use std::str::FromStr;

use crate::error::{CycleError, CycleResult};

/// Supported export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
    Yaml,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path(path: &std::path::Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(|ext| ext.parse().ok())
    }
}

impl FromStr for ExportFormat {
    type Err = CycleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(CycleError::Export(format!(
                "Unknown format '{}'. Use csv, json or yaml",
                other
            ))),
        }
    }
}

/// Write an export in the given format
pub fn write_export<W: Write>(
    format: ExportFormat,
    export: &EntryExport,
    writer: &mut W,
) -> CycleResult<()> {
    match format {
        ExportFormat::Csv => export_entries_csv(export, writer),
        ExportFormat::Json => export_entries_json(export, writer),
        ExportFormat::Yaml => export_entries_yaml(export, writer),
    }
}
