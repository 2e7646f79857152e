//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod cycle;
pub mod export;
pub mod holiday;
pub mod report;
pub mod transaction;

pub use cycle::{handle_cycle_command, CycleCommands};
pub use export::{handle_export_command, ExportArgs};
pub use holiday::{handle_holiday_command, HolidayCommands};
pub use report::{handle_report_command, ReportCommands};
pub use transaction::{handle_transaction_command, TransactionCommands};

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use chrono::NaiveDate;
use clap::Args;

use crate::error::{CycleError, CycleResult};
use crate::models::{DateRange, InvoiceMonth};
use crate::services::EntryFilter;

/// Metadata filters shared by reports and exports
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Only include this category (repeatable)
    #[arg(short = 'c', long = "category")]
    pub categories: Vec<String>,

    /// Only include this tag (repeatable)
    #[arg(short = 't', long = "tag")]
    pub tags: Vec<String>,

    /// Only include this payment method (repeatable)
    #[arg(short = 'm', long = "method")]
    pub methods: Vec<String>,

    /// Only include descriptions containing this text
    #[arg(short = 's', long)]
    pub search: Option<String>,
}

impl FilterArgs {
    pub fn to_filter(&self) -> EntryFilter {
        let mut filter = EntryFilter::new();
        for category in &self.categories {
            filter = filter.category(category);
        }
        for tag in &self.tags {
            filter = filter.tag(tag);
        }
        for method in &self.methods {
            filter = filter.method(method);
        }
        if let Some(search) = &self.search {
            filter = filter.search(search);
        }
        filter
    }
}

/// Parse a YYYY-MM-DD argument
pub(crate) fn parse_date(value: &str) -> CycleResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        CycleError::Validation(format!("Invalid date format: {}. Use YYYY-MM-DD", value))
    })
}

/// Parse a YYYY-MM argument
pub(crate) fn parse_month(value: &str) -> CycleResult<InvoiceMonth> {
    InvoiceMonth::parse(value).map_err(|e| {
        CycleError::Validation(format!(
            "Invalid invoice month: {}. Use YYYY-MM (e.g., 2025-11)",
            e
        ))
    })
}

/// Build a range from optional --from/--to arguments
///
/// Returns `None` when neither bound is given.
pub(crate) fn parse_range(from: Option<&str>, to: Option<&str>) -> CycleResult<Option<DateRange>> {
    match (from, to) {
        (None, None) => Ok(None),
        (Some(from), Some(to)) => DateRange::new(parse_date(from)?, parse_date(to)?).map(Some),
        _ => Err(CycleError::Validation(
            "--from and --to must be given together".into(),
        )),
    }
}

/// Create an output file wrapped in a buffered writer
pub(crate) fn create_output(path: &Path) -> CycleResult<BufWriter<File>> {
    let file = File::create(path).map_err(|e| {
        CycleError::Export(format!("Failed to create file {}: {}", path.display(), e))
    })?;
    Ok(BufWriter::new(file))
}
