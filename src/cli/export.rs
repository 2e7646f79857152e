//! Export CLI command
//!
//! Writes the expanded entries of an invoice month or date range to a file
//! or to stdout.

use std::io::Write;
use std::path::PathBuf;

use clap::Args;

use crate::config::Settings;
use crate::error::{CycleError, CycleResult};
use crate::export::{write_export, EntryExport, ExportFormat};
use crate::services::AccountingCore;
use crate::storage::Storage;

use super::{create_output, parse_month, parse_range, FilterArgs};

/// Arguments of the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Output file; stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output format (csv, json, yaml); inferred from the file extension
    #[arg(short, long)]
    pub format: Option<String>,

    /// Invoice month to export (YYYY-MM), defaults to the current one
    #[arg(short = 'p', long, conflicts_with_all = ["from", "to"])]
    pub month: Option<String>,

    /// Start date (YYYY-MM-DD)
    #[arg(long, requires = "to")]
    pub from: Option<String>,

    /// End date (YYYY-MM-DD)
    #[arg(long, requires = "from")]
    pub to: Option<String>,

    #[command(flatten)]
    pub filter: FilterArgs,
}

/// Pick the export format from the flag, then the file extension, then CSV
fn resolve_format(args: &ExportArgs) -> CycleResult<ExportFormat> {
    if let Some(format) = &args.format {
        return format.parse();
    }
    Ok(args
        .output
        .as_deref()
        .and_then(ExportFormat::from_path)
        .unwrap_or(ExportFormat::Csv))
}

/// Handle the export command
pub fn handle_export_command(
    storage: &Storage,
    settings: &Settings,
    args: ExportArgs,
) -> CycleResult<()> {
    let core = AccountingCore::new(settings);
    let format = resolve_format(&args)?;

    let range = match parse_range(args.from.as_deref(), args.to.as_deref())? {
        Some(range) => range,
        None => {
            let month = match &args.month {
                Some(value) => parse_month(value)?,
                None => core.resolver().current_period(&core.clock()).invoice_month,
            };
            core.period_for_invoice_month(month).range
        }
    };

    let export = EntryExport::build(&core, &storage.transactions, &range, &args.filter.to_filter())?;

    match &args.output {
        Some(path) => {
            let mut writer = create_output(path)?;
            write_export(format, &export, &mut writer)?;
            writer
                .flush()
                .map_err(|e| CycleError::Export(e.to_string()))?;
            println!(
                "Exported {} entries ({}) to: {}",
                export.entries.len(),
                range,
                path.display()
            );
        }
        None => {
            let stdout = std::io::stdout();
            let mut lock = stdout.lock();
            write_export(format, &export, &mut lock)?;
        }
    }

    Ok(())
}
