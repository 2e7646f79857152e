//! CLI commands for reports
//!
//! Provides commands for invoice summaries, trends, the open cycle's balance
//! and spending caps.

use std::path::PathBuf;

use clap::Subcommand;

use crate::config::Settings;
use crate::error::CycleResult;
use crate::reports::{CapReport, CycleBalance, ReportScope, SummaryReport, TrendReport};
use crate::services::{AccountingCore, GroupKey};
use crate::storage::Storage;

use super::{create_output, parse_date, parse_month, parse_range, FilterArgs};

/// Report subcommands
#[derive(Subcommand, Debug)]
pub enum ReportCommands {
    /// Compare an invoice month (or date range) with the period before it
    Summary {
        /// Invoice month (YYYY-MM), defaults to the current one
        #[arg(short = 'p', long, conflicts_with_all = ["from", "to"])]
        month: Option<String>,

        /// Start date of a free-form range (YYYY-MM-DD)
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// End date of a free-form range (YYYY-MM-DD)
        #[arg(long, requires = "from")]
        to: Option<String>,

        /// Break totals down by category, tag, method or invoice-month
        #[arg(short, long)]
        group: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Totals per invoice month over a range of months
    Trend {
        /// First invoice month (YYYY-MM)
        #[arg(long)]
        from: String,

        /// Last invoice month (YYYY-MM), defaults to the current one
        #[arg(long)]
        to: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,

        /// Export to CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Spending so far in the open invoice period
    Balance {
        /// Evaluate as of this date instead of today (YYYY-MM-DD)
        #[arg(long)]
        date: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Spending cap breakdown for an invoice month
    Cap {
        /// Invoice month (YYYY-MM), defaults to the current one
        #[arg(short = 'p', long)]
        month: Option<String>,
    },
}

/// Handle report commands
pub fn handle_report_command(
    storage: &Storage,
    settings: &Settings,
    cmd: ReportCommands,
) -> CycleResult<()> {
    let core = AccountingCore::new(settings);
    let symbol = settings.currency_symbol.as_str();
    let current_month = || core.resolver().current_period(&core.clock()).invoice_month;

    match cmd {
        ReportCommands::Summary {
            month,
            from,
            to,
            group,
            filter,
            output,
        } => {
            let scope = match parse_range(from.as_deref(), to.as_deref())? {
                Some(range) => ReportScope::Range(range),
                None => ReportScope::Invoice(match month {
                    Some(value) => parse_month(&value)?,
                    None => current_month(),
                }),
            };
            let group = group
                .as_deref()
                .map(str::parse::<GroupKey>)
                .transpose()?;

            let report = SummaryReport::generate(
                &core,
                &storage.transactions,
                scope,
                &filter.to_filter(),
                group,
            )?;

            if let Some(path) = output {
                report.export_csv(create_output(&path)?)?;
                println!("Summary exported to: {}", path.display());
            } else {
                print!("{}", report.format_terminal(symbol));
            }
        }
        ReportCommands::Trend {
            from,
            to,
            filter,
            output,
        } => {
            let from = parse_month(&from)?;
            let to = match to {
                Some(value) => parse_month(&value)?,
                None => current_month(),
            };

            let report =
                TrendReport::generate(&core, &storage.transactions, from, to, &filter.to_filter())?;

            if let Some(path) = output {
                report.export_csv(create_output(&path)?)?;
                println!("Trend exported to: {}", path.display());
            } else {
                print!("{}", report.format_terminal(symbol));
            }
        }
        ReportCommands::Balance { date, filter } => {
            let today = match date {
                Some(value) => parse_date(&value)?,
                None => core.clock().today(),
            };
            let balance = CycleBalance::generate(
                &core,
                &storage.transactions,
                &storage.holidays,
                &filter.to_filter(),
                today,
            )?;
            print!("{}", balance.format_terminal(symbol));
        }
        ReportCommands::Cap { month } => {
            let month = match month {
                Some(value) => parse_month(&value)?,
                None => current_month(),
            };
            let report = CapReport::generate(&core, &storage.transactions, &storage.holidays, month)?;
            if report.breakdown.is_none() {
                tracing::debug!(%month, "cap not active");
            }
            print!("{}", report.format_terminal(symbol));
        }
    }

    Ok(())
}
