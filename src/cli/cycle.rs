//! Cycle CLI commands
//!
//! Look up invoice periods by date or invoice month and list the periods
//! between two months.

use clap::Subcommand;

use crate::config::Settings;
use crate::display::{format_period_details, format_period_table};
use crate::error::{CycleError, CycleResult};
use crate::services::AccountingCore;
use crate::storage::Storage;

use super::{parse_date, parse_month};

/// Cycle subcommands
#[derive(Subcommand, Debug)]
pub enum CycleCommands {
    /// Show the invoice period a date is billed in
    Resolve {
        /// Civil date (YYYY-MM-DD)
        date: String,
    },
    /// Show the billing window of an invoice month
    Period {
        /// Invoice month (YYYY-MM)
        month: String,
    },
    /// Show the invoice period containing today
    Current,
    /// List invoice periods between two months, inclusive
    Months {
        /// First invoice month; defaults to the earliest month with entries
        #[arg(long)]
        from: Option<String>,
        /// Last invoice month; defaults to the latest month with entries
        #[arg(long)]
        to: Option<String>,
    },
}

/// Handle a cycle command
pub fn handle_cycle_command(
    storage: &Storage,
    settings: &Settings,
    cmd: CycleCommands,
) -> CycleResult<()> {
    let core = AccountingCore::new(settings);
    let resolver = core.resolver();

    match cmd {
        CycleCommands::Resolve { date } => {
            let date = parse_date(&date)?;
            let period = core.resolve_invoice_month(date);
            println!("Date:          {}", date.format("%Y-%m-%d"));
            print!("{}", format_period_details(&period, &resolver));
        }
        CycleCommands::Period { month } => {
            let period = core.period_for_invoice_month(parse_month(&month)?);
            print!("{}", format_period_details(&period, &resolver));
        }
        CycleCommands::Current => {
            let today = core.clock().today();
            let period = resolver.current_period(&core.clock());
            println!("Today:         {}", today.format("%Y-%m-%d"));
            print!("{}", format_period_details(&period, &resolver));
        }
        CycleCommands::Months { from, to } => {
            let current = resolver.current_period(&core.clock()).invoice_month;
            let span = if from.is_none() || to.is_none() {
                let transactions = storage.transactions.get_all()?;
                core.aggregator().invoice_month_span(&transactions)
            } else {
                None
            };

            let from = match from {
                Some(value) => parse_month(&value)?,
                None => span.map_or(current, |(first, _)| first),
            };
            let to = match to {
                Some(value) => parse_month(&value)?,
                None => span.map_or(current, |(_, last)| last),
            };

            if from > to {
                return Err(CycleError::OutOfRangeQuery {
                    start: from.first_day(),
                    end: to.first_day(),
                });
            }

            let periods = resolver.periods_between(from, to);
            print!("{}", format_period_table(&periods, &resolver));
        }
    }

    Ok(())
}
