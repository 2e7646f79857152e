//! Holiday CLI commands
//!
//! Holiday counts are subtracted from a work month's business days when
//! computing the spending cap.

use clap::Subcommand;

use crate::error::CycleResult;
use crate::services::calendar::weekday_count;
use crate::storage::Storage;

use super::parse_month;

/// Holiday subcommands
#[derive(Subcommand, Debug)]
pub enum HolidayCommands {
    /// Set the number of weekday holidays in a month
    Set {
        /// Calendar month (YYYY-MM)
        month: String,
        /// Holidays falling on weekdays
        count: u32,
    },
    /// List configured holiday counts
    List,
    /// Remove a month's holiday count
    Remove {
        /// Calendar month (YYYY-MM)
        month: String,
    },
}

/// Handle a holiday command
pub fn handle_holiday_command(storage: &Storage, cmd: HolidayCommands) -> CycleResult<()> {
    match cmd {
        HolidayCommands::Set { month, count } => {
            let month = parse_month(&month)?;
            let weekdays = weekday_count(month);
            if count > weekdays {
                tracing::warn!(%month, count, weekdays, "more holidays than weekdays");
            }

            storage.holidays.set(month, count)?;
            storage.holidays.save()?;
            println!("Holidays for {}: {} (of {} weekdays)", month, count, weekdays);
        }
        HolidayCommands::List => {
            let all = storage.holidays.all()?;
            if all.is_empty() {
                println!("No holidays configured.");
                return Ok(());
            }

            println!("{:<8}  {:>8}  {:>8}", "Month", "Holidays", "Weekdays");
            println!("{:-<8}  {:->8}  {:->8}", "", "", "");
            for (month, count) in all {
                println!("{:<8}  {:>8}  {:>8}", month.to_string(), count, weekday_count(month));
            }
        }
        HolidayCommands::Remove { month } => {
            let month = parse_month(&month)?;
            match storage.holidays.remove(month)? {
                Some(count) => {
                    storage.holidays.save()?;
                    println!("Removed {} holidays for {}", count, month);
                }
                None => println!("No holidays configured for {}", month),
            }
        }
    }

    Ok(())
}
