//! Transaction CLI commands
//!
//! Implements CLI commands for recording expenses and inspecting their
//! installment schedules.

use chrono::NaiveTime;
use clap::Subcommand;

use crate::config::Settings;
use crate::display::{
    format_schedule, format_transaction_details, format_transaction_register,
    format_transaction_row,
};
use crate::error::{CycleError, CycleResult};
use crate::models::Money;
use crate::services::{AccountingCore, CreateTransactionInput, TransactionService};
use crate::storage::Storage;

use super::parse_date;

/// Transaction subcommands
#[derive(Subcommand, Debug)]
pub enum TransactionCommands {
    /// Record a new expense (negative amount for a refund)
    Add {
        /// Total amount (e.g., "199.90", "10,50" or "-50" for a refund)
        #[arg(allow_hyphen_values = true)]
        amount: String,
        /// Description
        description: String,
        /// Payment method
        #[arg(short, long)]
        method: String,
        /// Category
        #[arg(short, long)]
        category: String,
        /// Optional tag
        #[arg(short, long)]
        tag: Option<String>,
        /// Number of installments
        #[arg(short = 'n', long, default_value = "1")]
        installments: u32,
        /// Purchase date (YYYY-MM-DD), defaults to now
        #[arg(short, long)]
        date: Option<String>,
        /// Purchase time (HH:MM), requires --date
        #[arg(long)]
        time: Option<String>,
    },
    /// List the most recently entered transactions
    List {
        /// Number of transactions to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
    },
    /// Show transaction details
    Show {
        /// Transaction ID (full, "txn-xxxxxxxx" or a hex prefix)
        id: String,
    },
    /// Show the installment schedule of a transaction
    Schedule {
        /// Transaction ID
        id: String,
    },
    /// Delete a transaction
    Delete {
        /// Transaction ID
        id: String,
    },
    /// Delete the most recently entered transaction
    Undo,
}

fn parse_time(value: &str) -> CycleResult<NaiveTime> {
    NaiveTime::parse_from_str(value.trim(), "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value.trim(), "%H:%M:%S"))
        .map_err(|_| CycleError::Validation(format!("Invalid time format: {}. Use HH:MM", value)))
}

/// Handle a transaction command
pub fn handle_transaction_command(
    storage: &Storage,
    settings: &Settings,
    cmd: TransactionCommands,
) -> CycleResult<()> {
    let core = AccountingCore::new(settings);
    let clock = core.clock();
    let service = TransactionService::new(storage, clock);
    let symbol = settings.currency_symbol.as_str();
    let date_format = settings.date_format.as_str();

    match cmd {
        TransactionCommands::Add {
            amount,
            description,
            method,
            category,
            tag,
            installments,
            date,
            time,
        } => {
            let amount = Money::parse(&amount).map_err(|e| {
                CycleError::Validation(format!("Invalid amount '{}': {}", amount, e))
            })?;

            let mut input = CreateTransactionInput::new(amount, description, method, category);
            input.tag = tag;
            input.installments = installments;
            input.date = date.as_deref().map(parse_date).transpose()?;
            input.time = time.as_deref().map(parse_time).transpose()?;

            let txn = service.create(input)?;
            println!("Created transaction: {}", txn.id);
            println!();
            print!("{}", format_transaction_details(&txn, &clock, date_format, symbol));

            if txn.is_installment() {
                println!();
                print!("{}", format_schedule(&txn, &core.expand(&txn), symbol));
            } else {
                let period = core.resolve_invoice_month(clock.date_of(&txn.timestamp));
                println!("Invoice:     {}", period);
            }
        }
        TransactionCommands::List { limit } => {
            let transactions = service.list_recent(limit)?;
            print!(
                "{}",
                format_transaction_register(&transactions, &clock, date_format, symbol)
            );
        }
        TransactionCommands::Show { id } => {
            let txn = service.find(&id)?;
            print!("{}", format_transaction_details(&txn, &clock, date_format, symbol));
        }
        TransactionCommands::Schedule { id } => {
            let txn = service.find(&id)?;
            print!("{}", format_schedule(&txn, &core.expand(&txn), symbol));
        }
        TransactionCommands::Delete { id } => {
            let txn = service.delete(&id)?;
            println!("Deleted transaction: {} ({})", txn.id, txn.description);
        }
        TransactionCommands::Undo => {
            let txn = service.undo_last()?;
            println!(
                "Removed last transaction: {}",
                format_transaction_row(&txn, &clock, date_format, symbol)
            );
        }
    }

    Ok(())
}
