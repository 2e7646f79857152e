//! cyclebook - credit card invoice-cycle accounting
//!
//! This library maps expenses to the invoice they are billed on. It handles a
//! card whose closing day changed mid-history (with one long transition
//! invoice in between), spreads installment purchases across later invoices,
//! compares periods of unequal length, and derives a monthly spending cap from
//! business days worked.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Configuration and path management
//! - `error`: Custom error types
//! - `models`: Core data models (transactions, money, invoice months)
//! - `services`: The accounting core (cycles, installments, aggregation,
//!   comparison, caps) and transaction entry
//! - `storage`: JSON file storage layer
//! - `reports`: Summaries, trends, balances and cap reports
//! - `export`: CSV, JSON and YAML export of expanded entries
//! - `display`: Terminal formatting
//! - `cli`: Command handlers
//!
//! # Example
//!
//! ```rust,ignore
//! use cyclebook::config::{paths::CyclePaths, settings::Settings};
//! use cyclebook::services::AccountingCore;
//!
//! let paths = CyclePaths::new()?;
//! let settings = Settings::load_or_create(&paths)?;
//! let core = AccountingCore::new(&settings);
//! let period = core.resolve_invoice_month(chrono::NaiveDate::from_ymd_opt(2025, 10, 4).unwrap());
//! assert_eq!(period.invoice_month.to_string(), "2025-11");
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod reports;
pub mod services;
pub mod storage;

pub use error::{CycleError, CycleResult};
