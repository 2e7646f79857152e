//! Core data models for cyclebook
//!
//! This module contains the data structures the accounting core works on:
//! transactions, money, invoice months and date ranges.

pub mod ids;
pub mod money;
pub mod period;
pub mod transaction;

pub use ids::TransactionId;
pub use money::{Money, MoneyParseError};
pub use period::{DateRange, InvoiceMonth, InvoicePeriod, PeriodParseError};
pub use transaction::{Transaction, TransactionValidationError, MAX_INSTALLMENTS};
