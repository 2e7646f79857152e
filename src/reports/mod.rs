//! Reports module for cyclebook
//!
//! Compositions of the accounting core: invoice summaries with comparisons,
//! month-by-month trends, the open cycle's balance, and cap breakdowns.

pub mod balance;
pub mod cap;
pub mod summary;
pub mod trend;

pub use balance::CycleBalance;
pub use cap::CapReport;
pub use summary::{ReportScope, SummaryReport, SummaryRow};
pub use trend::{TrendReport, TrendRow};
