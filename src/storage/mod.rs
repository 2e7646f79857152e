//! Storage layer for cyclebook
//!
//! JSON file storage with atomic writes. The accounting core never touches
//! files directly: it reads through the [`TransactionStore`] and
//! [`HolidayCalendar`] traits, which the repositories here implement.

pub mod file_io;
pub mod holidays;
pub mod transactions;

pub use file_io::{read_json, write_json_atomic};
pub use holidays::HolidayRepository;
pub use transactions::TransactionRepository;

use std::collections::BTreeMap;

use crate::config::paths::CyclePaths;
use crate::error::CycleResult;
use crate::models::{DateRange, InvoiceMonth, Transaction};

/// Read-only source of transactions
pub trait TransactionStore {
    /// Transactions that may contribute entries to `hint`, or all of them
    ///
    /// The hint only allows the store to skip work; callers still filter
    /// expanded entries by date themselves.
    fn read_all(&self, hint: Option<&DateRange>) -> CycleResult<Vec<Transaction>>;
}

impl TransactionStore for [Transaction] {
    fn read_all(&self, _hint: Option<&DateRange>) -> CycleResult<Vec<Transaction>> {
        Ok(self.to_vec())
    }
}

impl TransactionStore for Vec<Transaction> {
    fn read_all(&self, hint: Option<&DateRange>) -> CycleResult<Vec<Transaction>> {
        self.as_slice().read_all(hint)
    }
}

/// Number of weekday holidays per calendar month
pub trait HolidayCalendar {
    /// Holidays in `month`, 0 when nothing is configured
    fn holidays(&self, month: InvoiceMonth) -> u32;
}

impl HolidayCalendar for BTreeMap<InvoiceMonth, u32> {
    fn holidays(&self, month: InvoiceMonth) -> u32 {
        self.get(&month).copied().unwrap_or(0)
    }
}

/// Main storage coordinator that provides access to all repositories
pub struct Storage {
    paths: CyclePaths,
    pub transactions: TransactionRepository,
    pub holidays: HolidayRepository,
}

impl Storage {
    /// Create storage rooted at `paths`, creating directories as needed
    pub fn new(paths: CyclePaths) -> CycleResult<Self> {
        paths.ensure_directories()?;

        Ok(Self {
            transactions: TransactionRepository::new(paths.transactions_file()),
            holidays: HolidayRepository::new(paths.holidays_file()),
            paths,
        })
    }

    pub fn paths(&self) -> &CyclePaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> CycleResult<()> {
        self.transactions.load()?;
        self.holidays.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> CycleResult<()> {
        self.transactions.save()?;
        self.holidays.save()?;
        Ok(())
    }

    /// Check if the data directory has been initialized
    pub fn is_initialized(&self) -> bool {
        self.paths.is_initialized()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = CyclePaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert!(!storage.is_initialized());
        storage.load_all().unwrap();
        storage.save_all().unwrap();
        assert!(temp_dir.path().join("data").join("transactions.json").exists());
        assert!(temp_dir.path().join("data").join("holidays.json").exists());
    }

    #[test]
    fn test_map_holiday_calendar() {
        let mut map = BTreeMap::new();
        let feb = InvoiceMonth::new(2025, 2).unwrap();
        map.insert(feb, 2);
        assert_eq!(map.holidays(feb), 2);
        assert_eq!(map.holidays(feb.next()), 0);
    }
}
