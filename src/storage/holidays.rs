//! Holiday repository for JSON storage
//!
//! Stores the number of holidays falling on weekdays per calendar month in
//! holidays.json. Months without an entry have no holidays.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::RwLock;

use crate::error::{CycleError, CycleResult};
use crate::models::InvoiceMonth;

use super::file_io::{read_json, write_json_atomic};
use super::HolidayCalendar;

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct HolidayData {
    holidays: BTreeMap<InvoiceMonth, u32>,
}

/// Repository for per-month holiday counts
pub struct HolidayRepository {
    path: PathBuf,
    data: RwLock<BTreeMap<InvoiceMonth, u32>>,
}

impl HolidayRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(BTreeMap::new()),
        }
    }

    pub fn load(&self) -> CycleResult<()> {
        let file_data: HolidayData = read_json(&self.path)?;
        let mut data = self
            .data
            .write()
            .map_err(|e| CycleError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        *data = file_data.holidays;
        Ok(())
    }

    pub fn save(&self) -> CycleResult<()> {
        let holidays = self.all()?;
        write_json_atomic(&self.path, &HolidayData { holidays })
    }

    /// Every configured month, in calendar order
    pub fn all(&self) -> CycleResult<BTreeMap<InvoiceMonth, u32>> {
        self.data
            .read()
            .map(|data| data.clone())
            .map_err(|e| CycleError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    /// Set the holiday count for a month; zero removes the entry
    pub fn set(&self, month: InvoiceMonth, count: u32) -> CycleResult<()> {
        let mut data = self
            .data
            .write()
            .map_err(|e| CycleError::Storage(format!("Failed to acquire write lock: {}", e)))?;
        if count == 0 {
            data.remove(&month);
        } else {
            data.insert(month, count);
        }
        Ok(())
    }

    /// Remove a month's entry, returning the previous count
    pub fn remove(&self, month: InvoiceMonth) -> CycleResult<Option<u32>> {
        self.data
            .write()
            .map(|mut data| data.remove(&month))
            .map_err(|e| CycleError::Storage(format!("Failed to acquire write lock: {}", e)))
    }
}

impl HolidayCalendar for HolidayRepository {
    fn holidays(&self, month: InvoiceMonth) -> u32 {
        match self.data.read() {
            Ok(data) => data.get(&month).copied().unwrap_or(0),
            Err(e) => {
                tracing::warn!(%month, error = %e, "holiday data unavailable, assuming none");
                0
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn month(y: i32, m: u32) -> InvoiceMonth {
        InvoiceMonth::new(y, m).unwrap()
    }

    #[test]
    fn test_missing_month_defaults_to_zero() {
        let temp_dir = TempDir::new().unwrap();
        let repo = HolidayRepository::new(temp_dir.path().join("holidays.json"));
        repo.load().unwrap();
        assert_eq!(repo.holidays(month(2025, 2)), 0);
    }

    #[test]
    fn test_set_save_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("holidays.json");
        let repo = HolidayRepository::new(path.clone());
        repo.set(month(2025, 2), 2).unwrap();
        repo.set(month(2025, 11), 1).unwrap();
        repo.save().unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("\"2025-02\": 2"));

        let reloaded = HolidayRepository::new(path);
        reloaded.load().unwrap();
        assert_eq!(reloaded.holidays(month(2025, 2)), 2);
        assert_eq!(reloaded.holidays(month(2025, 11)), 1);
    }

    #[test]
    fn test_set_zero_removes() {
        let temp_dir = TempDir::new().unwrap();
        let repo = HolidayRepository::new(temp_dir.path().join("holidays.json"));
        repo.set(month(2025, 2), 2).unwrap();
        repo.set(month(2025, 2), 0).unwrap();
        assert!(repo.all().unwrap().is_empty());
        assert_eq!(repo.remove(month(2025, 2)).unwrap(), None);
    }
}
