//! Transaction repository for JSON storage
//!
//! Manages loading and saving transactions to transactions.json

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::error::{CycleError, CycleResult};
use crate::models::{DateRange, Transaction, TransactionId, MAX_INSTALLMENTS};

use super::file_io::{read_json, write_json_atomic};
use super::TransactionStore;

/// On-disk layout of transactions.json
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TransactionData {
    transactions: Vec<Transaction>,
}

/// Repository for transaction persistence
pub struct TransactionRepository {
    path: PathBuf,
    data: RwLock<HashMap<TransactionId, Transaction>>,
}

impl TransactionRepository {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> CycleResult<RwLockReadGuard<'_, HashMap<TransactionId, Transaction>>> {
        self.data
            .read()
            .map_err(|e| CycleError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> CycleResult<RwLockWriteGuard<'_, HashMap<TransactionId, Transaction>>> {
        self.data
            .write()
            .map_err(|e| CycleError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load transactions from disk, replacing anything in memory
    pub fn load(&self) -> CycleResult<()> {
        let file_data: TransactionData = read_json(&self.path)?;

        if let Some(txn) = file_data
            .transactions
            .iter()
            .find(|t| t.installment_count > MAX_INSTALLMENTS)
        {
            return Err(CycleError::Storage(format!(
                "Transaction {} has {} installments (at most {})",
                txn.id, txn.installment_count, MAX_INSTALLMENTS
            )));
        }

        let mut data = self.write()?;
        data.clear();
        data.extend(file_data.transactions.into_iter().map(|t| (t.id, t)));

        tracing::debug!(count = data.len(), path = %self.path.display(), "transactions loaded");
        Ok(())
    }

    /// Save transactions to disk, newest first
    pub fn save(&self) -> CycleResult<()> {
        let transactions = self.get_all()?;
        write_json_atomic(&self.path, &TransactionData { transactions })
    }

    pub fn get(&self, id: TransactionId) -> CycleResult<Option<Transaction>> {
        Ok(self.read()?.get(&id).cloned())
    }

    /// All transactions, newest timestamp first
    pub fn get_all(&self) -> CycleResult<Vec<Transaction>> {
        let mut transactions: Vec<_> = self.read()?.values().cloned().collect();
        transactions.sort_by(|a, b| {
            b.timestamp
                .cmp(&a.timestamp)
                .then(b.created_at.cmp(&a.created_at))
        });
        Ok(transactions)
    }

    /// The most recently inserted transactions, newest first
    pub fn recent(&self, limit: usize) -> CycleResult<Vec<Transaction>> {
        let mut transactions: Vec<_> = self.read()?.values().cloned().collect();
        transactions.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then(b.timestamp.cmp(&a.timestamp))
        });
        transactions.truncate(limit);
        Ok(transactions)
    }

    /// Find a transaction by full id, "txn-" display form or hex prefix
    ///
    /// A prefix matching more than one transaction is rejected.
    pub fn find_by_reference(&self, reference: &str) -> CycleResult<Option<Transaction>> {
        let data = self.read()?;
        let mut matches = data.values().filter(|t| t.id.matches_reference(reference));

        let first = matches.next().cloned();
        if first.is_some() && matches.next().is_some() {
            return Err(CycleError::Validation(format!(
                "Reference '{}' matches more than one transaction",
                reference
            )));
        }
        Ok(first)
    }

    /// Insert or replace a transaction
    pub fn upsert(&self, txn: Transaction) -> CycleResult<()> {
        self.write()?.insert(txn.id, txn);
        Ok(())
    }

    /// Delete a transaction, returning it if it existed
    pub fn delete(&self, id: TransactionId) -> CycleResult<Option<Transaction>> {
        Ok(self.write()?.remove(&id))
    }

    pub fn count(&self) -> CycleResult<usize> {
        Ok(self.read()?.len())
    }
}

impl TransactionStore for TransactionRepository {
    /// Every transaction that can contribute an entry on or before the hint's end
    ///
    /// Installments never precede the purchase, so anything stamped after the
    /// hint's end is dropped. The cut-off is padded by a day to stay clear of
    /// timezone offsets between the stored instant and the civil date.
    fn read_all(&self, hint: Option<&DateRange>) -> CycleResult<Vec<Transaction>> {
        let all = self.get_all()?;
        Ok(match hint.and_then(|range| range.end().succ_opt()) {
            Some(cutoff) => all
                .into_iter()
                .filter(|t| t.timestamp.date_naive() <= cutoff)
                .collect(),
            None => all,
        })
    }
}
