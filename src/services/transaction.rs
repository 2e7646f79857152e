//! Transaction service
//!
//! The creation boundary: every transaction is validated here before it
//! reaches storage, so the accounting core can assume well-formed input.

use chrono::{NaiveDate, NaiveTime, Utc};

use crate::error::{CycleError, CycleResult};
use crate::models::{Money, Transaction};
use crate::storage::Storage;

use super::calendar::CivilClock;

/// Input for creating a new transaction
#[derive(Debug, Clone)]
pub struct CreateTransactionInput {
    pub amount: Money,
    pub description: String,
    pub method: String,
    pub category: String,
    pub tag: Option<String>,
    /// Number of installments, 1 for a single payment
    pub installments: u32,
    /// Civil date of the purchase; now when absent
    pub date: Option<NaiveDate>,
    /// Wall-clock time on `date`; noon when absent
    pub time: Option<NaiveTime>,
}

impl CreateTransactionInput {
    pub fn new(
        amount: Money,
        description: impl Into<String>,
        method: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            amount,
            description: description.into(),
            method: method.into(),
            category: category.into(),
            tag: None,
            installments: 1,
            date: None,
            time: None,
        }
    }
}

fn clean(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Service for transaction management
pub struct TransactionService<'a> {
    storage: &'a Storage,
    clock: CivilClock,
}

impl<'a> TransactionService<'a> {
    pub fn new(storage: &'a Storage, clock: CivilClock) -> Self {
        Self { storage, clock }
    }

    /// Validate and store a new transaction
    pub fn create(&self, input: CreateTransactionInput) -> CycleResult<Transaction> {
        if input.date.is_none() && input.time.is_some() {
            return Err(CycleError::Validation(
                "A time can only be given together with a date".into(),
            ));
        }

        let timestamp = match input.date {
            Some(date) => {
                let time = input
                    .time
                    .or_else(|| NaiveTime::from_hms_opt(12, 0, 0))
                    .unwrap_or_default();
                self.clock.instant_at(date, time)
            }
            None => Utc::now(),
        };

        let txn = Transaction::new(timestamp, input.amount, clean(&input.description))
            .with_installments(input.installments)
            .with_metadata(
                clean(&input.category),
                input.tag.as_deref().map(clean).unwrap_or_default(),
                clean(&input.method),
            );

        txn.validate()
            .map_err(|e| CycleError::InvalidTransaction(e.to_string()))?;

        self.storage.transactions.upsert(txn.clone())?;
        self.storage.transactions.save()?;

        tracing::debug!(
            id = %txn.id,
            date = %self.clock.date_of(&txn.timestamp),
            installments = txn.installment_count,
            "transaction created"
        );
        Ok(txn)
    }

    /// The most recently entered transactions, newest first
    pub fn list_recent(&self, limit: usize) -> CycleResult<Vec<Transaction>> {
        self.storage.transactions.recent(limit)
    }

    /// Look up a transaction by id reference
    pub fn find(&self, reference: &str) -> CycleResult<Transaction> {
        self.storage
            .transactions
            .find_by_reference(reference)?
            .ok_or_else(|| CycleError::transaction_not_found(reference))
    }

    /// Delete a transaction by id reference
    pub fn delete(&self, reference: &str) -> CycleResult<Transaction> {
        let txn = self.find(reference)?;
        self.storage.transactions.delete(txn.id)?;
        self.storage.transactions.save()?;
        Ok(txn)
    }

    /// Delete the most recently entered transaction
    pub fn undo_last(&self) -> CycleResult<Transaction> {
        let last = self
            .list_recent(1)?
            .into_iter()
            .next()
            .ok_or_else(|| CycleError::Validation("There are no transactions to undo".into()))?;

        self.storage.transactions.delete(last.id)?;
        self.storage.transactions.save()?;
        tracing::debug!(id = %last.id, "last transaction removed");
        Ok(last)
    }
}
