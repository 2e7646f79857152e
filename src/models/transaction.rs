//! Transaction model
//!
//! An expense as captured at entry time. Positive amounts are purchases,
//! negative amounts are refunds. A purchase may be split into installments,
//! which are expanded on demand and never stored.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::TransactionId;
use super::money::Money;

/// Upper bound on installments per purchase
pub const MAX_INSTALLMENTS: u32 = 48;

fn default_installment_count() -> u32 {
    1
}

/// A recorded expense
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Unique identifier
    pub id: TransactionId,

    /// When the expense happened; mapped to a civil date before any cycle math
    pub timestamp: DateTime<Utc>,

    /// Total amount (negative for refunds)
    pub amount: Money,

    /// Number of installments the total is spread across
    #[serde(default = "default_installment_count")]
    pub installment_count: u32,

    #[serde(default)]
    pub category: String,

    #[serde(default)]
    pub tag: String,

    /// Payment method (card, pix, cash...)
    #[serde(default)]
    pub method: String,

    #[serde(default)]
    pub description: String,

    /// When the record was inserted
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Create a single-installment transaction
    pub fn new(timestamp: DateTime<Utc>, amount: Money, description: impl Into<String>) -> Self {
        Self {
            id: TransactionId::new(),
            timestamp,
            amount,
            installment_count: 1,
            category: String::new(),
            tag: String::new(),
            method: String::new(),
            description: description.into(),
            created_at: Utc::now(),
        }
    }

    /// Set the installment count
    pub fn with_installments(mut self, installment_count: u32) -> Self {
        self.installment_count = installment_count;
        self
    }

    /// Set category, tag and method in one go
    pub fn with_metadata(
        mut self,
        category: impl Into<String>,
        tag: impl Into<String>,
        method: impl Into<String>,
    ) -> Self {
        self.category = category.into();
        self.tag = tag.into();
        self.method = method.into();
        self
    }

    /// The civil date of this transaction in the given timezone
    pub fn civil_date(&self, offset: &FixedOffset) -> NaiveDate {
        self.timestamp.with_timezone(offset).date_naive()
    }

    /// Check if the total is spread over more than one invoice
    pub fn is_installment(&self) -> bool {
        self.installment_count > 1
    }

    /// Check if this is a refund (negative amount)
    pub fn is_refund(&self) -> bool {
        self.amount.is_negative()
    }

    /// Validate the transaction
    pub fn validate(&self) -> Result<(), TransactionValidationError> {
        if self.installment_count == 0 {
            return Err(TransactionValidationError::ZeroInstallments);
        }

        if self.installment_count > MAX_INSTALLMENTS {
            return Err(TransactionValidationError::TooManyInstallments {
                installment_count: self.installment_count,
            });
        }

        if self.is_refund() && self.is_installment() {
            return Err(TransactionValidationError::RefundWithInstallments {
                installment_count: self.installment_count,
            });
        }

        if self.amount.is_zero() {
            return Err(TransactionValidationError::ZeroAmount);
        }

        if self.description.trim().is_empty() {
            return Err(TransactionValidationError::MissingField("description"));
        }

        if self.method.trim().is_empty() {
            return Err(TransactionValidationError::MissingField("method"));
        }

        if self.category.trim().is_empty() {
            return Err(TransactionValidationError::MissingField("category"));
        }

        Ok(())
    }
}

/// Validation errors for transactions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransactionValidationError {
    ZeroInstallments,
    TooManyInstallments { installment_count: u32 },
    RefundWithInstallments { installment_count: u32 },
    ZeroAmount,
    MissingField(&'static str),
}

impl fmt::Display for TransactionValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroInstallments => write!(f, "Installment count must be at least 1"),
            Self::TooManyInstallments { installment_count } => write!(
                f,
                "Installment count must be at most {} (got {})",
                MAX_INSTALLMENTS, installment_count
            ),
            Self::RefundWithInstallments { installment_count } => write!(
                f,
                "Refunds cannot be split into installments (got {})",
                installment_count
            ),
            Self::ZeroAmount => write!(f, "Amount cannot be zero"),
            Self::MissingField(field) => write!(f, "Missing {}", field),
        }
    }
}

impl std::error::Error for TransactionValidationError {}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Transaction {
        let ts = Utc.with_ymd_and_hms(2025, 9, 10, 15, 0, 0).unwrap();
        Transaction::new(ts, Money::from_cents(60000), "Notebook").with_metadata(
            "Eletrônicos",
            "Pessoal",
            "Crédito",
        )
    }

    #[test]
    fn test_new_transaction() {
        let txn = sample();
        assert_eq!(txn.installment_count, 1);
        assert!(!txn.is_installment());
        assert!(!txn.is_refund());
        assert!(txn.validate().is_ok());
    }

    #[test]
    fn test_civil_date_uses_offset() {
        // 01:30 UTC is still the previous evening in UTC-3
        let ts = Utc.with_ymd_and_hms(2025, 10, 4, 1, 30, 0).unwrap();
        let txn = Transaction::new(ts, Money::from_cents(100), "Late snack");
        let sao_paulo = FixedOffset::west_opt(3 * 3600).unwrap();

        assert_eq!(
            txn.civil_date(&sao_paulo),
            NaiveDate::from_ymd_opt(2025, 10, 3).unwrap()
        );
        assert_eq!(
            txn.civil_date(&FixedOffset::east_opt(0).unwrap()),
            NaiveDate::from_ymd_opt(2025, 10, 4).unwrap()
        );
    }

    #[test]
    fn test_validate_rejects_refund_installments() {
        let mut txn = sample().with_installments(3);
        txn.amount = Money::from_cents(-60000);
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::RefundWithInstallments {
                installment_count: 3
            })
        );
    }

    #[test]
    fn test_validate_rejects_zero_installments() {
        let txn = sample().with_installments(0);
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::ZeroInstallments)
        );
    }

    #[test]
    fn test_validate_rejects_too_many_installments() {
        assert!(sample().with_installments(MAX_INSTALLMENTS).validate().is_ok());

        let txn = sample().with_installments(1_000_000);
        let err = txn.validate().unwrap_err();
        assert_eq!(
            err,
            TransactionValidationError::TooManyInstallments {
                installment_count: 1_000_000
            }
        );
        assert!(err.to_string().contains("at most 48"));
    }

    #[test]
    fn test_validate_requires_fields() {
        let mut txn = sample();
        txn.method = "  ".into();
        assert_eq!(
            txn.validate(),
            Err(TransactionValidationError::MissingField("method"))
        );
    }

    #[test]
    fn test_deserialize_defaults_installments() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "timestamp": "2025-09-10T15:00:00Z",
            "amount": "42.00",
            "created_at": "2025-09-10T15:00:00Z"
        }"#;
        let txn: Transaction = serde_json::from_str(json).unwrap();
        assert_eq!(txn.installment_count, 1);
        assert_eq!(txn.amount, Money::from_cents(4200));
    }
}
