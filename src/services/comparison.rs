//! Comparison engine
//!
//! Finds the period preceding a given one and compares totals between them.
//! Periods are compared at their real lengths: the transition period is 44
//! days long and its neighbours are not.

use std::fmt;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::models::{DateRange, InvoicePeriod, Money};

use super::cycle::CycleResolver;

/// How the previous period is derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ComparisonMode {
    /// The previous invoice month's billing period
    InvoiceCycle,
    /// A range of the same length ending the day before
    ArbitraryRange,
}

/// Change between two totals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Variance {
    pub absolute: Money,
    /// Percentage change rounded to 2 decimals
    pub percentage: Decimal,
    /// Spending appeared where there was none before
    pub is_new: bool,
}

impl fmt::Display for Variance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_new {
            return write!(f, "new");
        }
        let mut pct = self.percentage;
        pct.rescale(2);
        let sign = if pct > Decimal::ZERO { "+" } else { "" };
        write!(f, "{}{}%", sign, pct)
    }
}

/// Variance of `current` against `previous`
///
/// A zero previous total yields 100% flagged new when spending appeared and
/// 0% otherwise. The percentage base is the magnitude of `previous`, so a
/// drop in refunds reads as an increase.
pub fn compute_variance(current: Money, previous: Money) -> Variance {
    let absolute = current - previous;

    if previous.is_zero() {
        let is_new = current.is_positive();
        return Variance {
            absolute,
            percentage: if is_new {
                Decimal::ONE_HUNDRED
            } else {
                Decimal::ZERO
            },
            is_new,
        };
    }

    let percentage = (absolute.amount() * Decimal::ONE_HUNDRED)
        .checked_div(previous.amount().abs())
        .unwrap_or_default()
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    Variance {
        absolute,
        percentage,
        is_new: false,
    }
}

/// Average spend per day over the range's actual length
pub fn daily_average(total: Money, range: &DateRange) -> Money {
    match u32::try_from(range.duration_days()) {
        Ok(days) if days > 0 => total.divide(days),
        _ => Money::zero(),
    }
}

/// Derives comparison periods
#[derive(Debug, Clone, Copy)]
pub struct ComparisonEngine<'a> {
    resolver: CycleResolver<'a>,
}

impl<'a> ComparisonEngine<'a> {
    pub fn new(resolver: CycleResolver<'a>) -> Self {
        Self { resolver }
    }

    /// The billing period of the invoice month before `current`'s
    pub fn previous_invoice_period(&self, current: &InvoicePeriod) -> InvoicePeriod {
        self.resolver
            .period_for_invoice_month(current.invoice_month.prev())
    }

    /// The period to compare `current` against
    ///
    /// In invoice-cycle mode the current range is identified by the invoice
    /// month its last day is billed under.
    pub fn previous_period(&self, current: &DateRange, mode: ComparisonMode) -> DateRange {
        match mode {
            ComparisonMode::InvoiceCycle => {
                let period = self.resolver.resolve_invoice_month(current.end());
                self.previous_invoice_period(&period).range
            }
            ComparisonMode::ArbitraryRange => current.preceding(),
        }
    }
}
