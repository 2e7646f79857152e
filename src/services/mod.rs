//! Service layer for cyclebook
//!
//! The temporal-accounting core lives here. Every component is a plain value
//! borrowing the validated [`Settings`]; none of them holds mutable state or
//! reads the environment. [`AccountingCore`] wires them together and exposes
//! the eight core operations in one place.

pub mod aggregate;
pub mod amortization;
pub mod calendar;
pub mod cap;
pub mod comparison;
pub mod cycle;
pub mod transaction;

pub use aggregate::{
    normalize, Aggregate, EntryFilter, GroupKey, GroupTotal, MatchedEntry, PeriodAggregator,
};
pub use amortization::{AmortizationExpander, ExpandedEntry, InstallmentSchedule};
pub use calendar::CivilClock;
pub use cap::{CapBreakdown, CapCalculator, DeductionBreakdown};
pub use comparison::{compute_variance, daily_average, ComparisonEngine, ComparisonMode, Variance};
pub use cycle::{CycleResolver, Regime};
pub use transaction::{CreateTransactionInput, TransactionService};

use chrono::NaiveDate;

use crate::config::Settings;
use crate::models::{DateRange, InvoiceMonth, InvoicePeriod, Money, Transaction};
use crate::storage::HolidayCalendar;

/// Entry point to the accounting core, built once from validated settings
#[derive(Debug, Clone, Copy)]
pub struct AccountingCore<'a> {
    settings: &'a Settings,
    clock: CivilClock,
}

impl<'a> AccountingCore<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self {
            settings,
            clock: CivilClock::from_settings(settings),
        }
    }

    /// Use a specific clock instead of the configured offset
    pub fn with_clock(settings: &'a Settings, clock: CivilClock) -> Self {
        Self { settings, clock }
    }

    pub fn settings(&self) -> &'a Settings {
        self.settings
    }

    pub fn clock(&self) -> CivilClock {
        self.clock
    }

    pub fn resolver(&self) -> CycleResolver<'a> {
        CycleResolver::new(&self.settings.cycle)
    }

    pub fn expander(&self) -> AmortizationExpander<'a> {
        AmortizationExpander::new(self.resolver(), self.clock)
    }

    pub fn aggregator(&self) -> PeriodAggregator<'a> {
        PeriodAggregator::new(self.expander())
    }

    pub fn comparison(&self) -> ComparisonEngine<'a> {
        ComparisonEngine::new(self.resolver())
    }

    pub fn resolve_invoice_month(&self, date: NaiveDate) -> InvoicePeriod {
        self.resolver().resolve_invoice_month(date)
    }

    pub fn period_for_invoice_month(&self, month: InvoiceMonth) -> InvoicePeriod {
        self.resolver().period_for_invoice_month(month)
    }

    pub fn expand(&self, transaction: &Transaction) -> Vec<ExpandedEntry> {
        self.expander().expand(transaction)
    }

    pub fn aggregate<'t, I, P>(
        &self,
        transactions: I,
        range: &DateRange,
        predicate: P,
        group: Option<GroupKey>,
    ) -> Aggregate
    where
        I: IntoIterator<Item = &'t Transaction>,
        P: Fn(&Transaction) -> bool,
    {
        self.aggregator()
            .aggregate(transactions, range, predicate, group)
    }

    pub fn previous_period(&self, current: &DateRange, mode: ComparisonMode) -> DateRange {
        self.comparison().previous_period(current, mode)
    }

    pub fn compute_variance(&self, current: Money, previous: Money) -> Variance {
        compute_variance(current, previous)
    }

    pub fn daily_average(&self, total: Money, range: &DateRange) -> Money {
        daily_average(total, range)
    }

    pub fn compute_cap<H>(&self, month: InvoiceMonth, holidays: &H) -> Option<CapBreakdown>
    where
        H: HolidayCalendar + ?Sized,
    {
        CapCalculator::new(&self.settings.cap, holidays).compute_cap(month)
    }
}
