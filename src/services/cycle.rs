//! Cycle resolver
//!
//! Maps civil dates to invoice periods across three chronological regimes:
//!
//! - **Legacy**: before `change_date`, cycles reset on `reset_day_old`
//! - **Transition**: `[change_date, transition_end]`, one fixed window billed
//!   under a single invoice month
//! - **New**: after `transition_end`, cycles reset on `reset_day_new`
//!
//! In the legacy and new regimes a date on or after the reset day belongs to
//! the next month's invoice; earlier days belong to the current month's.

use chrono::{Datelike, NaiveDate};

use crate::config::CycleSettings;
use crate::models::{DateRange, InvoiceMonth, InvoicePeriod};

use super::calendar::CivilClock;

/// The billing regime a date or invoice month belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Regime {
    Legacy,
    Transition,
    New,
}

/// Resolves dates to invoice periods and back
#[derive(Debug, Clone, Copy)]
pub struct CycleResolver<'a> {
    cycle: &'a CycleSettings,
}

impl<'a> CycleResolver<'a> {
    /// Create a resolver over validated cycle settings
    pub fn new(cycle: &'a CycleSettings) -> Self {
        Self { cycle }
    }

    pub fn settings(&self) -> &'a CycleSettings {
        self.cycle
    }

    /// Regime a civil date falls in
    pub fn regime(&self, date: NaiveDate) -> Regime {
        if date < self.cycle.change_date {
            Regime::Legacy
        } else if date <= self.cycle.transition_end {
            Regime::Transition
        } else {
            Regime::New
        }
    }

    /// Regime an invoice month is billed under
    pub fn regime_of_month(&self, month: InvoiceMonth) -> Regime {
        let transition = self.cycle.transition_invoice_month();
        if month < transition {
            Regime::Legacy
        } else if month == transition {
            Regime::Transition
        } else {
            Regime::New
        }
    }

    /// Invoice month a civil date is billed under
    pub fn invoice_month_for(&self, date: NaiveDate) -> InvoiceMonth {
        let reset_day = match self.regime(date) {
            Regime::Transition => return self.cycle.transition_invoice_month(),
            Regime::Legacy => self.cycle.reset_day_old,
            Regime::New => self.cycle.reset_day_new,
        };

        let month = InvoiceMonth::containing(date);
        if date.day() >= reset_day {
            month.next()
        } else {
            month
        }
    }

    /// The invoice period containing a civil date
    pub fn resolve_invoice_month(&self, date: NaiveDate) -> InvoicePeriod {
        self.period_for_invoice_month(self.invoice_month_for(date))
    }

    /// The billing period reported under an invoice month
    ///
    /// Runs from the reset day of the prior month through the day before the
    /// reset day of the invoice month. The transition month is always the
    /// fixed window.
    pub fn period_for_invoice_month(&self, month: InvoiceMonth) -> InvoicePeriod {
        let reset_day = match self.regime_of_month(month) {
            Regime::Transition => return self.transition_period(),
            Regime::Legacy => self.cycle.reset_day_old,
            Regime::New => self.cycle.reset_day_new,
        };

        let start = month.prev().day(reset_day);
        let next_start = month.day(reset_day);
        let end = next_start.pred_opt().unwrap_or(next_start);

        InvoicePeriod {
            invoice_month: month,
            range: DateRange::spanning(start, end),
        }
    }

    /// The one-time transition period
    pub fn transition_period(&self) -> InvoicePeriod {
        InvoicePeriod {
            invoice_month: self.cycle.transition_invoice_month(),
            range: DateRange::spanning(self.cycle.change_date, self.cycle.transition_end),
        }
    }

    /// Whether an installment dated here snaps to the first new cycle day
    ///
    /// The window is half-open: `[change_date, transition_end)`.
    pub fn in_snap_window(&self, date: NaiveDate) -> bool {
        date >= self.cycle.change_date && date < self.cycle.transition_end
    }

    /// The invoice period containing today
    pub fn current_period(&self, clock: &CivilClock) -> InvoicePeriod {
        self.resolve_invoice_month(clock.today())
    }

    /// Periods for every invoice month from `from` through `to`, inclusive
    pub fn periods_between(&self, from: InvoiceMonth, to: InvoiceMonth) -> Vec<InvoicePeriod> {
        from.through(to)
            .map(|month| self.period_for_invoice_month(month))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn month(y: i32, m: u32) -> InvoiceMonth {
        InvoiceMonth::new(y, m).unwrap()
    }

    fn settings() -> CycleSettings {
        CycleSettings {
            reset_day_old: 4,
            reset_day_new: 17,
            change_date: date(2025, 10, 4),
            transition_end: date(2025, 11, 16),
        }
    }

    #[test]
    fn test_legacy_reset_day_boundary() {
        let cycle = settings();
        let resolver = CycleResolver::new(&cycle);

        assert_eq!(resolver.invoice_month_for(date(2025, 9, 3)), month(2025, 9));
        assert_eq!(resolver.invoice_month_for(date(2025, 9, 4)), month(2025, 10));
        assert_eq!(resolver.invoice_month_for(date(2025, 9, 30)), month(2025, 10));
        assert_eq!(resolver.invoice_month_for(date(2025, 10, 3)), month(2025, 10));
    }

    #[test]
    fn test_transition_absorbs_every_day() {
        let cycle = settings();
        let resolver = CycleResolver::new(&cycle);

        let mut day = date(2025, 10, 4);
        while day <= date(2025, 11, 16) {
            assert_eq!(resolver.invoice_month_for(day), month(2025, 11), "{}", day);
            assert_eq!(resolver.regime(day), Regime::Transition);
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_new_regime() {
        let cycle = settings();
        let resolver = CycleResolver::new(&cycle);

        assert_eq!(resolver.invoice_month_for(date(2025, 11, 17)), month(2025, 12));
        assert_eq!(resolver.invoice_month_for(date(2025, 12, 16)), month(2025, 12));
        assert_eq!(resolver.invoice_month_for(date(2025, 12, 17)), month(2026, 1));
        assert_eq!(resolver.invoice_month_for(date(2026, 1, 16)), month(2026, 1));
        assert_eq!(resolver.invoice_month_for(date(2026, 1, 17)), month(2026, 2));
    }

    #[test]
    fn test_year_boundary_legacy() {
        let cycle = settings();
        let resolver = CycleResolver::new(&cycle);

        assert_eq!(resolver.invoice_month_for(date(2024, 12, 4)), month(2025, 1));
        assert_eq!(resolver.invoice_month_for(date(2025, 1, 3)), month(2025, 1));
    }

    #[test]
    fn test_period_for_invoice_month() {
        let cycle = settings();
        let resolver = CycleResolver::new(&cycle);

        let sep = resolver.period_for_invoice_month(month(2025, 9));
        assert_eq!((sep.start(), sep.end()), (date(2025, 8, 4), date(2025, 9, 3)));

        let oct = resolver.period_for_invoice_month(month(2025, 10));
        assert_eq!((oct.start(), oct.end()), (date(2025, 9, 4), date(2025, 10, 3)));
        assert_eq!(oct.duration_days(), 30);

        let nov = resolver.period_for_invoice_month(month(2025, 11));
        assert_eq!((nov.start(), nov.end()), (date(2025, 10, 4), date(2025, 11, 16)));
        assert_eq!(nov.duration_days(), 44);

        let dec = resolver.period_for_invoice_month(month(2025, 12));
        assert_eq!((dec.start(), dec.end()), (date(2025, 11, 17), date(2025, 12, 16)));

        let jan = resolver.period_for_invoice_month(month(2026, 1));
        assert_eq!((jan.start(), jan.end()), (date(2025, 12, 17), date(2026, 1, 16)));
    }

    #[test]
    fn test_periods_tile_without_gaps() {
        let cycle = settings();
        let resolver = CycleResolver::new(&cycle);

        let periods = resolver.periods_between(month(2024, 1), month(2027, 12));
        for pair in periods.windows(2) {
            assert_eq!(
                pair[0].end().succ_opt().unwrap(),
                pair[1].start(),
                "gap or overlap between {} and {}",
                pair[0],
                pair[1]
            );
        }
    }

    #[test]
    fn test_resolved_period_contains_date() {
        let cycle = settings();
        let resolver = CycleResolver::new(&cycle);

        let mut day = date(2024, 1, 1);
        while day <= date(2027, 12, 31) {
            let period = resolver.resolve_invoice_month(day);
            assert!(period.contains(day), "{} not in {}", day, period);
            // Stable across repeated calls
            assert_eq!(period, resolver.resolve_invoice_month(day));
            day = day.succ_opt().unwrap();
        }
    }

    #[test]
    fn test_reset_day_one() {
        let cycle = CycleSettings {
            reset_day_old: 1,
            reset_day_new: 1,
            change_date: date(2030, 3, 1),
            transition_end: date(2030, 3, 31),
        };
        assert!(cycle.validate().is_ok());
        let resolver = CycleResolver::new(&cycle);

        let feb = resolver.period_for_invoice_month(month(2024, 3));
        assert_eq!((feb.start(), feb.end()), (date(2024, 2, 1), date(2024, 2, 29)));
        assert_eq!(resolver.invoice_month_for(date(2024, 2, 1)), month(2024, 3));
    }

    #[test]
    fn test_snap_window_is_half_open() {
        let cycle = settings();
        let resolver = CycleResolver::new(&cycle);

        assert!(!resolver.in_snap_window(date(2025, 10, 3)));
        assert!(resolver.in_snap_window(date(2025, 10, 4)));
        assert!(resolver.in_snap_window(date(2025, 11, 15)));
        assert!(!resolver.in_snap_window(date(2025, 11, 16)));
    }
}
