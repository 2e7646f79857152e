//! Invoice month and date range representation
//!
//! An invoice month is the calendar label a billing period is reported under.
//! The label is decided by the period's end date; the period itself is a
//! contiguous, inclusive range of civil dates.

use chrono::{Datelike, Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{CycleError, CycleResult};

/// A calendar month used as an invoice label (e.g., "2025-11")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoiceMonth {
    /// First day of the labelled month
    first_day: NaiveDate,
}

impl InvoiceMonth {
    /// Create an invoice month, `None` if the month is out of range
    pub fn new(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// The calendar month containing `date`
    pub fn containing(date: NaiveDate) -> Self {
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    pub fn year(&self) -> i32 {
        self.first_day.year()
    }

    pub fn month(&self) -> u32 {
        self.first_day.month()
    }

    /// First day of the labelled calendar month
    pub fn first_day(&self) -> NaiveDate {
        self.first_day
    }

    /// Last day of the labelled calendar month
    pub fn last_day(&self) -> NaiveDate {
        self.next().first_day.pred_opt().unwrap_or(self.first_day)
    }

    /// Number of days in the labelled calendar month
    pub fn days_in_month(&self) -> u32 {
        self.last_day().day()
    }

    /// The given day of this month; callers pass days valid in every month
    pub fn day(&self, day: u32) -> NaiveDate {
        self.first_day
            .checked_add_days(Days::new(u64::from(day.saturating_sub(1))))
            .unwrap_or(self.first_day)
    }

    /// Shift by a signed number of months
    pub fn offset(&self, months: i32) -> Self {
        let shifted = if months >= 0 {
            self.first_day.checked_add_months(Months::new(months.unsigned_abs()))
        } else {
            self.first_day.checked_sub_months(Months::new(months.unsigned_abs()))
        };
        Self {
            first_day: shifted.unwrap_or(self.first_day),
        }
    }

    /// Get the next month
    pub fn next(&self) -> Self {
        self.offset(1)
    }

    /// Get the previous month
    pub fn prev(&self) -> Self {
        self.offset(-1)
    }

    /// Whole months from `self` to `other` (negative when `other` is earlier)
    pub fn months_until(&self, other: &InvoiceMonth) -> i32 {
        (other.year() - self.year()) * 12 + other.month() as i32 - self.month() as i32
    }

    /// Every month from `self` through `end`, inclusive; empty when `end < self`
    pub fn through(self, end: InvoiceMonth) -> impl Iterator<Item = InvoiceMonth> {
        let count = self.months_until(&end).max(-1) + 1;
        (0..count).map(move |i| self.offset(i))
    }

    /// Parse "YYYY-MM" (also accepts "MM/YYYY")
    pub fn parse(s: &str) -> Result<Self, PeriodParseError> {
        let s = s.trim();
        let invalid = || PeriodParseError::InvalidFormat(s.to_string());

        let (year, month) = if let Some((month, year)) = s.split_once('/') {
            (year, month)
        } else {
            s.split_once('-').ok_or_else(invalid)?
        };

        let year: i32 = year.trim().parse().map_err(|_| invalid())?;
        let month: u32 = month.trim().parse().map_err(|_| invalid())?;

        if !(1..=12).contains(&month) {
            return Err(PeriodParseError::InvalidMonth(month));
        }

        Self::new(year, month).ok_or_else(invalid)
    }
}

impl fmt::Display for InvoiceMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year(), self.month())
    }
}

impl TryFrom<String> for InvoiceMonth {
    type Error = PeriodParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<InvoiceMonth> for String {
    fn from(month: InvoiceMonth) -> Self {
        month.to_string()
    }
}

/// An inclusive range of civil dates with `start <= end`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawDateRange")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

#[derive(Deserialize)]
struct RawDateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RawDateRange> for DateRange {
    type Error = CycleError;

    fn try_from(raw: RawDateRange) -> Result<Self, Self::Error> {
        DateRange::new(raw.start, raw.end)
    }
}

impl DateRange {
    /// Create a range, rejecting `start > end`
    pub fn new(start: NaiveDate, end: NaiveDate) -> CycleResult<Self> {
        if start > end {
            return Err(CycleError::OutOfRangeQuery { start, end });
        }
        Ok(Self { start, end })
    }

    /// A range between two dates given in either order
    pub fn spanning(a: NaiveDate, b: NaiveDate) -> Self {
        Self {
            start: a.min(b),
            end: a.max(b),
        }
    }

    /// A range covering a single day
    pub fn single_day(date: NaiveDate) -> Self {
        Self {
            start: date,
            end: date,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days covered, both ends inclusive (always at least 1)
    pub fn duration_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }

    /// Check if a date falls within this range
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// The range of identical length ending the day before this one starts
    pub fn preceding(&self) -> Self {
        let span = self.end - self.start;
        let end = self.start.pred_opt().unwrap_or(self.start);
        Self {
            start: end - span,
            end,
        }
    }

    /// Parse "YYYY-MM-DD..YYYY-MM-DD"
    pub fn parse(s: &str) -> CycleResult<Self> {
        let (start, end) = s.trim().split_once("..").ok_or_else(|| {
            CycleError::Validation(format!(
                "Invalid date range: {}. Use YYYY-MM-DD..YYYY-MM-DD",
                s
            ))
        })?;
        let parse = |value: &str| {
            NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
                CycleError::Validation(format!("Invalid date: {}. Use YYYY-MM-DD", value))
            })
        };
        Self::new(parse(start)?, parse(end)?)
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}..{}",
            self.start.format("%Y-%m-%d"),
            self.end.format("%Y-%m-%d")
        )
    }
}

/// A billing period together with the invoice month it is reported under
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InvoicePeriod {
    pub invoice_month: InvoiceMonth,
    pub range: DateRange,
}

impl InvoicePeriod {
    pub fn start(&self) -> NaiveDate {
        self.range.start()
    }

    pub fn end(&self) -> NaiveDate {
        self.range.end()
    }

    pub fn duration_days(&self) -> i64 {
        self.range.duration_days()
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.range.contains(date)
    }
}

impl fmt::Display for InvoicePeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.invoice_month, self.range)
    }
}

/// Error type for period parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeriodParseError {
    InvalidFormat(String),
    InvalidMonth(u32),
}

impl fmt::Display for PeriodParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PeriodParseError::InvalidFormat(s) => write!(f, "Invalid invoice month format: {}", s),
            PeriodParseError::InvalidMonth(m) => write!(f, "Invalid month: {}", m),
        }
    }
}

impl std::error::Error for PeriodParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_month_navigation() {
        let jan = InvoiceMonth::new(2025, 1).unwrap();
        assert_eq!(jan.next(), InvoiceMonth::new(2025, 2).unwrap());
        assert_eq!(jan.prev(), InvoiceMonth::new(2024, 12).unwrap());
        assert_eq!(jan.offset(13), InvoiceMonth::new(2026, 2).unwrap());
        assert_eq!(jan.last_day(), date(2025, 1, 31));
        assert_eq!(InvoiceMonth::new(2024, 2).unwrap().days_in_month(), 29);
    }

    #[test]
    fn test_months_through() {
        let from = InvoiceMonth::new(2025, 11).unwrap();
        let to = InvoiceMonth::new(2026, 2).unwrap();
        let months: Vec<String> = from.through(to).map(|m| m.to_string()).collect();
        assert_eq!(months, vec!["2025-11", "2025-12", "2026-01", "2026-02"]);
        assert_eq!(to.through(from).count(), 0);
        assert_eq!(from.through(from).count(), 1);
    }

    #[test]
    fn test_parse_month() {
        assert_eq!(
            InvoiceMonth::parse("2025-11").unwrap(),
            InvoiceMonth::new(2025, 11).unwrap()
        );
        assert_eq!(
            InvoiceMonth::parse("11/2025").unwrap(),
            InvoiceMonth::new(2025, 11).unwrap()
        );
        assert_eq!(
            InvoiceMonth::parse("2025-13"),
            Err(PeriodParseError::InvalidMonth(13))
        );
        assert!(InvoiceMonth::parse("November").is_err());
    }

    #[test]
    fn test_month_serialization() {
        let month = InvoiceMonth::new(2025, 11).unwrap();
        let json = serde_json::to_string(&month).unwrap();
        assert_eq!(json, "\"2025-11\"");
        let back: InvoiceMonth = serde_json::from_str(&json).unwrap();
        assert_eq!(back, month);
    }

    #[test]
    fn test_range_rejects_inverted_bounds() {
        let err = DateRange::new(date(2025, 3, 10), date(2025, 3, 1)).unwrap_err();
        assert!(matches!(err, CycleError::OutOfRangeQuery { .. }));
    }

    #[test]
    fn test_range_deserialize_checks_bounds() {
        let range: DateRange =
            serde_json::from_str(r#"{"start":"2025-01-01","end":"2025-02-01"}"#).unwrap();
        assert_eq!(range.duration_days(), 32);

        let inverted =
            serde_json::from_str::<DateRange>(r#"{"start":"2025-02-01","end":"2025-01-01"}"#);
        assert!(inverted.is_err());
    }

    #[test]
    fn test_range_duration_and_preceding() {
        let range = DateRange::new(date(2025, 10, 4), date(2025, 11, 16)).unwrap();
        assert_eq!(range.duration_days(), 44);

        let before = range.preceding();
        assert_eq!(before.end(), date(2025, 10, 3));
        assert_eq!(before.duration_days(), 44);
        assert_eq!(DateRange::single_day(date(2025, 1, 1)).duration_days(), 1);
    }

    #[test]
    fn test_range_parse() {
        let range = DateRange::parse("2025-01-01..2025-01-15").unwrap();
        assert_eq!(range.to_string(), "2025-01-01..2025-01-15");
        assert!(DateRange::parse("2025-01-15..2025-01-01").is_err());
        assert!(DateRange::parse("2025-01-01").is_err());
    }
}
