//! Civil calendar arithmetic
//!
//! Every cycle computation works on civil dates in one fixed timezone. This
//! module owns the conversion from stored instants to civil dates and the
//! month/weekday arithmetic shared by the cycle and cap services.

use chrono::{
    DateTime, Datelike, Duration, FixedOffset, Months, NaiveDate, NaiveTime, Utc, Weekday,
};

use crate::config::Settings;
use crate::models::InvoiceMonth;

/// Converts instants to civil dates in a fixed timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CivilClock {
    offset: FixedOffset,
}

impl CivilClock {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.civil_offset())
    }

    pub fn offset(&self) -> &FixedOffset {
        &self.offset
    }

    /// The civil date an instant falls on
    pub fn date_of(&self, instant: &DateTime<Utc>) -> NaiveDate {
        instant.with_timezone(&self.offset).date_naive()
    }

    /// Today's civil date
    pub fn today(&self) -> NaiveDate {
        self.date_of(&Utc::now())
    }

    /// The instant of a civil date and wall-clock time
    pub fn instant_at(&self, date: NaiveDate, time: NaiveTime) -> DateTime<Utc> {
        let local = date.and_time(time);
        (local - Duration::seconds(i64::from(self.offset.local_minus_utc()))).and_utc()
    }
}

/// The same day one calendar month later, clamped to the end of shorter months
pub fn add_one_month(date: NaiveDate) -> NaiveDate {
    date.checked_add_months(Months::new(1)).unwrap_or(date)
}

/// Count Monday-Friday days in a calendar month
pub fn weekday_count(month: InvoiceMonth) -> u32 {
    month
        .first_day()
        .iter_days()
        .take_while(|d| d.month() == month.month())
        .filter(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun))
        .count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_of_respects_offset() {
        let clock = CivilClock::new(FixedOffset::west_opt(3 * 3600).unwrap());
        let instant = Utc.with_ymd_and_hms(2025, 11, 17, 2, 0, 0).unwrap();

        // 23:00 on the 16th in UTC-3: still inside the transition window
        assert_eq!(clock.date_of(&instant), date(2025, 11, 16));
    }

    #[test]
    fn test_instant_at_round_trips() {
        let clock = CivilClock::new(FixedOffset::west_opt(3 * 3600).unwrap());
        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let instant = clock.instant_at(date(2025, 10, 4), noon);

        assert_eq!(instant, Utc.with_ymd_and_hms(2025, 10, 4, 15, 0, 0).unwrap());
        assert_eq!(clock.date_of(&instant), date(2025, 10, 4));
    }

    #[test]
    fn test_add_one_month_clamps() {
        assert_eq!(add_one_month(date(2025, 1, 31)), date(2025, 2, 28));
        assert_eq!(add_one_month(date(2024, 1, 31)), date(2024, 2, 29));
        assert_eq!(add_one_month(date(2025, 12, 17)), date(2026, 1, 17));
    }

    #[test]
    fn test_weekday_count() {
        // February 2025 starts on a Saturday and has exactly four weeks
        assert_eq!(weekday_count(InvoiceMonth::new(2025, 2).unwrap()), 20);
        assert_eq!(weekday_count(InvoiceMonth::new(2025, 10).unwrap()), 23);
        assert_eq!(weekday_count(InvoiceMonth::new(2025, 11).unwrap()), 20);
    }
}
