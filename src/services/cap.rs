//! Budget cap calculator
//!
//! Derives the spending ceiling for an invoice month from the income earned
//! in the calendar month before it: business days worked, times hours and
//! rate, minus taxes, fees and discounts. Every intermediate value is exact;
//! the breakdown is rounded to cents once, on the way out.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::config::CapSettings;
use crate::models::{InvoiceMonth, Money};
use crate::storage::HolidayCalendar;

use super::calendar::weekday_count;

/// Deduction lines subtracted from gross income
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DeductionBreakdown {
    pub accounting_fee: Money,
    pub tax: Money,
    /// Social security over the pro-labore share of gross income
    pub inss: Money,
    pub total: Money,
}

/// Full derivation of one month's cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapBreakdown {
    pub invoice_month: InvoiceMonth,
    /// Calendar month the income was earned in
    pub work_month: InvoiceMonth,
    pub business_days_total: u32,
    pub holidays_subtracted: u32,
    pub business_days_worked: u32,
    pub gross_income: Money,
    pub deductions: DeductionBreakdown,
    pub percent_discount: Money,
    pub fixed_discount: Money,
    pub net_cap: Money,
    /// Net cap per day worked, zero when no day was worked
    pub daily_cap: Money,
}

/// Computes monthly spending caps
pub struct CapCalculator<'a, H: HolidayCalendar + ?Sized> {
    settings: &'a CapSettings,
    holidays: &'a H,
}

impl<'a, H: HolidayCalendar + ?Sized> CapCalculator<'a, H> {
    pub fn new(settings: &'a CapSettings, holidays: &'a H) -> Self {
        Self { settings, holidays }
    }

    /// Business days in a work month before holidays
    pub fn business_days(&self, work_month: InvoiceMonth) -> u32 {
        match self.settings.business_days_override {
            Some(over) if over.month == work_month => over.days,
            _ => weekday_count(work_month),
        }
    }

    /// Cap for an invoice month, `None` before the cap was activated
    pub fn compute_cap(&self, invoice_month: InvoiceMonth) -> Option<CapBreakdown> {
        let cap = self.settings;
        let work_month = invoice_month.prev();

        if work_month < cap.cap_activation {
            return None;
        }

        let business_days_total = self.business_days(work_month);
        let holidays = self.holidays.holidays(work_month);
        if holidays > business_days_total {
            tracing::warn!(
                %work_month,
                holidays,
                business_days_total,
                "more holidays than business days, clamping days worked to zero"
            );
        }
        let business_days_worked = business_days_total.saturating_sub(holidays);

        let gross_income = Money::from_decimal(
            Decimal::from(business_days_worked) * cap.daily_hours * cap.hourly_rate,
        );

        let accounting_fee = if work_month >= cap.accounting_activation {
            Money::from_decimal(cap.accounting_fee)
        } else {
            Money::zero()
        };
        let tax = gross_income.percent(cap.tax_percent);
        let inss = gross_income
            .percent(cap.pro_labore_percent)
            .percent(cap.inss_percent);
        let deductions_total = accounting_fee + tax + inss;

        let after_deductions = gross_income - deductions_total;
        let percent_discount = after_deductions.percent(cap.percent_discount);
        let fixed_discount = Money::from_decimal(cap.fixed_discount);
        let net_cap = after_deductions - percent_discount - fixed_discount;
        let daily_cap = net_cap.divide(business_days_worked);

        Some(CapBreakdown {
            invoice_month,
            work_month,
            business_days_total,
            holidays_subtracted: holidays,
            business_days_worked,
            gross_income: gross_income.round(),
            deductions: DeductionBreakdown {
                accounting_fee: accounting_fee.round(),
                tax: tax.round(),
                inss: inss.round(),
                total: deductions_total.round(),
            },
            percent_discount: percent_discount.round(),
            fixed_discount: fixed_discount.round(),
            net_cap: net_cap.round(),
            daily_cap: daily_cap.round(),
        })
    }
}
