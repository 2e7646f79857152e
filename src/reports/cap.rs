//! Cap report
//!
//! The full derivation of an invoice month's spending cap alongside what
//! has been billed in that invoice period.

use serde::Serialize;

use crate::error::CycleResult;
use crate::models::{InvoiceMonth, InvoicePeriod, Money, Transaction};
use crate::services::{AccountingCore, CapBreakdown};
use crate::storage::{HolidayCalendar, TransactionStore};

#[derive(Debug, Clone, Serialize)]
pub struct CapReport {
    pub invoice_month: InvoiceMonth,
    pub period: InvoicePeriod,
    /// `None` when the month precedes cap activation
    pub breakdown: Option<CapBreakdown>,
    pub spent: Money,
}

impl CapReport {
    pub fn generate<S, H>(
        core: &AccountingCore<'_>,
        store: &S,
        holidays: &H,
        invoice_month: InvoiceMonth,
    ) -> CycleResult<Self>
    where
        S: TransactionStore + ?Sized,
        H: HolidayCalendar + ?Sized,
    {
        let period = core.period_for_invoice_month(invoice_month);
        let transactions = store.read_all(Some(&period.range))?;
        let spent = core
            .aggregate(&transactions, &period.range, |_: &Transaction| true, None)
            .total;

        Ok(Self {
            invoice_month,
            period,
            breakdown: core.compute_cap(invoice_month, holidays),
            spent,
        })
    }

    /// Cap left after what was billed, when a cap applies
    pub fn remaining(&self) -> Option<Money> {
        self.breakdown.map(|b| b.net_cap - self.spent)
    }

    pub fn format_terminal(&self, symbol: &str) -> String {
        let money = |m: Money| m.format_with_symbol(symbol);
        let mut output = String::new();

        output.push_str(&format!(
            "Cap for invoice {} ({})\n",
            self.invoice_month, self.period.range
        ));
        output.push_str(&"=".repeat(50));
        output.push('\n');

        let Some(b) = &self.breakdown else {
            output.push_str("No cap: this month precedes cap activation\n");
            return output;
        };

        let line = |label: &str, value: String| format!("{:<30} {:>18}\n", label, value);

        output.push_str(&line("Work month", b.work_month.to_string()));
        output.push_str(&line("Business days", b.business_days_total.to_string()));
        output.push_str(&line("Holidays", format!("-{}", b.holidays_subtracted)));
        output.push_str(&line("Days worked", b.business_days_worked.to_string()));
        output.push_str(&"-".repeat(50));
        output.push('\n');
        output.push_str(&line("Gross income", money(b.gross_income)));
        output.push_str(&line("Accounting fee", money(-b.deductions.accounting_fee)));
        output.push_str(&line("Tax", money(-b.deductions.tax)));
        output.push_str(&line("INSS", money(-b.deductions.inss)));
        output.push_str(&line("Percent discount", money(-b.percent_discount)));
        output.push_str(&line("Fixed discount", money(-b.fixed_discount)));
        output.push_str(&"-".repeat(50));
        output.push('\n');
        output.push_str(&line("Net cap", money(b.net_cap)));
        output.push_str(&line("Daily cap", money(b.daily_cap)));
        output.push_str(&line("Billed in period", money(self.spent)));
        if let Some(remaining) = self.remaining() {
            output.push_str(&line("Remaining", money(remaining)));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Settings;
    use crate::services::CivilClock;
    use chrono::{FixedOffset, NaiveDate, NaiveTime};
    use rust_decimal_macros::dec;
    use std::collections::BTreeMap;

    fn clock() -> CivilClock {
        CivilClock::new(FixedOffset::west_opt(3 * 3600).unwrap())
    }

    #[test]
    fn test_cap_report() {
        let mut settings = Settings::default();
        settings.cap.hourly_rate = dec!(100);
        settings.cap.tax_percent = dec!(6);
        let core = AccountingCore::with_clock(&settings, clock());

        let noon = NaiveTime::from_hms_opt(12, 0, 0).unwrap();
        let on = NaiveDate::from_ymd_opt(2025, 2, 10).unwrap();
        let store = vec![Transaction::new(
            clock().instant_at(on, noon),
            Money::from_cents(100000),
            "Aluguel",
        )
        .with_metadata("Moradia", "Casa", "Pix")];

        let mut holidays = BTreeMap::new();
        holidays.insert(InvoiceMonth::new(2025, 2).unwrap(), 2);

        let report =
            CapReport::generate(&core, &store, &holidays, InvoiceMonth::new(2025, 3).unwrap())
                .unwrap();
        let breakdown = report.breakdown.unwrap();
        assert_eq!(breakdown.business_days_worked, 18);
        assert_eq!(breakdown.net_cap, Money::from_cents(1_353_600));
        assert_eq!(report.spent, Money::from_cents(100000));
        assert_eq!(report.remaining(), Some(Money::from_cents(1_253_600)));

        let text = report.format_terminal("R$");
        assert!(text.contains("Days worked"));
        assert!(text.contains("-R$ 864.00"));
    }

    #[test]
    fn test_cap_report_before_activation() {
        let settings = Settings::default();
        let core = AccountingCore::with_clock(&settings, clock());
        let holidays: BTreeMap<InvoiceMonth, u32> = BTreeMap::new();
        let store: Vec<Transaction> = Vec::new();

        let report =
            CapReport::generate(&core, &store, &holidays, InvoiceMonth::new(2024, 6).unwrap())
                .unwrap();
        assert!(report.breakdown.is_none());
        assert!(report.remaining().is_none());
        assert!(report.format_terminal("R$").contains("precedes cap activation"));
    }
}
