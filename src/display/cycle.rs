//! Invoice period display formatting

use tabled::Tabled;

use crate::models::InvoicePeriod;
use crate::services::{CycleResolver, Regime};

use super::render_table;

#[derive(Tabled)]
struct PeriodRow {
    #[tabled(rename = "Invoice")]
    invoice_month: String,
    #[tabled(rename = "Start")]
    start: String,
    #[tabled(rename = "End")]
    end: String,
    #[tabled(rename = "Days")]
    days: i64,
    #[tabled(rename = "Regime")]
    regime: &'static str,
}

fn regime_name(regime: Regime) -> &'static str {
    match regime {
        Regime::Legacy => "legacy",
        Regime::Transition => "transition",
        Regime::New => "new",
    }
}

/// Format a list of invoice periods as a table
pub fn format_period_table(periods: &[InvoicePeriod], resolver: &CycleResolver<'_>) -> String {
    if periods.is_empty() {
        return "No invoice months in range.\n".to_string();
    }

    let rows = periods
        .iter()
        .map(|period| PeriodRow {
            invoice_month: period.invoice_month.to_string(),
            start: period.start().format("%Y-%m-%d").to_string(),
            end: period.end().format("%Y-%m-%d").to_string(),
            days: period.duration_days(),
            regime: regime_name(resolver.regime_of_month(period.invoice_month)),
        })
        .collect();

    let mut output = render_table(rows);
    output.push('\n');
    output
}

/// Format one invoice period with its regime
pub fn format_period_details(period: &InvoicePeriod, resolver: &CycleResolver<'_>) -> String {
    let mut output = String::new();
    output.push_str(&format!("Invoice month: {}\n", period.invoice_month));
    output.push_str(&format!(
        "Period:        {} to {}\n",
        period.start().format("%Y-%m-%d"),
        period.end().format("%Y-%m-%d")
    ));
    output.push_str(&format!("Days:          {}\n", period.duration_days()));
    output.push_str(&format!(
        "Regime:        {}\n",
        regime_name(resolver.regime_of_month(period.invoice_month))
    ));
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CycleSettings;
    use crate::models::InvoiceMonth;

    #[test]
    fn test_period_table_marks_regimes() {
        let cycle = CycleSettings::default();
        let resolver = CycleResolver::new(&cycle);
        let periods = resolver.periods_between(
            InvoiceMonth::new(2025, 10).unwrap(),
            InvoiceMonth::new(2025, 12).unwrap(),
        );

        let output = format_period_table(&periods, &resolver);
        assert!(output.contains("2025-11"));
        assert!(output.contains("transition"));
        assert!(output.contains("legacy"));
        assert!(output.contains("44"));
        assert_eq!(format_period_table(&[], &resolver), "No invoice months in range.\n");
    }

    #[test]
    fn test_period_details() {
        let cycle = CycleSettings::default();
        let resolver = CycleResolver::new(&cycle);
        let period = resolver.period_for_invoice_month(InvoiceMonth::new(2025, 11).unwrap());

        let output = format_period_details(&period, &resolver);
        assert!(output.contains("Period:        2025-10-04 to 2025-11-16"));
        assert!(output.contains("Regime:        transition"));
    }
}
