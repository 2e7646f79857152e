//! User settings for cyclebook
//!
//! Holds the static configuration of the accounting core: the billing cycle
//! regimes, the civil timezone, and the parameters of the spending cap. The
//! settings are loaded once, validated, and handed to each service by
//! reference.

use chrono::format::{Item, StrftimeItems};
use chrono::{Datelike, FixedOffset, NaiveDate, Offset, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::paths::CyclePaths;
use crate::error::{CycleError, CycleResult};
use crate::models::InvoiceMonth;

/// Billing cycle regimes: legacy reset day, one-time transition window, new reset day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CycleSettings {
    /// Day of month the legacy cycle resets on
    pub reset_day_old: u32,

    /// Day of month the new cycle resets on
    pub reset_day_new: u32,

    /// First day of the transition window
    pub change_date: NaiveDate,

    /// Last day of the transition window (inclusive)
    pub transition_end: NaiveDate,
}

impl Default for CycleSettings {
    fn default() -> Self {
        Self {
            reset_day_old: 4,
            reset_day_new: 17,
            change_date: NaiveDate::from_ymd_opt(2025, 10, 4).unwrap_or_default(),
            transition_end: NaiveDate::from_ymd_opt(2025, 11, 16).unwrap_or_default(),
        }
    }
}

impl CycleSettings {
    /// The invoice month the whole transition window is reported under
    pub fn transition_invoice_month(&self) -> InvoiceMonth {
        InvoiceMonth::containing(self.change_date).next()
    }

    /// First day of the new regime
    pub fn first_new_cycle_day(&self) -> NaiveDate {
        self.transition_end.succ_opt().unwrap_or(self.transition_end)
    }

    /// Check the regimes tile the calendar without gaps or overlaps
    pub fn validate(&self) -> CycleResult<()> {
        for (name, day) in [
            ("reset_day_old", self.reset_day_old),
            ("reset_day_new", self.reset_day_new),
        ] {
            if !(1..=28).contains(&day) {
                return Err(CycleError::InvalidConfiguration(format!(
                    "{} must be within 1-28, got {}",
                    name, day
                )));
            }
        }

        if self.change_date > self.transition_end {
            return Err(CycleError::InvalidConfiguration(format!(
                "change_date {} is after transition_end {}",
                self.change_date, self.transition_end
            )));
        }

        if self.change_date.day() != self.reset_day_old {
            return Err(CycleError::InvalidConfiguration(format!(
                "change_date {} must fall on reset_day_old ({}) so the last legacy cycle ends the day before",
                self.change_date, self.reset_day_old
            )));
        }

        let first_new = self.first_new_cycle_day();
        if first_new.day() != self.reset_day_new
            || InvoiceMonth::containing(first_new) != self.transition_invoice_month()
        {
            return Err(CycleError::InvalidConfiguration(format!(
                "the day after transition_end ({}) must be day {} of {}",
                first_new,
                self.reset_day_new,
                self.transition_invoice_month()
            )));
        }

        Ok(())
    }
}

/// A fixed business-day count for one partially worked month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessDaysOverride {
    /// Calendar (work) month the override applies to
    pub month: InvoiceMonth,
    pub days: u32,
}

/// Parameters of the monthly spending cap
///
/// Percent fields are expressed in percent units: 6 means 6%.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapSettings {
    pub hourly_rate: Decimal,
    pub daily_hours: Decimal,
    pub tax_percent: Decimal,
    /// Share of gross income declared as pro-labore
    pub pro_labore_percent: Decimal,
    /// Social security rate applied over the pro-labore share
    pub inss_percent: Decimal,
    pub percent_discount: Decimal,
    pub fixed_discount: Decimal,
    pub accounting_fee: Decimal,
    /// First calendar month the accounting fee is charged
    pub accounting_activation: InvoiceMonth,
    /// First calendar month a cap is computed for
    pub cap_activation: InvoiceMonth,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub business_days_override: Option<BusinessDaysOverride>,
}

impl Default for CapSettings {
    fn default() -> Self {
        let activation =
            InvoiceMonth::containing(NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default());
        Self {
            hourly_rate: Decimal::ZERO,
            daily_hours: dec!(8),
            tax_percent: Decimal::ZERO,
            pro_labore_percent: Decimal::ZERO,
            inss_percent: Decimal::ZERO,
            percent_discount: Decimal::ZERO,
            fixed_discount: Decimal::ZERO,
            accounting_fee: Decimal::ZERO,
            accounting_activation: activation,
            cap_activation: activation,
            business_days_override: None,
        }
    }
}

impl CapSettings {
    pub fn validate(&self) -> CycleResult<()> {
        for (name, value) in [
            ("hourly_rate", self.hourly_rate),
            ("fixed_discount", self.fixed_discount),
            ("accounting_fee", self.accounting_fee),
        ] {
            if value < Decimal::ZERO {
                return Err(CycleError::InvalidConfiguration(format!(
                    "{} cannot be negative, got {}",
                    name, value
                )));
            }
        }

        for (name, value) in [
            ("tax_percent", self.tax_percent),
            ("pro_labore_percent", self.pro_labore_percent),
            ("inss_percent", self.inss_percent),
            ("percent_discount", self.percent_discount),
        ] {
            if value < Decimal::ZERO || value > Decimal::ONE_HUNDRED {
                return Err(CycleError::InvalidConfiguration(format!(
                    "{} must be within 0-100, got {}",
                    name, value
                )));
            }
        }

        if self.daily_hours < Decimal::ZERO || self.daily_hours > dec!(24) {
            return Err(CycleError::InvalidConfiguration(format!(
                "daily_hours must be within 0-24, got {}",
                self.daily_hours
            )));
        }

        if let Some(over) = &self.business_days_override {
            if over.days > 23 {
                return Err(CycleError::InvalidConfiguration(format!(
                    "business_days_override for {} cannot exceed 23 days, got {}",
                    over.month, over.days
                )));
            }
        }

        Ok(())
    }
}

/// User settings for cyclebook
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Schema version for migration support
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,

    /// Civil timezone as a fixed offset from UTC, in minutes
    #[serde(default = "default_utc_offset_minutes")]
    pub utc_offset_minutes: i32,

    /// Currency symbol used in terminal output
    #[serde(default = "default_currency")]
    pub currency_symbol: String,

    /// Date format preference (strftime format)
    #[serde(default = "default_date_format")]
    pub date_format: String,

    #[serde(default)]
    pub cycle: CycleSettings,

    #[serde(default)]
    pub cap: CapSettings,
}

fn default_schema_version() -> u32 {
    1
}

fn default_utc_offset_minutes() -> i32 {
    -180 // America/Sao_Paulo
}

fn default_currency() -> String {
    "R$".to_string()
}

fn default_date_format() -> String {
    "%d/%m/%Y".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            schema_version: default_schema_version(),
            utc_offset_minutes: default_utc_offset_minutes(),
            currency_symbol: default_currency(),
            date_format: default_date_format(),
            cycle: CycleSettings::default(),
            cap: CapSettings::default(),
        }
    }
}

impl Settings {
    /// The civil timezone every date computation is anchored to
    pub fn civil_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_minutes * 60).unwrap_or_else(|| Utc.fix())
    }

    /// Validate every section; a defect here is fatal at startup
    pub fn validate(&self) -> CycleResult<()> {
        if self.utc_offset_minutes.abs() >= 24 * 60 {
            return Err(CycleError::InvalidConfiguration(format!(
                "utc_offset_minutes must be within +/-1439, got {}",
                self.utc_offset_minutes
            )));
        }
        if self.date_format.trim().is_empty()
            || StrftimeItems::new(&self.date_format).any(|item| matches!(item, Item::Error))
        {
            return Err(CycleError::InvalidConfiguration(format!(
                "date_format is not a valid strftime pattern: '{}'",
                self.date_format
            )));
        }
        self.cycle.validate()?;
        self.cap.validate()?;
        Ok(())
    }

    /// Load settings from disk, or fall back to defaults if the file doesn't exist
    ///
    /// The result is always validated.
    pub fn load_or_create(paths: &CyclePaths) -> CycleResult<Self> {
        let settings_path = paths.settings_file();

        let settings = if settings_path.exists() {
            let contents = std::fs::read_to_string(&settings_path)
                .map_err(|e| CycleError::Io(format!("Failed to read settings file: {}", e)))?;

            serde_json::from_str::<Settings>(&contents).map_err(|e| {
                CycleError::InvalidConfiguration(format!("Failed to parse settings file: {}", e))
            })?
        } else {
            // Don't save yet - let caller decide when to persist
            Settings::default()
        };

        settings.validate()?;
        tracing::debug!(
            path = %settings_path.display(),
            transition = %settings.cycle.transition_invoice_month(),
            "settings loaded"
        );
        Ok(settings)
    }

    /// Save settings to disk
    pub fn save(&self, paths: &CyclePaths) -> CycleResult<()> {
        paths.ensure_directories()?;

        let settings_path = paths.settings_file();
        let contents = serde_json::to_string_pretty(self).map_err(|e| {
            CycleError::InvalidConfiguration(format!("Failed to serialize settings: {}", e))
        })?;

        std::fs::write(&settings_path, contents)
            .map_err(|e| CycleError::Io(format!("Failed to write settings file: {}", e)))?;

        Ok(())
    }
}
