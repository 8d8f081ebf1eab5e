//! Configuration types for the shift payroll engine.
//!
//! This module contains the strongly-typed configuration structures that
//! are deserialized from YAML configuration files.

use chrono::Weekday;
use rust_decimal::Decimal;
use serde::Deserialize;

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    /// The socket address the API listens on (e.g., "0.0.0.0:3000").
    pub bind_address: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Default `tracing` filter directive, used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

/// Contents of `settings.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// HTTP server settings.
    pub server: ServerSettings,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// The first day of a billing week.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeekStart {
    /// Weeks run Monday to Sunday.
    #[default]
    Monday,
    /// Weeks run Tuesday to Monday.
    Tuesday,
    /// Weeks run Wednesday to Tuesday.
    Wednesday,
    /// Weeks run Thursday to Wednesday.
    Thursday,
    /// Weeks run Friday to Thursday.
    Friday,
    /// Weeks run Saturday to Friday.
    Saturday,
    /// Weeks run Sunday to Saturday.
    Sunday,
}

impl From<WeekStart> for Weekday {
    fn from(start: WeekStart) -> Self {
        match start {
            WeekStart::Monday => Weekday::Mon,
            WeekStart::Tuesday => Weekday::Tue,
            WeekStart::Wednesday => Weekday::Wed,
            WeekStart::Thursday => Weekday::Thu,
            WeekStart::Friday => Weekday::Fri,
            WeekStart::Saturday => Weekday::Sat,
            WeekStart::Sunday => Weekday::Sun,
        }
    }
}

/// Report compilation settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ReportSettings {
    /// Placeholder used for values that are absent (no notes, no timesheet).
    pub missing_value_label: String,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            missing_value_label: "N/A".to_string(),
        }
    }
}

/// Payslip generation settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PayslipSettings {
    /// Deductions applied when a generation request does not supply any.
    pub default_deductions: Decimal,
}

/// Contents of `payroll.yaml`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PayrollSettings {
    /// The first day of the week used for weekly client-hour windows.
    pub week_starts_on: WeekStart,
    /// Report compilation settings.
    pub report: ReportSettings,
    /// Payslip generation settings.
    pub payslip: PayslipSettings,
}

/// The complete engine configuration loaded from YAML files.
#[derive(Debug, Clone, Default)]
pub struct EngineConfig {
    settings: Settings,
    payroll: PayrollSettings,
}

impl EngineConfig {
    /// Creates a new EngineConfig from its component parts.
    pub fn new(settings: Settings, payroll: PayrollSettings) -> Self {
        Self { settings, payroll }
    }

    /// Returns the process-level settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the payroll rule settings.
    pub fn payroll(&self) -> &PayrollSettings {
        &self.payroll
    }
}
