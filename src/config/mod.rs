//! Configuration loading and management for the shift payroll engine.
//!
//! # Example
//!
//! ```no_run
//! use shift_payroll::config::ConfigLoader;
//!
//! let config = ConfigLoader::load("./config/default").unwrap();
//! println!("Weeks start on {:?}", config.payroll().week_starts_on);
//! ```

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{
    EngineConfig, LoggingSettings, PayrollSettings, PayslipSettings, ReportSettings,
    ServerSettings, Settings, WeekStart,
};
