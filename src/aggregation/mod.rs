//! Weekly Client-Hour Aggregator.
//!
//! Sums a worker's scheduled hours against one client within a week
//! window, for billing caps and reporting. Payroll never reads these
//! figures; it uses approved timesheet hours instead.

mod weekly;

pub use weekly::{ClientWeekTotal, WeeklyAggregator, WeeklyClientHours, start_of_week};
