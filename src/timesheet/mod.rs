//! Timesheet Engine.
//!
//! Records clock-in/clock-out against shifts, derives worked hours and
//! enforces the `draft → submitted → {approved | rejected}` lifecycle.
//! Only approved timesheets feed payslips.

mod engine;
mod hours;

pub use engine::{ClockIn, ClockOut, TimesheetEngine, TimesheetSummary};
pub use hours::calculate_worked_hours;
