//! Core data models for the shift payroll engine.
//!
//! This module contains all the domain models used throughout the engine.

mod actor;
mod payslip;
mod relationship;
mod report;
mod shift;
mod timesheet;

pub use actor::Actor;
pub use payslip::{
    Payslip, PayslipDetail, PayslipItem, PayslipItemType, PayslipStatus, PayslipSummary,
    compute_pay,
};
pub use relationship::{Relationship, RelationshipStatus};
pub use report::{ReportRow, ReportSummary, ReportTotals};
pub use shift::{AssignmentStatus, Shift, ShiftAssignment, ShiftNotes, ShiftStatus};
pub use timesheet::{Timesheet, TimesheetStatus};
