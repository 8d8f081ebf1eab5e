//! Shift payroll engine for support worker providers.
//!
//! This crate schedules shifts, records clocked time on timesheets,
//! aggregates scheduled hours per client per week and turns approved
//! timesheet hours into payslips with auditable line items. It also
//! compiles report-ready summaries for an external document renderer.

#![warn(missing_docs)]

pub mod aggregation;
pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod identity;
pub mod models;
pub mod payslip;
pub mod relationships;
pub mod report;
pub mod scheduling;
pub mod store;
pub mod timesheet;

#[cfg(test)]
mod test_support;
