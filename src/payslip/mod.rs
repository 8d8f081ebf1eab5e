//! Payslip generation from approved timesheets.

mod generator;

pub use generator::{GeneratePayslip, PayslipGenerator, PayslipUpdate};
