//! Payslip models.
//!
//! This module contains the [`Payslip`] type and its line items. A payslip
//! is only ever created by generation from approved timesheets, and its
//! money fields are always derived from `total_hours`, `hourly_rate` and
//! `deductions`.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};

/// Lifecycle status of a payslip.
///
/// Payslips move `draft → issued → paid`, one step at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayslipStatus {
    /// Generated, still editable and deletable.
    #[default]
    Draft,
    /// Issued to the worker; frozen.
    Issued,
    /// Payment has been made.
    Paid,
}

impl PayslipStatus {
    /// Returns true if the transition `self → next` is in the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_payroll::models::PayslipStatus;
    ///
    /// assert!(PayslipStatus::Draft.can_transition_to(PayslipStatus::Issued));
    /// assert!(!PayslipStatus::Draft.can_transition_to(PayslipStatus::Paid));
    /// assert!(!PayslipStatus::Issued.can_transition_to(PayslipStatus::Issued));
    /// ```
    pub fn can_transition_to(self, next: PayslipStatus) -> bool {
        matches!(
            (self, next),
            (PayslipStatus::Draft, PayslipStatus::Issued)
                | (PayslipStatus::Issued, PayslipStatus::Paid)
        )
    }

    /// Returns the status as its wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            PayslipStatus::Draft => "draft",
            PayslipStatus::Issued => "issued",
            PayslipStatus::Paid => "paid",
        }
    }
}

/// Category of a payslip line item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayslipItemType {
    /// Hours worked at the payslip rate.
    ShiftHours,
    /// Overtime hours.
    Overtime,
    /// An allowance payment.
    Allowance,
    /// A deduction from gross pay.
    Deduction,
    /// Tax withheld.
    Tax,
    /// Anything else.
    Other,
}

/// A single line entry composing a payslip's totals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipItem {
    /// Unique identifier for the item.
    pub id: Uuid,
    /// The payslip that owns this item.
    pub payslip_id: Uuid,
    /// Category of the item.
    pub item_type: PayslipItemType,
    /// Human-readable description.
    pub description: String,
    /// Units (hours for `shift_hours`).
    pub quantity: Decimal,
    /// Rate per unit.
    pub rate: Decimal,
    /// Total for this line.
    pub amount: Decimal,
}

/// A computed pay statement for one worker over one period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payslip {
    /// Unique identifier for the payslip.
    pub id: Uuid,
    /// The worker being paid.
    pub support_worker_id: Uuid,
    /// The provider paying the worker.
    pub service_provider_id: Uuid,
    /// First day of the pay period (inclusive).
    pub pay_period_start_date: NaiveDate,
    /// Last day of the pay period (inclusive).
    pub pay_period_end_date: NaiveDate,
    /// Sum of approved timesheet hours in the period, fixed at generation.
    pub total_hours: Decimal,
    /// Rate applied to `total_hours`.
    pub hourly_rate: Decimal,
    /// `total_hours × hourly_rate`.
    pub gross_pay: Decimal,
    /// Single flat deductions figure.
    pub deductions: Decimal,
    /// `gross_pay − deductions`.
    pub net_pay: Decimal,
    /// Lifecycle status.
    pub status: PayslipStatus,
    /// Set when the payslip is issued.
    pub issued_date: Option<DateTime<Utc>>,
    /// Set when the payslip is marked paid.
    pub paid_date: Option<DateTime<Utc>>,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
    /// When the payslip was generated.
    pub created_at: DateTime<Utc>,
}

impl Payslip {
    /// Recomputes `gross_pay` and `net_pay` from the stored inputs.
    pub fn recompute_pay(&mut self) -> EngineResult<()> {
        let (gross, net) = compute_pay(self.total_hours, self.hourly_rate, self.deductions)?;
        self.gross_pay = gross;
        self.net_pay = net;
        Ok(())
    }
}

/// Returns `(gross_pay, net_pay)` for the given inputs.
///
/// Fails with a validation error when either figure does not fit in a
/// `Decimal`.
///
/// # Examples
///
/// ```
/// use shift_payroll::models::compute_pay;
/// use rust_decimal::Decimal;
///
/// let (gross, net) =
///     compute_pay(Decimal::from(20), Decimal::from(30), Decimal::from(20)).unwrap();
/// assert_eq!(gross, Decimal::from(600));
/// assert_eq!(net, Decimal::from(580));
///
/// assert!(compute_pay(Decimal::from(8), Decimal::MAX, Decimal::ZERO).is_err());
/// ```
pub fn compute_pay(
    total_hours: Decimal,
    hourly_rate: Decimal,
    deductions: Decimal,
) -> EngineResult<(Decimal, Decimal)> {
    let gross = total_hours.checked_mul(hourly_rate).ok_or_else(|| {
        EngineError::validation(
            "hourly_rate",
            format!("{} hours at {} overflows gross pay", total_hours, hourly_rate),
        )
    })?;
    let net = gross.checked_sub(deductions).ok_or_else(|| {
        EngineError::validation(
            "deductions",
            format!("deductions of {} overflow net pay", deductions),
        )
    })?;
    Ok((gross, net))
}

/// A payslip together with its line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipDetail {
    /// The payslip.
    #[serde(flatten)]
    pub payslip: Payslip,
    /// Its line items, in creation order.
    pub items: Vec<PayslipItem>,
}

/// Totals over all payslips between one worker and one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayslipSummary {
    /// Number of payslips of any status.
    pub total_payslips: usize,
    /// Sum of `net_pay` over paid payslips.
    pub total_paid: Decimal,
    /// Sum of `net_pay` over issued (not yet paid) payslips.
    pub total_pending: Decimal,
    /// The most recently generated payslip.
    pub last_payslip: Option<Payslip>,
}
