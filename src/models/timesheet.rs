//! Timesheet model and its status transition table.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a timesheet.
///
/// Timesheets move `draft → submitted → {approved | rejected}` and never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimesheetStatus {
    /// Clocked in, possibly clocked out, not yet submitted.
    #[default]
    Draft,
    /// Submitted by the worker for provider review.
    Submitted,
    /// Approved by the provider; eligible for payslips.
    Approved,
    /// Rejected by the provider.
    Rejected,
}

impl TimesheetStatus {
    /// Returns true if the transition `self → next` is in the table.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_payroll::models::TimesheetStatus;
    ///
    /// assert!(TimesheetStatus::Draft.can_transition_to(TimesheetStatus::Submitted));
    /// assert!(!TimesheetStatus::Draft.can_transition_to(TimesheetStatus::Approved));
    /// assert!(!TimesheetStatus::Approved.can_transition_to(TimesheetStatus::Rejected));
    /// ```
    pub fn can_transition_to(self, next: TimesheetStatus) -> bool {
        matches!(
            (self, next),
            (TimesheetStatus::Draft, TimesheetStatus::Submitted)
                | (TimesheetStatus::Submitted, TimesheetStatus::Approved)
                | (TimesheetStatus::Submitted, TimesheetStatus::Rejected)
        )
    }

    /// Returns the status as its wire string.
    pub fn as_str(self) -> &'static str {
        match self {
            TimesheetStatus::Draft => "draft",
            TimesheetStatus::Submitted => "submitted",
            TimesheetStatus::Approved => "approved",
            TimesheetStatus::Rejected => "rejected",
        }
    }
}

/// An actual clock-in/clock-out record against a shift.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timesheet {
    /// Unique identifier for the timesheet.
    pub id: Uuid,
    /// The shift the time was worked against.
    pub shift_id: Uuid,
    /// The worker who clocked in.
    pub support_worker_id: Uuid,
    /// Clock-in time.
    pub start_time: NaiveDateTime,
    /// Clock-out time; `None` until the worker clocks out.
    pub end_time: Option<NaiveDateTime>,
    /// Unpaid break taken during the shift.
    pub break_minutes: i32,
    /// Worked hours, derived at clock-out.
    pub total_hours: Option<Decimal>,
    /// Free-text notes from the worker.
    #[serde(default)]
    pub notes: Option<String>,
    /// Lifecycle status.
    pub status: TimesheetStatus,
    /// When the timesheet was created (clock-in was recorded).
    pub created_at: DateTime<Utc>,
    /// When the timesheet was last changed.
    pub updated_at: DateTime<Utc>,
}

impl Timesheet {
    /// Hours this timesheet contributes to totals; zero until clocked out.
    pub fn hours_or_zero(&self) -> Decimal {
        self.total_hours.unwrap_or(Decimal::ZERO)
    }
}
