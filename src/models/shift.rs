//! Shift, assignment and shift-notes models.
//!
//! A [`Shift`] is the scheduled block of work. [`ShiftAssignment`] tracks the
//! offer of a shift to a worker independently of the shift's own status, and
//! [`ShiftNotes`] is the only place a client is attached to a shift.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a shift.
///
/// Transitions are caller-controlled: any status may be set from any other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftStatus {
    /// The shift is planned but has not started.
    #[default]
    Scheduled,
    /// The shift is underway.
    InProgress,
    /// The shift has finished.
    Completed,
    /// The shift will not take place.
    Cancelled,
}

/// A scheduled block of work for one worker on behalf of one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shift {
    /// Unique identifier for the shift.
    pub id: Uuid,
    /// The worker scheduled for the shift.
    pub support_worker_id: Uuid,
    /// The provider that owns the shift.
    pub service_provider_id: Uuid,
    /// Short description of the shift.
    pub title: String,
    /// Scheduled start.
    pub start_time: NaiveDateTime,
    /// Scheduled end.
    pub end_time: NaiveDateTime,
    /// Free-text location.
    #[serde(default)]
    pub location: Option<String>,
    /// Lifecycle status.
    pub status: ShiftStatus,
    /// Hourly rate agreed for this shift, if different from the relationship rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
    /// When the shift was created.
    pub created_at: DateTime<Utc>,
}

impl Shift {
    /// Returns the scheduled duration of the shift in hours.
    ///
    /// This is the planned duration and is independent of any timesheet.
    ///
    /// # Examples
    ///
    /// ```
    /// use shift_payroll::models::{Shift, ShiftStatus};
    /// use chrono::{NaiveDateTime, Utc};
    /// use rust_decimal::Decimal;
    /// use uuid::Uuid;
    ///
    /// let format = "%Y-%m-%d %H:%M:%S";
    /// let (start, end) = ("2026-01-15 09:00:00", "2026-01-15 13:30:00");
    /// let shift = Shift {
    ///     id: Uuid::new_v4(),
    ///     support_worker_id: Uuid::new_v4(),
    ///     service_provider_id: Uuid::new_v4(),
    ///     title: "Morning support".to_string(),
    ///     start_time: NaiveDateTime::parse_from_str(start, format).unwrap(),
    ///     end_time: NaiveDateTime::parse_from_str(end, format).unwrap(),
    ///     location: None,
    ///     status: ShiftStatus::Scheduled,
    ///     hourly_rate: None,
    ///     created_at: Utc::now(),
    /// };
    /// assert_eq!(shift.scheduled_hours(), Decimal::new(45, 1)); // 4.5 hours
    /// ```
    pub fn scheduled_hours(&self) -> Decimal {
        let minutes = (self.end_time - self.start_time).num_minutes();
        Decimal::from(minutes) / Decimal::from(60)
    }
}

/// Status of a worker's assignment to a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    /// Offered to the worker, no response yet.
    #[default]
    Assigned,
    /// The worker accepted the shift.
    Accepted,
    /// The worker declined the shift.
    Declined,
    /// The assigned work was carried out.
    Completed,
}

/// The offer of a shift to a particular worker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftAssignment {
    /// Unique identifier for the assignment.
    pub id: Uuid,
    /// The shift being offered.
    pub shift_id: Uuid,
    /// The worker the shift is offered to.
    pub support_worker_id: Uuid,
    /// Assignment status.
    pub status: AssignmentStatus,
    /// When the assignment was created.
    pub created_at: DateTime<Utc>,
}

/// Client details and care instructions attached to a shift (1:1).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftNotes {
    /// The shift the notes belong to.
    pub shift_id: Uuid,
    /// The client receiving support.
    pub client_id: Uuid,
    /// Display name of the client.
    pub client_name: String,
    /// What the worker is expected to do.
    #[serde(default)]
    pub task_description: Option<String>,
    /// Anything the worker must be aware of.
    #[serde(default)]
    pub special_requirements: Option<String>,
}
