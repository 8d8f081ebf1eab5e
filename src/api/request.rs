//! Request types for the shift payroll API.
//!
//! Bodies that map one-to-one onto an engine input (`NewShift`, `ClockIn`,
//! `GeneratePayslip`, ...) are deserialized straight into that type; the
//! structs here cover the remaining bodies and query strings.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::AssignmentStatus;

/// Body of `POST /relationships`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkWorkerRequest {
    /// The worker to link to the calling provider.
    pub support_worker_id: Uuid,
    /// Default hourly rate for the pair.
    pub hourly_rate: Decimal,
}

/// Body of `POST /shifts/:id/assignments`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignRequest {
    /// The worker to assign.
    pub support_worker_id: Uuid,
}

/// Body of `PATCH /assignments/:id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentStatusRequest {
    /// The new status.
    pub status: AssignmentStatus,
}

/// Optional body of `POST /timesheets/:id/reject`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RejectRequest {
    /// Why the timesheet was rejected.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Query of `GET /shifts`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftListQuery {
    /// Earliest start date (inclusive).
    #[serde(default)]
    pub from: Option<NaiveDate>,
    /// Latest start date (inclusive).
    #[serde(default)]
    pub to: Option<NaiveDate>,
}

/// Query of the weekly client-hour endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WeekQuery {
    /// First day of the week window.
    #[serde(default)]
    pub week_start: Option<NaiveDate>,
}

/// Query of the per-worker payslip endpoints.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PayslipQuery {
    /// The provider side of the pair; defaults to the calling provider.
    #[serde(default)]
    pub provider_id: Option<Uuid>,
}

/// Query of `GET /reports`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportQuery {
    /// First day of the report (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the report (inclusive).
    pub end_date: NaiveDate,
}
