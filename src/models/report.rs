//! Report summary models handed to the document renderer.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// One shift line in a provider report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    /// The shift this row describes.
    pub shift_id: Uuid,
    /// Display name of the worker.
    pub worker_name: String,
    /// Display name of the client, or the missing-value label.
    pub client_name: String,
    /// Date the shift was scheduled to start.
    pub shift_date: NaiveDate,
    /// Scheduled start time (`HH:MM`).
    pub scheduled_start: String,
    /// Scheduled end time (`HH:MM`).
    pub scheduled_end: String,
    /// Clock-in time (`HH:MM`), or the missing-value label.
    pub clock_in: String,
    /// Clock-out time (`HH:MM`), or the missing-value label.
    pub clock_out: String,
    /// Unpaid break recorded on the timesheet.
    pub break_minutes: i32,
    /// Worked hours from the timesheet; zero without one.
    pub total_hours: Decimal,
}

/// Aggregates over all rows of a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportTotals {
    /// Number of rows.
    pub total_shifts: usize,
    /// Sum of `total_hours` over the rows.
    pub total_hours: Decimal,
    /// Number of distinct worker names.
    pub unique_workers: usize,
}

/// A report-ready summary of a provider's shifts in a date range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// The provider the report was built for.
    pub provider_id: Uuid,
    /// First day of the range (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the range (inclusive).
    pub end_date: NaiveDate,
    /// One row per shift, ordered by scheduled start.
    pub rows: Vec<ReportRow>,
    /// Aggregates over `rows`.
    pub totals: ReportTotals,
}
