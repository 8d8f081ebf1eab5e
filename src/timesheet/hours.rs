//! Worked-hours calculation for clocked time.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use tracing::warn;

use crate::error::{EngineError, EngineResult};

/// Calculates worked hours for a clock-in/clock-out pair.
///
/// `hours = max(0, (minutes between start and end − break_minutes) / 60)`.
///
/// # Errors
///
/// Returns a `Validation` error if `end` is before `start` or if
/// `break_minutes` is negative.
///
/// # Examples
///
/// ```
/// use shift_payroll::timesheet::calculate_worked_hours;
/// use chrono::NaiveDateTime;
/// use rust_decimal::Decimal;
///
/// let start = NaiveDateTime::parse_from_str("2026-01-15 08:00:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// let end = NaiveDateTime::parse_from_str("2026-01-15 16:30:00", "%Y-%m-%d %H:%M:%S").unwrap();
/// assert_eq!(calculate_worked_hours(start, end, 30).unwrap(), Decimal::from(8));
/// ```
pub fn calculate_worked_hours(
    start: NaiveDateTime,
    end: NaiveDateTime,
    break_minutes: i32,
) -> EngineResult<Decimal> {
    if break_minutes < 0 {
        return Err(EngineError::validation(
            "break_minutes",
            format!("break of {} minutes is negative", break_minutes),
        ));
    }
    if end < start {
        return Err(EngineError::validation(
            "end_time",
            format!("clock-out {} is before clock-in {}", end, start),
        ));
    }

    let elapsed_minutes = (end - start).num_minutes();
    let worked_minutes = elapsed_minutes - i64::from(break_minutes);
    if worked_minutes < 0 {
        // A break longer than the shift counts as zero worked time.
        warn!(elapsed_minutes, break_minutes, "break exceeds elapsed time");
        return Ok(Decimal::ZERO);
    }

    Ok(Decimal::from(worked_minutes) / Decimal::from(60))
}
