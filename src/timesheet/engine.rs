//! Timesheet lifecycle: clock-in, clock-out, submit, approve and reject.

use std::sync::Arc;

use chrono::{NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::guard::{Requirement, RelationshipGuard, ensure_owner, require_worker};
use crate::models::{Actor, AssignmentStatus, Timesheet, TimesheetStatus};
use crate::store::{Store, Tables};

use super::hours::calculate_worked_hours;

/// Input for clocking in against a shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockIn {
    /// The shift being worked.
    pub shift_id: Uuid,
    /// Clock-in time.
    pub start_time: NaiveDateTime,
    /// Unpaid break expected during the shift.
    #[serde(default)]
    pub break_minutes: i32,
    /// Free-text notes.
    #[serde(default)]
    pub notes: Option<String>,
}

/// Input for clocking out of an open timesheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClockOut {
    /// Clock-out time.
    pub end_time: NaiveDateTime,
    /// Replaces the stored break when present.
    #[serde(default)]
    pub break_minutes: Option<i32>,
}

/// Totals over a worker's timesheets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimesheetSummary {
    /// Sum of worked hours over all timesheets.
    pub total_hours: Decimal,
    /// Number of timesheets.
    pub total_timesheets: usize,
    /// Number of approved timesheets.
    pub approved_count: usize,
    /// Number of submitted timesheets awaiting review.
    pub pending_count: usize,
}

/// Records clocked time and enforces the timesheet state machine.
#[derive(Clone)]
pub struct TimesheetEngine {
    store: Arc<Store>,
}

impl TimesheetEngine {
    /// Creates an engine over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Opens a draft timesheet for the calling worker.
    ///
    /// The worker must be scheduled on the shift, or hold a live assignment
    /// for it, and must have a relationship with the shift's provider.
    pub fn clock_in(&self, actor: &Actor, input: ClockIn) -> EngineResult<Timesheet> {
        let worker_id = require_worker(actor)?;
        if input.break_minutes < 0 {
            return Err(EngineError::validation(
                "break_minutes",
                format!("break of {} minutes is negative", input.break_minutes),
            ));
        }

        self.store.transaction(|tables| {
            let shift = tables.shift(input.shift_id)?;
            RelationshipGuard::new(tables).authorize(
                shift.service_provider_id,
                worker_id,
                Requirement::Exists,
            )?;
            if !is_rostered(tables, input.shift_id, shift.support_worker_id, worker_id) {
                return Err(EngineError::unauthorized(format!(
                    "worker {} is not rostered on shift {}",
                    worker_id, input.shift_id
                )));
            }

            let now = Utc::now();
            let timesheet = Timesheet {
                id: Uuid::new_v4(),
                shift_id: input.shift_id,
                support_worker_id: worker_id,
                start_time: input.start_time,
                end_time: None,
                break_minutes: input.break_minutes,
                total_hours: None,
                notes: input.notes,
                status: TimesheetStatus::Draft,
                created_at: now,
                updated_at: now,
            };
            tables.timesheets.insert(timesheet.id, timesheet.clone());

            info!(
                timesheet_id = %timesheet.id,
                shift_id = %timesheet.shift_id,
                %worker_id,
                start = %timesheet.start_time,
                "clocked in"
            );
            Ok(timesheet)
        })
    }

    /// Closes a draft timesheet and derives its worked hours.
    ///
    /// Hours are computed from the stored clock-in time and the stored break
    /// unless a new break is supplied. The read and the write happen under
    /// one store transaction.
    pub fn clock_out(
        &self,
        actor: &Actor,
        timesheet_id: Uuid,
        input: ClockOut,
    ) -> EngineResult<Timesheet> {
        let worker_id = require_worker(actor)?;

        self.store.transaction(|tables| {
            let timesheet = tables.timesheet_mut(timesheet_id)?;
            ensure_owner(worker_id, timesheet.support_worker_id, "timesheet", timesheet_id)?;
            if timesheet.status != TimesheetStatus::Draft {
                return Err(EngineError::state_conflict(
                    "timesheet",
                    timesheet_id,
                    format!("cannot clock out of a {} timesheet", timesheet.status.as_str()),
                ));
            }

            let break_minutes = input.break_minutes.unwrap_or(timesheet.break_minutes);
            let total_hours =
                calculate_worked_hours(timesheet.start_time, input.end_time, break_minutes)?;

            timesheet.end_time = Some(input.end_time);
            timesheet.break_minutes = break_minutes;
            timesheet.total_hours = Some(total_hours);
            timesheet.updated_at = Utc::now();

            info!(
                %timesheet_id,
                end = %input.end_time,
                break_minutes,
                total_hours = %total_hours,
                "clocked out"
            );
            Ok(timesheet.clone())
        })
    }

    /// Submits a clocked-out draft timesheet for review.
    pub fn submit(&self, actor: &Actor, timesheet_id: Uuid) -> EngineResult<Timesheet> {
        let worker_id = require_worker(actor)?;

        self.store.transaction(|tables| {
            let timesheet = tables.timesheet(timesheet_id)?;
            ensure_owner(worker_id, timesheet.support_worker_id, "timesheet", timesheet_id)?;
            if timesheet.status == TimesheetStatus::Draft && timesheet.end_time.is_none() {
                return Err(EngineError::validation(
                    "end_time",
                    "timesheet must be clocked out before it is submitted",
                ));
            }

            transition(tables, timesheet_id, TimesheetStatus::Submitted)
        })
    }

    /// Approves a submitted timesheet; the caller must own the shift.
    pub fn approve(&self, actor: &Actor, timesheet_id: Uuid) -> EngineResult<Timesheet> {
        self.store.transaction(|tables| {
            authorize_reviewer(tables, actor, timesheet_id)?;
            transition(tables, timesheet_id, TimesheetStatus::Approved)
        })
    }

    /// Rejects a submitted timesheet; the caller must own the shift.
    ///
    /// The reason is logged but not stored.
    pub fn reject(
        &self,
        actor: &Actor,
        timesheet_id: Uuid,
        reason: Option<&str>,
    ) -> EngineResult<Timesheet> {
        self.store.transaction(|tables| {
            authorize_reviewer(tables, actor, timesheet_id)?;
            let timesheet = transition(tables, timesheet_id, TimesheetStatus::Rejected)?;
            if let Some(reason) = reason {
                info!(%timesheet_id, reason, "timesheet rejection reason");
            }
            Ok(timesheet)
        })
    }

    /// Returns a timesheet visible to the caller.
    pub fn get(&self, actor: &Actor, timesheet_id: Uuid) -> EngineResult<Timesheet> {
        self.store.read(|tables| {
            let timesheet = tables.timesheet(timesheet_id)?;
            let shift = tables.shift(timesheet.shift_id)?;
            match actor {
                Actor::Worker(id) => {
                    ensure_owner(*id, timesheet.support_worker_id, "timesheet", timesheet_id)?;
                }
                Actor::Provider(_) => {
                    let guard = RelationshipGuard::new(tables);
                    let provider_id = guard.authorize_shift_owner(actor, shift)?;
                    guard.authorize(provider_id, timesheet.support_worker_id, Requirement::Exists)?;
                }
            }
            Ok(timesheet.clone())
        })
    }

    /// Lists the timesheets recorded against a shift, ordered by clock-in.
    pub fn list_for_shift(&self, actor: &Actor, shift_id: Uuid) -> EngineResult<Vec<Timesheet>> {
        self.store.read(|tables| {
            let shift = tables.shift(shift_id)?;
            RelationshipGuard::new(tables).authorize_shift_access(actor, shift)?;

            let mut timesheets: Vec<Timesheet> = tables
                .timesheets
                .values()
                .filter(|t| t.shift_id == shift_id)
                .filter(|t| match actor {
                    Actor::Worker(id) => t.support_worker_id == *id,
                    Actor::Provider(_) => true,
                })
                .cloned()
                .collect();
            timesheets.sort_by_key(|t| (t.start_time, t.created_at, t.id));
            Ok(timesheets)
        })
    }

    /// Lists a worker's timesheets, ordered by clock-in.
    ///
    /// A provider caller must pass the Relationship Guard and only sees
    /// timesheets recorded against its own shifts.
    pub fn list_for_worker(&self, actor: &Actor, worker_id: Uuid) -> EngineResult<Vec<Timesheet>> {
        self.store.read(|tables| {
            RelationshipGuard::new(tables).authorize_for_worker(actor, worker_id)?;
            let mut timesheets = visible_timesheets(tables, actor, worker_id);
            timesheets.sort_by_key(|t| (t.start_time, t.created_at, t.id));
            Ok(timesheets.into_iter().cloned().collect())
        })
    }

    /// Aggregates a worker's timesheets with no date filter.
    pub fn summary(&self, actor: &Actor, worker_id: Uuid) -> EngineResult<TimesheetSummary> {
        self.store.read(|tables| {
            RelationshipGuard::new(tables).authorize_for_worker(actor, worker_id)?;
            let timesheets = visible_timesheets(tables, actor, worker_id);

            Ok(TimesheetSummary {
                total_hours: timesheets.iter().map(|t| t.hours_or_zero()).sum(),
                total_timesheets: timesheets.len(),
                approved_count: timesheets
                    .iter()
                    .filter(|t| t.status == TimesheetStatus::Approved)
                    .count(),
                pending_count: timesheets
                    .iter()
                    .filter(|t| t.status == TimesheetStatus::Submitted)
                    .count(),
            })
        })
    }
}

/// True if `worker_id` is the shift's scheduled worker or holds a
/// non-declined assignment for it.
fn is_rostered(tables: &Tables, shift_id: Uuid, scheduled_worker: Uuid, worker_id: Uuid) -> bool {
    scheduled_worker == worker_id
        || tables.assignments.values().any(|a| {
            a.shift_id == shift_id
                && a.support_worker_id == worker_id
                && a.status != AssignmentStatus::Declined
        })
}

/// Requires the actor to be the provider owning the timesheet's shift and
/// related to its worker.
fn authorize_reviewer(tables: &Tables, actor: &Actor, timesheet_id: Uuid) -> EngineResult<()> {
    let timesheet = tables.timesheet(timesheet_id)?;
    let shift = tables.shift(timesheet.shift_id)?;
    let guard = RelationshipGuard::new(tables);
    let provider_id = guard.authorize_shift_owner(actor, shift)?;
    guard.authorize(provider_id, timesheet.support_worker_id, Requirement::Exists)?;
    Ok(())
}

/// Moves a timesheet to `next` if the transition table allows it.
fn transition(
    tables: &mut Tables,
    timesheet_id: Uuid,
    next: TimesheetStatus,
) -> EngineResult<Timesheet> {
    let timesheet = tables.timesheet_mut(timesheet_id)?;
    let current = timesheet.status;
    if !current.can_transition_to(next) {
        warn!(
            %timesheet_id,
            from = current.as_str(),
            to = next.as_str(),
            "illegal timesheet transition"
        );
        return Err(EngineError::state_conflict(
            "timesheet",
            timesheet_id,
            format!("cannot move from {} to {}", current.as_str(), next.as_str()),
        ));
    }

    timesheet.status = next;
    timesheet.updated_at = Utc::now();
    info!(
        %timesheet_id,
        from = current.as_str(),
        to = next.as_str(),
        "timesheet status changed"
    );
    Ok(timesheet.clone())
}

fn visible_timesheets<'a>(
    tables: &'a Tables,
    actor: &Actor,
    worker_id: Uuid,
) -> Vec<&'a Timesheet> {
    tables
        .timesheets
        .values()
        .filter(|t| t.support_worker_id == worker_id)
        .filter(|t| match actor {
            Actor::Worker(_) => true,
            Actor::Provider(provider_id) => tables
                .shifts
                .get(&t.shift_id)
                .is_some_and(|s| s.service_provider_id == *provider_id),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Fixture, dt};
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_clock_in_creates_open_draft() {
        let fx = Fixture::new();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:30:00");

        let timesheet = fx
            .timesheet_engine()
            .clock_in(&fx.worker(), fx.clock_in_input(shift.id, "2026-01-15 08:00:00"))
            .unwrap();

        assert_eq!(timesheet.status, TimesheetStatus::Draft);
        assert_eq!(timesheet.end_time, None);
        assert_eq!(timesheet.total_hours, None);
        assert_eq!(timesheet.break_minutes, 0);
    }

    /// Clock in 08:00, clock out 16:30 with a 30 minute break.
    #[test]
    fn test_clock_out_computes_hours() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:30:00");
        let timesheet = engine
            .clock_in(&fx.worker(), fx.clock_in_input(shift.id, "2026-01-15 08:00:00"))
            .unwrap();

        let closed = engine
            .clock_out(
                &fx.worker(),
                timesheet.id,
                ClockOut {
                    end_time: dt("2026-01-15 16:30:00"),
                    break_minutes: Some(30),
                },
            )
            .unwrap();

        assert_eq!(closed.total_hours, Some(dec("8.0")));
        assert_eq!(closed.break_minutes, 30);
        assert_eq!(closed.end_time, Some(dt("2026-01-15 16:30:00")));
    }

    #[test]
    fn test_clock_out_keeps_stored_break_when_omitted() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 12:00:00");
        let mut input = fx.clock_in_input(shift.id, "2026-01-15 08:00:00");
        input.break_minutes = 15;
        let timesheet = engine.clock_in(&fx.worker(), input).unwrap();

        let closed = engine
            .clock_out(
                &fx.worker(),
                timesheet.id,
                ClockOut {
                    end_time: dt("2026-01-15 12:00:00"),
                    break_minutes: None,
                },
            )
            .unwrap();
        assert_eq!(closed.total_hours, Some(dec("3.75")));
    }

    #[test]
    fn test_clock_out_before_clock_in_is_rejected_and_not_stored() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let timesheet = engine
            .clock_in(&fx.worker(), fx.clock_in_input(shift.id, "2026-01-15 08:00:00"))
            .unwrap();

        let result = engine.clock_out(
            &fx.worker(),
            timesheet.id,
            ClockOut {
                end_time: dt("2026-01-15 07:00:00"),
                break_minutes: None,
            },
        );
        assert!(matches!(result, Err(EngineError::Validation { .. })));

        let stored = engine.get(&fx.worker(), timesheet.id).unwrap();
        assert_eq!(stored.end_time, None);
        assert_eq!(stored.total_hours, None);
    }

    #[test]
    fn test_clock_in_by_unrostered_worker_is_unauthorized() {
        let fx = Fixture::new();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let stranger = Actor::Worker(Uuid::new_v4());

        let result = fx
            .timesheet_engine()
            .clock_in(&stranger, fx.clock_in_input(shift.id, "2026-01-15 08:00:00"));
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[test]
    fn test_clock_in_unknown_shift_is_not_found() {
        let fx = Fixture::new();
        let result = fx
            .timesheet_engine()
            .clock_in(&fx.worker(), fx.clock_in_input(Uuid::new_v4(), "2026-01-15 08:00:00"));
        assert!(matches!(result, Err(EngineError::NotFound { entity: "shift", .. })));
    }

    #[test]
    fn test_full_lifecycle_to_approved() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let timesheet = fx.clocked(&shift, "2026-01-15 08:00:00", "2026-01-15 16:00:00", 0);

        let submitted = engine.submit(&fx.worker(), timesheet.id).unwrap();
        assert_eq!(submitted.status, TimesheetStatus::Submitted);

        let approved = engine.approve(&fx.provider(), timesheet.id).unwrap();
        assert_eq!(approved.status, TimesheetStatus::Approved);

        assert!(matches!(
            engine.reject(&fx.provider(), timesheet.id, None),
            Err(EngineError::StateConflict { .. })
        ));
        assert!(matches!(
            engine.submit(&fx.worker(), timesheet.id),
            Err(EngineError::StateConflict { .. })
        ));
    }

    #[test]
    fn test_approve_requires_submitted() {
        let fx = Fixture::new();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let timesheet = fx.clocked(&shift, "2026-01-15 08:00:00", "2026-01-15 16:00:00", 0);

        let result = fx.timesheet_engine().approve(&fx.provider(), timesheet.id);
        assert!(matches!(result, Err(EngineError::StateConflict { .. })));
    }

    #[test]
    fn test_reject_with_reason() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let timesheet = fx.clocked(&shift, "2026-01-15 08:00:00", "2026-01-15 16:00:00", 0);
        engine.submit(&fx.worker(), timesheet.id).unwrap();

        let rejected = engine
            .reject(&fx.provider(), timesheet.id, Some("clock-out does not match roster"))
            .unwrap();
        assert_eq!(rejected.status, TimesheetStatus::Rejected);
    }

    #[test]
    fn test_submit_open_timesheet_is_rejected() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let timesheet = engine
            .clock_in(&fx.worker(), fx.clock_in_input(shift.id, "2026-01-15 08:00:00"))
            .unwrap();

        let result = engine.submit(&fx.worker(), timesheet.id);
        assert!(matches!(result, Err(EngineError::Validation { .. })));
    }

    #[test]
    fn test_clock_out_after_submit_conflicts() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let timesheet = fx.clocked(&shift, "2026-01-15 08:00:00", "2026-01-15 16:00:00", 0);
        engine.submit(&fx.worker(), timesheet.id).unwrap();

        let result = engine.clock_out(
            &fx.worker(),
            timesheet.id,
            ClockOut {
                end_time: dt("2026-01-15 17:00:00"),
                break_minutes: None,
            },
        );
        assert!(matches!(result, Err(EngineError::StateConflict { .. })));
    }

    #[test]
    fn test_other_provider_cannot_approve() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let timesheet = fx.clocked(&shift, "2026-01-15 08:00:00", "2026-01-15 16:00:00", 0);
        engine.submit(&fx.worker(), timesheet.id).unwrap();

        let result = engine.approve(&Actor::Provider(Uuid::new_v4()), timesheet.id);
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[test]
    fn test_summary_counts_by_status() {
        let fx = Fixture::new();
        let shift_a = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let shift_b = fx.schedule("2026-01-16 08:00:00", "2026-01-16 12:00:00");
        let shift_c = fx.schedule("2026-01-17 08:00:00", "2026-01-17 10:00:00");
        fx.approved(&shift_a, "2026-01-15 08:00:00", "2026-01-15 16:00:00", 0);
        let pending = fx.clocked(&shift_b, "2026-01-16 08:00:00", "2026-01-16 12:00:00", 0);
        fx.timesheet_engine().submit(&fx.worker(), pending.id).unwrap();
        fx.timesheet_engine()
            .clock_in(&fx.worker(), fx.clock_in_input(shift_c.id, "2026-01-17 08:00:00"))
            .unwrap();

        let summary = fx.timesheet_engine().summary(&fx.provider(), fx.worker_id).unwrap();
        assert_eq!(summary.total_timesheets, 3);
        assert_eq!(summary.total_hours, dec("12"));
        assert_eq!(summary.approved_count, 1);
        assert_eq!(summary.pending_count, 1);
    }

    #[test]
    fn test_provider_without_relationship_cannot_list() {
        let fx = Fixture::new();
        let result = fx
            .timesheet_engine()
            .list_for_worker(&Actor::Provider(Uuid::new_v4()), fx.worker_id);
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[test]
    fn test_concurrent_clock_outs_yield_one_consistent_result() {
        let fx = Fixture::new();
        let engine = fx.timesheet_engine();
        let shift = fx.schedule("2026-01-15 08:00:00", "2026-01-15 16:00:00");
        let timesheet = engine
            .clock_in(&fx.worker(), fx.clock_in_input(shift.id, "2026-01-15 08:00:00"))
            .unwrap();

        let handles: Vec<_> = ["2026-01-15 16:00:00", "2026-01-15 15:00:00"]
            .into_iter()
            .map(|end| {
                let engine = engine.clone();
                let worker = fx.worker();
                std::thread::spawn(move || {
                    engine.clock_out(
                        &worker,
                        timesheet.id,
                        ClockOut {
                            end_time: dt(end),
                            break_minutes: None,
                        },
                    )
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap().unwrap();
        }

        let stored = engine.get(&fx.worker(), timesheet.id).unwrap();
        let expected = calculate_worked_hours(
            stored.start_time,
            stored.end_time.unwrap(),
            stored.break_minutes,
        )
        .unwrap();
        assert_eq!(stored.total_hours, Some(expected));
    }
}
