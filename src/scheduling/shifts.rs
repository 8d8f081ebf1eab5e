//! Shift scheduling: creation, updates, deletion and client notes.

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::guard::{Requirement, RelationshipGuard, require_provider};
use crate::models::{Actor, Shift, ShiftNotes, ShiftStatus};
use crate::store::Store;

/// Input for scheduling a new shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewShift {
    /// The worker to schedule.
    pub support_worker_id: Uuid,
    /// Short description of the shift.
    pub title: String,
    /// Scheduled start.
    pub start_time: NaiveDateTime,
    /// Scheduled end.
    pub end_time: NaiveDateTime,
    /// Free-text location.
    #[serde(default)]
    pub location: Option<String>,
    /// Hourly rate for this shift.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
}

/// Partial update of a shift. Absent fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftUpdate {
    /// New worker.
    #[serde(default)]
    pub support_worker_id: Option<Uuid>,
    /// New title.
    #[serde(default)]
    pub title: Option<String>,
    /// New scheduled start.
    #[serde(default)]
    pub start_time: Option<NaiveDateTime>,
    /// New scheduled end.
    #[serde(default)]
    pub end_time: Option<NaiveDateTime>,
    /// New location.
    #[serde(default)]
    pub location: Option<String>,
    /// New status; any value is accepted.
    #[serde(default)]
    pub status: Option<ShiftStatus>,
    /// New hourly rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
}

/// Client details to attach to a shift.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotesInput {
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

/// Owns shift scheduling data and worker assignment state.
#[derive(Clone)]
pub struct ShiftManager {
    pub(super) store: Arc<Store>,
}

impl ShiftManager {
    /// Creates a manager over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Schedules a new shift for one of the calling provider's active workers.
    pub fn create(&self, actor: &Actor, input: NewShift) -> EngineResult<Shift> {
        let provider_id = require_provider(actor)?;
        validate_title(&input.title)?;
        validate_times(input.start_time, input.end_time)?;
        validate_rate(input.hourly_rate)?;

        self.store.transaction(|tables| {
            RelationshipGuard::new(tables).authorize(
                provider_id,
                input.support_worker_id,
                Requirement::Active,
            )?;

            let shift = Shift {
                id: Uuid::new_v4(),
                support_worker_id: input.support_worker_id,
                service_provider_id: provider_id,
                title: input.title,
                start_time: input.start_time,
                end_time: input.end_time,
                location: input.location,
                status: ShiftStatus::Scheduled,
                hourly_rate: input.hourly_rate,
                created_at: Utc::now(),
            };
            tables.shifts.insert(shift.id, shift.clone());

            info!(
                shift_id = %shift.id,
                %provider_id,
                worker_id = %shift.support_worker_id,
                start = %shift.start_time,
                "shift scheduled"
            );
            Ok(shift)
        })
    }

    /// Returns a shift visible to the caller.
    pub fn get(&self, actor: &Actor, shift_id: Uuid) -> EngineResult<Shift> {
        self.store.read(|tables| {
            let shift = tables.shift(shift_id)?;
            RelationshipGuard::new(tables).authorize_shift_access(actor, shift)?;
            Ok(shift.clone())
        })
    }

    /// Lists the calling provider's shifts starting within `[from, to]`
    /// (either bound optional), ordered by start time.
    pub fn list_for_provider(
        &self,
        actor: &Actor,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> EngineResult<Vec<Shift>> {
        let provider_id = require_provider(actor)?;

        self.store.read(|tables| {
            let mut shifts: Vec<Shift> = tables
                .shifts
                .values()
                .filter(|s| s.service_provider_id == provider_id)
                .filter(|s| from.is_none_or(|d| s.start_time.date() >= d))
                .filter(|s| to.is_none_or(|d| s.start_time.date() <= d))
                .cloned()
                .collect();
            shifts.sort_by_key(|s| (s.start_time, s.id));
            Ok(shifts)
        })
    }

    /// Lists a worker's shifts, ordered by start time.
    ///
    /// A provider caller only sees its own shifts for that worker.
    pub fn list_for_worker(&self, actor: &Actor, worker_id: Uuid) -> EngineResult<Vec<Shift>> {
        self.store.read(|tables| {
            RelationshipGuard::new(tables).authorize_for_worker(actor, worker_id)?;

            let mut shifts: Vec<Shift> = tables
                .shifts
                .values()
                .filter(|s| s.support_worker_id == worker_id)
                .filter(|s| match actor {
                    Actor::Provider(id) => s.service_provider_id == *id,
                    Actor::Worker(_) => true,
                })
                .cloned()
                .collect();
            shifts.sort_by_key(|s| (s.start_time, s.id));
            Ok(shifts)
        })
    }

    /// Applies a partial update to a shift owned by the caller.
    pub fn update(
        &self,
        actor: &Actor,
        shift_id: Uuid,
        update: ShiftUpdate,
    ) -> EngineResult<Shift> {
        if let Some(title) = &update.title {
            validate_title(title)?;
        }
        validate_rate(update.hourly_rate)?;

        self.store.transaction(|tables| {
            let shift = tables.shift(shift_id)?;
            let guard = RelationshipGuard::new(tables);
            let provider_id = guard.authorize_shift_owner(actor, shift)?;
            if let Some(worker_id) = update.support_worker_id {
                guard.authorize(provider_id, worker_id, Requirement::Active)?;
            }

            let start = update.start_time.unwrap_or(shift.start_time);
            let end = update.end_time.unwrap_or(shift.end_time);
            validate_times(start, end)?;

            let shift = tables.shift_mut(shift_id)?;
            if let Some(worker_id) = update.support_worker_id {
                shift.support_worker_id = worker_id;
            }
            if let Some(title) = update.title {
                shift.title = title;
            }
            if let Some(location) = update.location {
                shift.location = Some(location);
            }
            if let Some(status) = update.status {
                shift.status = status;
            }
            if let Some(rate) = update.hourly_rate {
                shift.hourly_rate = Some(rate);
            }
            shift.start_time = start;
            shift.end_time = end;

            info!(%shift_id, status = ?shift.status, "shift updated");
            Ok(shift.clone())
        })
    }

    /// Deletes a shift with its notes and assignments.
    ///
    /// Shifts that already have timesheets cannot be deleted.
    pub fn delete(&self, actor: &Actor, shift_id: Uuid) -> EngineResult<()> {
        self.store.transaction(|tables| {
            let shift = tables.shift(shift_id)?;
            RelationshipGuard::new(tables).authorize_shift_owner(actor, shift)?;

            let timesheet_count = tables
                .timesheets
                .values()
                .filter(|t| t.shift_id == shift_id)
                .count();
            if timesheet_count > 0 {
                return Err(EngineError::state_conflict(
                    "shift",
                    shift_id,
                    format!("shift has {} timesheet(s) recorded", timesheet_count),
                ));
            }

            tables.assignments.retain(|_, a| a.shift_id != shift_id);
            tables.shift_notes.remove(&shift_id);
            tables.shifts.remove(&shift_id);

            info!(%shift_id, "shift deleted");
            Ok(())
        })
    }

    /// Creates or replaces the client notes of a shift owned by the caller.
    pub fn set_notes(
        &self,
        actor: &Actor,
        shift_id: Uuid,
        input: NotesInput,
    ) -> EngineResult<ShiftNotes> {
        if input.client_name.trim().is_empty() {
            return Err(EngineError::validation("client_name", "must not be empty"));
        }

        self.store.transaction(|tables| {
            let shift = tables.shift(shift_id)?;
            RelationshipGuard::new(tables).authorize_shift_owner(actor, shift)?;

            let notes = ShiftNotes {
                shift_id,
                client_id: input.client_id,
                client_name: input.client_name,
                task_description: input.task_description,
                special_requirements: input.special_requirements,
            };
            tables.shift_notes.insert(shift_id, notes.clone());

            info!(%shift_id, client_id = %notes.client_id, "shift notes saved");
            Ok(notes)
        })
    }

    /// Returns the client notes of a shift, if any.
    pub fn get_notes(&self, actor: &Actor, shift_id: Uuid) -> EngineResult<Option<ShiftNotes>> {
        self.store.read(|tables| {
            let shift = tables.shift(shift_id)?;
            RelationshipGuard::new(tables).authorize_shift_access(actor, shift)?;
            Ok(tables.shift_notes.get(&shift_id).cloned())
        })
    }
}

fn validate_title(title: &str) -> EngineResult<()> {
    if title.trim().is_empty() {
        return Err(EngineError::validation("title", "must not be empty"));
    }
    Ok(())
}

fn validate_times(start: NaiveDateTime, end: NaiveDateTime) -> EngineResult<()> {
    if end < start {
        return Err(EngineError::validation(
            "end_time",
            format!("end time {} is before start time {}", end, start),
        ));
    }
    Ok(())
}

fn validate_rate(rate: Option<Decimal>) -> EngineResult<()> {
    if rate.is_some_and(|r| r.is_sign_negative()) {
        return Err(EngineError::validation("hourly_rate", "must not be negative"));
    }
    Ok(())
}
