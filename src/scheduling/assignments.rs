//! Shift assignment operations.
//!
//! Assignment status is tracked separately from `Shift::status`, so a shift
//! can be offered to a worker without touching its own lifecycle.

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::guard::{Requirement, RelationshipGuard};
use crate::models::{Actor, AssignmentStatus, ShiftAssignment};

use super::ShiftManager;

impl ShiftManager {
    /// Lists the assignments of a shift, oldest first.
    pub fn list_assignments(
        &self,
        actor: &Actor,
        shift_id: Uuid,
    ) -> EngineResult<Vec<ShiftAssignment>> {
        self.store.read(|tables| {
            let shift = tables.shift(shift_id)?;
            RelationshipGuard::new(tables).authorize_shift_access(actor, shift)?;

            let mut assignments: Vec<ShiftAssignment> = tables
                .assignments
                .values()
                .filter(|a| a.shift_id == shift_id)
                .cloned()
                .collect();
            assignments.sort_by_key(|a| (a.created_at, a.id));
            Ok(assignments)
        })
    }

    /// Offers a shift to a worker.
    ///
    /// Fails with `StateConflict` if the worker already has an assignment
    /// for this shift.
    pub fn assign(
        &self,
        actor: &Actor,
        shift_id: Uuid,
        worker_id: Uuid,
    ) -> EngineResult<ShiftAssignment> {
        self.store.transaction(|tables| {
            let shift = tables.shift(shift_id)?;
            let guard = RelationshipGuard::new(tables);
            let provider_id = guard.authorize_shift_owner(actor, shift)?;
            guard.authorize(provider_id, worker_id, Requirement::Exists)?;

            let duplicate = tables
                .assignments
                .values()
                .any(|a| a.shift_id == shift_id && a.support_worker_id == worker_id);
            if duplicate {
                return Err(EngineError::state_conflict(
                    "shift",
                    shift_id,
                    format!("worker {} is already assigned", worker_id),
                ));
            }

            let assignment = ShiftAssignment {
                id: Uuid::new_v4(),
                shift_id,
                support_worker_id: worker_id,
                status: AssignmentStatus::Assigned,
                created_at: Utc::now(),
            };
            tables.assignments.insert(assignment.id, assignment.clone());

            info!(%shift_id, %worker_id, assignment_id = %assignment.id, "shift assigned");
            Ok(assignment)
        })
    }

    /// Sets the status of an assignment.
    ///
    /// The assigned worker or the provider owning the shift may do this;
    /// any status value is accepted.
    pub fn update_assignment_status(
        &self,
        actor: &Actor,
        assignment_id: Uuid,
        status: AssignmentStatus,
    ) -> EngineResult<ShiftAssignment> {
        self.store.transaction(|tables| {
            let assignment = tables
                .assignments
                .get(&assignment_id)
                .ok_or_else(|| EngineError::not_found("assignment", assignment_id))?;

            match actor {
                Actor::Worker(id) if *id == assignment.support_worker_id => {}
                Actor::Worker(id) => {
                    return Err(EngineError::unauthorized(format!(
                        "assignment {} does not belong to worker {}",
                        assignment_id, id
                    )));
                }
                Actor::Provider(_) => {
                    let shift = tables.shift(assignment.shift_id)?;
                    RelationshipGuard::new(tables).authorize_shift_owner(actor, shift)?;
                }
            }

            let assignment = tables
                .assignments
                .get_mut(&assignment_id)
                .ok_or_else(|| EngineError::not_found("assignment", assignment_id))?;
            assignment.status = status;

            info!(%assignment_id, status = ?status, "assignment status updated");
            Ok(assignment.clone())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Fixture;

    #[test]
    fn test_assign_then_list() {
        let fx = Fixture::new();
        let shifts = fx.shift_manager();
        let shift = fx.schedule("2026-03-02 09:00:00", "2026-03-02 15:00:00");

        let assignment = shifts.assign(&fx.provider(), shift.id, fx.worker_id).unwrap();
        assert_eq!(assignment.status, AssignmentStatus::Assigned);

        let listed = shifts.list_assignments(&fx.provider(), shift.id).unwrap();
        assert_eq!(listed, vec![assignment]);
    }

    #[test]
    fn test_duplicate_assignment_conflicts() {
        let fx = Fixture::new();
        let shifts = fx.shift_manager();
        let shift = fx.schedule("2026-03-02 09:00:00", "2026-03-02 15:00:00");

        shifts.assign(&fx.provider(), shift.id, fx.worker_id).unwrap();
        let result = shifts.assign(&fx.provider(), shift.id, fx.worker_id);
        assert!(matches!(result, Err(EngineError::StateConflict { .. })));
    }

    #[test]
    fn test_assign_unrelated_worker_is_unauthorized() {
        let fx = Fixture::new();
        let shift = fx.schedule("2026-03-02 09:00:00", "2026-03-02 15:00:00");

        let result = fx.shift_manager().assign(&fx.provider(), shift.id, Uuid::new_v4());
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[test]
    fn test_worker_accepts_own_assignment() {
        let fx = Fixture::new();
        let shifts = fx.shift_manager();
        let shift = fx.schedule("2026-03-02 09:00:00", "2026-03-02 15:00:00");
        let assignment = shifts.assign(&fx.provider(), shift.id, fx.worker_id).unwrap();

        let updated = shifts
            .update_assignment_status(&fx.worker(), assignment.id, AssignmentStatus::Accepted)
            .unwrap();
        assert_eq!(updated.status, AssignmentStatus::Accepted);

        let other_worker = Actor::Worker(Uuid::new_v4());
        let result = shifts.update_assignment_status(
            &other_worker,
            assignment.id,
            AssignmentStatus::Declined,
        );
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[test]
    fn test_unknown_assignment_is_not_found() {
        let fx = Fixture::new();
        let result = fx.shift_manager().update_assignment_status(
            &fx.provider(),
            Uuid::new_v4(),
            AssignmentStatus::Completed,
        );
        assert!(matches!(result, Err(EngineError::NotFound { entity: "assignment", .. })));
    }
}
