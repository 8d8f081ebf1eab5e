//! Relationship Guard: authorizes cross-entity access between providers
//! and workers.
//!
//! Every operation that lets one party touch another party's shifts,
//! timesheets or payslips goes through [`RelationshipGuard`]. A missing
//! relationship row is an authorization failure, never a not-found.

use tracing::warn;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::models::{Actor, Relationship, Shift};
use crate::store::Tables;

/// How strict a relationship check is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
    /// Any relationship row, active or inactive.
    Exists,
    /// The relationship row must be active.
    Active,
}

/// Authorization checks evaluated against one snapshot of the tables.
pub struct RelationshipGuard<'a> {
    tables: &'a Tables,
}

impl<'a> RelationshipGuard<'a> {
    /// Creates a guard over the given tables.
    pub fn new(tables: &'a Tables) -> Self {
        Self { tables }
    }

    /// Returns the relationship between `provider_id` and `worker_id`.
    ///
    /// Fails with `Unauthorized` when no row exists, or when `requirement`
    /// is [`Requirement::Active`] and the row is inactive.
    pub fn authorize(
        &self,
        provider_id: Uuid,
        worker_id: Uuid,
        requirement: Requirement,
    ) -> EngineResult<&'a Relationship> {
        let Some(relationship) = self.tables.relationships.get(&(provider_id, worker_id)) else {
            warn!(%provider_id, %worker_id, "no relationship between provider and worker");
            return Err(EngineError::unauthorized(format!(
                "provider {} has no relationship with worker {}",
                provider_id, worker_id
            )));
        };

        if requirement == Requirement::Active && !relationship.is_active() {
            warn!(%provider_id, %worker_id, "relationship is inactive");
            return Err(EngineError::unauthorized(format!(
                "relationship between provider {} and worker {} is inactive",
                provider_id, worker_id
            )));
        }

        Ok(relationship)
    }

    /// Allows a worker to act on their own data, or a related provider to
    /// act on the worker's data.
    pub fn authorize_for_worker(&self, actor: &Actor, worker_id: Uuid) -> EngineResult<()> {
        match actor {
            Actor::Worker(id) if *id == worker_id => Ok(()),
            Actor::Worker(id) => Err(EngineError::unauthorized(format!(
                "worker {} cannot access data of worker {}",
                id, worker_id
            ))),
            Actor::Provider(provider_id) => self
                .authorize(*provider_id, worker_id, Requirement::Exists)
                .map(|_| ()),
        }
    }

    /// Allows the owning provider, or the scheduled worker, to access a shift.
    pub fn authorize_shift_access(&self, actor: &Actor, shift: &Shift) -> EngineResult<()> {
        match actor {
            Actor::Provider(_) => self.authorize_shift_owner(actor, shift).map(|_| ()),
            Actor::Worker(id) if *id == shift.support_worker_id => Ok(()),
            Actor::Worker(id) => Err(EngineError::unauthorized(format!(
                "worker {} is not scheduled on shift {}",
                id, shift.id
            ))),
        }
    }

    /// Requires the actor to be the provider that owns `shift`.
    pub fn authorize_shift_owner(&self, actor: &Actor, shift: &Shift) -> EngineResult<Uuid> {
        let provider_id = require_provider(actor)?;
        ensure_owner(provider_id, shift.service_provider_id, "shift", shift.id)?;
        Ok(provider_id)
    }
}

/// Returns the provider id of the actor, or `Unauthorized` for workers.
pub fn require_provider(actor: &Actor) -> EngineResult<Uuid> {
    match actor {
        Actor::Provider(id) => Ok(*id),
        Actor::Worker(id) => Err(EngineError::unauthorized(format!(
            "worker {} cannot perform a provider operation",
            id
        ))),
    }
}

/// Returns the worker id of the actor, or `Unauthorized` for providers.
pub fn require_worker(actor: &Actor) -> EngineResult<Uuid> {
    match actor {
        Actor::Worker(id) => Ok(*id),
        Actor::Provider(id) => Err(EngineError::unauthorized(format!(
            "provider {} cannot perform a worker operation",
            id
        ))),
    }
}

/// Fails with `Unauthorized` unless `caller_id` owns the entity.
pub fn ensure_owner(
    caller_id: Uuid,
    owner_id: Uuid,
    entity: &'static str,
    entity_id: Uuid,
) -> EngineResult<()> {
    if caller_id == owner_id {
        Ok(())
    } else {
        warn!(%caller_id, %entity_id, entity, "caller does not own entity");
        Err(EngineError::unauthorized(format!(
            "{} {} does not belong to {}",
            entity, entity_id, caller_id
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{RelationshipStatus, ShiftStatus};
    use chrono::{NaiveDateTime, Utc};
    use rust_decimal::Decimal;

    fn tables_with(provider: Uuid, worker: Uuid, status: RelationshipStatus) -> Tables {
        let mut tables = Tables::default();
        tables.relationships.insert(
            (provider, worker),
            Relationship {
                support_worker_id: worker,
                service_provider_id: provider,
                status,
                hourly_rate: Decimal::from(35),
                created_at: Utc::now(),
            },
        );
        tables
    }

    fn shift_for(provider: Uuid, worker: Uuid) -> Shift {
        Shift {
            id: Uuid::new_v4(),
            support_worker_id: worker,
            service_provider_id: provider,
            title: "Personal care".to_string(),
            start_time: NaiveDateTime::parse_from_str("2026-03-02 08:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            end_time: NaiveDateTime::parse_from_str("2026-03-02 12:00:00", "%Y-%m-%d %H:%M:%S")
                .unwrap(),
            location: None,
            status: ShiftStatus::Scheduled,
            hourly_rate: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_missing_relationship_is_unauthorized() {
        let tables = Tables::default();
        let guard = RelationshipGuard::new(&tables);
        let result = guard.authorize(Uuid::new_v4(), Uuid::new_v4(), Requirement::Exists);
        assert!(matches!(result, Err(EngineError::Unauthorized { .. })));
    }

    #[test]
    fn test_inactive_relationship_passes_existence_check() {
        let (provider, worker) = (Uuid::new_v4(), Uuid::new_v4());
        let tables = tables_with(provider, worker, RelationshipStatus::Inactive);
        let guard = RelationshipGuard::new(&tables);

        assert!(guard.authorize(provider, worker, Requirement::Exists).is_ok());
        assert!(matches!(
            guard.authorize(provider, worker, Requirement::Active),
            Err(EngineError::Unauthorized { .. })
        ));
    }

    #[test]
    fn test_worker_may_access_own_data_only() {
        let tables = Tables::default();
        let guard = RelationshipGuard::new(&tables);
        let worker = Uuid::new_v4();

        assert!(guard.authorize_for_worker(&Actor::Worker(worker), worker).is_ok());
        assert!(
            guard
                .authorize_for_worker(&Actor::Worker(Uuid::new_v4()), worker)
                .is_err()
        );
    }

    #[test]
    fn test_provider_needs_relationship_for_worker_data() {
        let (provider, worker) = (Uuid::new_v4(), Uuid::new_v4());
        let tables = tables_with(provider, worker, RelationshipStatus::Active);
        let guard = RelationshipGuard::new(&tables);

        assert!(guard.authorize_for_worker(&Actor::Provider(provider), worker).is_ok());
        assert!(
            guard
                .authorize_for_worker(&Actor::Provider(Uuid::new_v4()), worker)
                .is_err()
        );
    }

    #[test]
    fn test_shift_owner_check() {
        let (provider, worker) = (Uuid::new_v4(), Uuid::new_v4());
        let tables = Tables::default();
        let guard = RelationshipGuard::new(&tables);
        let shift = shift_for(provider, worker);

        assert_eq!(
            guard
                .authorize_shift_owner(&Actor::Provider(provider), &shift)
                .unwrap(),
            provider
        );
        assert!(
            guard
                .authorize_shift_owner(&Actor::Provider(Uuid::new_v4()), &shift)
                .is_err()
        );
        assert!(guard.authorize_shift_owner(&Actor::Worker(worker), &shift).is_err());
        assert!(guard.authorize_shift_access(&Actor::Worker(worker), &shift).is_ok());
    }
}
