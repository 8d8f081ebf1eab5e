//! Management of worker/provider relationships.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use crate::error::{EngineError, EngineResult};
use crate::guard::{Requirement, RelationshipGuard, require_provider};
use crate::models::{Actor, Relationship, RelationshipStatus};
use crate::store::Store;

/// Partial update of a relationship.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipUpdate {
    /// New status.
    #[serde(default)]
    pub status: Option<RelationshipStatus>,
    /// New default hourly rate.
    #[serde(default)]
    pub hourly_rate: Option<Decimal>,
}

/// Creates and maintains the links between providers and workers.
#[derive(Clone)]
pub struct RelationshipManager {
    store: Arc<Store>,
}

impl RelationshipManager {
    /// Creates a manager over the given store.
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    /// Links a worker to the calling provider with a default hourly rate.
    pub fn link_worker(
        &self,
        actor: &Actor,
        worker_id: Uuid,
        hourly_rate: Decimal,
    ) -> EngineResult<Relationship> {
        let provider_id = require_provider(actor)?;
        validate_rate(hourly_rate)?;

        self.store.transaction(|tables| {
            if tables.relationships.contains_key(&(provider_id, worker_id)) {
                return Err(EngineError::state_conflict(
                    "relationship",
                    worker_id,
                    format!("worker is already linked to provider {}", provider_id),
                ));
            }

            let relationship = Relationship {
                support_worker_id: worker_id,
                service_provider_id: provider_id,
                status: RelationshipStatus::Active,
                hourly_rate,
                created_at: Utc::now(),
            };
            tables
                .relationships
                .insert((provider_id, worker_id), relationship.clone());

            info!(
                %provider_id,
                %worker_id,
                hourly_rate = %hourly_rate,
                "worker linked to provider"
            );
            Ok(relationship)
        })
    }

    /// Changes the status or default rate of an existing relationship.
    pub fn update(
        &self,
        actor: &Actor,
        worker_id: Uuid,
        update: RelationshipUpdate,
    ) -> EngineResult<Relationship> {
        let provider_id = require_provider(actor)?;
        if let Some(rate) = update.hourly_rate {
            validate_rate(rate)?;
        }

        self.store.transaction(|tables| {
            RelationshipGuard::new(tables).authorize(provider_id, worker_id, Requirement::Exists)?;

            let relationship = tables
                .relationships
                .get_mut(&(provider_id, worker_id))
                .ok_or_else(|| EngineError::not_found("relationship", worker_id))?;
            if let Some(status) = update.status {
                relationship.status = status;
            }
            if let Some(rate) = update.hourly_rate {
                relationship.hourly_rate = rate;
            }

            info!(%provider_id, %worker_id, status = ?relationship.status, "relationship updated");
            Ok(relationship.clone())
        })
    }

    /// Lists the calling provider's workers, oldest link first.
    pub fn list_workers(&self, actor: &Actor) -> EngineResult<Vec<Relationship>> {
        let provider_id = require_provider(actor)?;

        self.store.read(|tables| {
            let mut workers: Vec<Relationship> = tables
                .relationships
                .values()
                .filter(|r| r.service_provider_id == provider_id)
                .cloned()
                .collect();
            workers.sort_by_key(|r| (r.created_at, r.support_worker_id));
            Ok(workers)
        })
    }
}

fn validate_rate(rate: Decimal) -> EngineResult<()> {
    if rate.is_sign_negative() {
        return Err(EngineError::validation("hourly_rate", "must not be negative"));
    }
    Ok(())
}
