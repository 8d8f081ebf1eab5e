//! Worker/provider relationship model.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a worker is currently engaged by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipStatus {
    /// The worker currently works for the provider.
    #[default]
    Active,
    /// The link is kept for history but the worker is not engaged.
    Inactive,
}

/// The link between a support worker and a service provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relationship {
    /// The worker side of the link.
    pub support_worker_id: Uuid,
    /// The provider side of the link.
    pub service_provider_id: Uuid,
    /// Whether the link is active.
    pub status: RelationshipStatus,
    /// The worker's default hourly rate with this provider.
    pub hourly_rate: Decimal,
    /// When the link was created.
    pub created_at: DateTime<Utc>,
}

impl Relationship {
    /// Returns true if the relationship is active.
    pub fn is_active(&self) -> bool {
        self.status == RelationshipStatus::Active
    }
}
