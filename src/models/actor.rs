//! The authenticated caller of an operation.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Who is performing an operation, as established by the session layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "snake_case")]
pub enum Actor {
    /// A service provider acting on its own shifts, workers and payslips.
    Provider(Uuid),
    /// A support worker acting on their own timesheets.
    Worker(Uuid),
}

impl Actor {
    /// Returns the caller's id.
    pub fn id(&self) -> Uuid {
        match self {
            Actor::Provider(id) | Actor::Worker(id) => *id,
        }
    }

    /// Returns the caller's role name.
    pub fn role(&self) -> &'static str {
        match self {
            Actor::Provider(_) => "provider",
            Actor::Worker(_) => "worker",
        }
    }
}
