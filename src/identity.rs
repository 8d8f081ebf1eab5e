//! Identity lookup for enriching reports with worker names.
//!
//! Identities are owned by the external authentication system. The engine
//! only reads them through [`IdentityDirectory`]; [`InMemoryDirectory`] is
//! the implementation used by the bundled service and the tests.

use std::collections::HashMap;
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Public profile of a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    /// The user's id, shared with shifts, timesheets and payslips.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Contact email.
    pub email: String,
}

/// Source of user identities.
pub trait IdentityDirectory: Send + Sync {
    /// Returns the identity for `id`, if known.
    fn lookup(&self, id: Uuid) -> Option<UserIdentity>;
}

/// An identity directory held in memory.
#[derive(Debug, Default)]
pub struct InMemoryDirectory {
    users: RwLock<HashMap<Uuid, UserIdentity>>,
}

impl InMemoryDirectory {
    /// Creates an empty directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces an identity.
    pub fn register(&self, identity: UserIdentity) {
        if let Ok(mut users) = self.users.write() {
            users.insert(identity.id, identity);
        }
    }
}

impl IdentityDirectory for InMemoryDirectory {
    fn lookup(&self, id: Uuid) -> Option<UserIdentity> {
        self.users.read().ok()?.get(&id).cloned()
    }
}
