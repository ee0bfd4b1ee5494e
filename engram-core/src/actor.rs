//! Actor context for tenant-scoped operations

use serde::{Deserialize, Serialize};

use crate::identity::EntityId;

/// The calling principal attached to a data-layer operation.
///
/// Every read, write, and list against a tenant-scoped entity is filtered by
/// `organization_id` unless the entity itself is tenant-agnostic (the
/// organization record). An absent actor means the caller runs unscoped,
/// which is only appropriate for trusted internal paths.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorContext {
    pub actor_id: EntityId,
    pub organization_id: EntityId,
    pub user_id: Option<EntityId>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permissions: Vec<String>,
}

impl ActorContext {
    /// Create a context for a principal acting on behalf of an organization.
    pub fn new(actor_id: EntityId, organization_id: EntityId) -> Self {
        Self {
            actor_id,
            organization_id,
            user_id: None,
            permissions: Vec::new(),
        }
    }

    /// Attach the end user the actor is operating for.
    pub fn with_user(mut self, user_id: EntityId) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Attach permission labels.
    pub fn with_permissions(mut self, permissions: Vec<String>) -> Self {
        self.permissions = permissions;
        self
    }
}
