//! Record trait implemented by every entity the data layer manages.
//!
//! The generic mediators are parameterized over a record type together with
//! its create-input and patch types; this module defines that contract.

use serde::{de::DeserializeOwned, Serialize};

use crate::actor::ActorContext;
use crate::identity::{EntityId, Timestamp};
use crate::kind::EntityKind;

/// Bookkeeping attached to a record at creation time.
///
/// The mediator resolves the owning organization before constructing the
/// record: the explicit value from the input wins, falling back to the
/// actor's tenant. Tenant-scoped kinds are rejected upstream when neither
/// is available, so `organization` is only `None` for tenant-agnostic kinds.
#[derive(Debug, Clone, Copy)]
pub struct CreateContext {
    pub id: EntityId,
    pub now: Timestamp,
    pub organization: Option<EntityId>,
    pub actor_id: Option<EntityId>,
}

impl CreateContext {
    /// Resolve creation bookkeeping from an optional actor.
    pub fn resolve(
        id: EntityId,
        now: Timestamp,
        explicit_organization: Option<EntityId>,
        actor: Option<&ActorContext>,
    ) -> Self {
        Self {
            id,
            now,
            organization: explicit_organization.or_else(|| actor.map(|a| a.organization_id)),
            actor_id: actor.map(|a| a.actor_id),
        }
    }

    /// The owning organization for a tenant-scoped record.
    pub fn organization(&self) -> EntityId {
        self.organization.unwrap_or_default()
    }
}

/// Create-input contract: the mediator needs to know whether the input
/// names a tenant explicitly before it falls back to the actor's.
pub trait CreateInput: Send {
    /// The organization named by the input, if any.
    fn organization_id(&self) -> Option<EntityId> {
        None
    }
}

/// A domain record managed by the data layer.
///
/// Implementations are plain serde structs; the trait exposes the common
/// bookkeeping fields (identity, tenant, soft-delete flag, timestamps) the
/// mediators need, plus construction from a create input and in-place patch
/// application.
pub trait Entity:
    Clone + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Discriminant for this record kind.
    const KIND: EntityKind;

    /// Whether reads and lists of this kind are filtered by the actor's
    /// tenant. Only the organization record itself opts out.
    const TENANT_SCOPED: bool = true;

    /// Create-input type for this record.
    type Create: CreateInput;

    /// Patch type for this record: all-`Option` fields, `Default` empty.
    type Patch: Send + Sync;

    /// Build a record from a create input plus resolved bookkeeping.
    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self;

    /// Apply a patch in place. Bookkeeping fields (timestamps, actor) are
    /// stamped separately via [`Entity::touch`].
    fn apply_patch(&mut self, patch: Self::Patch);

    fn id(&self) -> EntityId;

    /// The owning tenant; `None` only for tenant-agnostic kinds.
    fn organization_id(&self) -> Option<EntityId>;

    /// The owning agent, for kinds attached to one.
    fn agent_id(&self) -> Option<EntityId> {
        None
    }

    /// A human-facing unique-ish name, for kinds that have one.
    fn name(&self) -> Option<&str> {
        None
    }

    fn is_deleted(&self) -> bool;

    fn set_deleted(&mut self, deleted: bool);

    fn created_at(&self) -> Timestamp;

    fn updated_at(&self) -> Timestamp;

    /// Stamp the update timestamp and last-modifying actor.
    fn touch(&mut self, now: Timestamp, actor_id: Option<EntityId>);
}
