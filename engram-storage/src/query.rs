//! Typed filter and sort construction.
//!
//! Store filters are built from a closed set of predicates instead of an
//! untyped field map, so an unsupported combination is unrepresentable
//! rather than silently ignored. Delegates interpret the predicate list;
//! [`Filter::matches`] is the reference interpretation used by in-memory
//! delegates.

use engram_core::{Entity, EntityId, Timestamp};

/// One supported query predicate.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    /// Primary-key equality.
    IdEq(EntityId),
    /// Tenant equality.
    OrganizationEq(EntityId),
    /// Owning-agent equality.
    AgentEq(EntityId),
    /// Soft-delete flag equality.
    DeletedEq(bool),
    /// Name equality, for kinds that carry a name.
    NameEq(String),
    /// Creation timestamp at or after the bound.
    CreatedAfter(Timestamp),
    /// Creation timestamp at or before the bound.
    CreatedBefore(Timestamp),
}

/// A conjunction of predicates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Filter {
    predicates: Vec<Predicate>,
}

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(self, id: EntityId) -> Self {
        self.push(Predicate::IdEq(id))
    }

    pub fn organization(self, organization_id: EntityId) -> Self {
        self.push(Predicate::OrganizationEq(organization_id))
    }

    pub fn agent(self, agent_id: EntityId) -> Self {
        self.push(Predicate::AgentEq(agent_id))
    }

    pub fn deleted(self, deleted: bool) -> Self {
        self.push(Predicate::DeletedEq(deleted))
    }

    pub fn name(self, name: impl Into<String>) -> Self {
        self.push(Predicate::NameEq(name.into()))
    }

    pub fn created_after(self, bound: Timestamp) -> Self {
        self.push(Predicate::CreatedAfter(bound))
    }

    pub fn created_before(self, bound: Timestamp) -> Self {
        self.push(Predicate::CreatedBefore(bound))
    }

    pub fn push(mut self, predicate: Predicate) -> Self {
        self.predicates.push(predicate);
        self
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    /// Reference interpretation of the filter against a record.
    pub fn matches<T: Entity>(&self, record: &T) -> bool {
        self.predicates.iter().all(|p| match p {
            Predicate::IdEq(id) => record.id() == *id,
            Predicate::OrganizationEq(org) => record.organization_id() == Some(*org),
            Predicate::AgentEq(agent) => record.agent_id() == Some(*agent),
            Predicate::DeletedEq(deleted) => record.is_deleted() == *deleted,
            Predicate::NameEq(name) => record.name() == Some(name.as_str()),
            Predicate::CreatedAfter(bound) => record.created_at() >= *bound,
            Predicate::CreatedBefore(bound) => record.created_at() <= *bound,
        })
    }
}

/// Stable sort key for listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    CreatedAt,
    UpdatedAt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Sort specification; defaults to newest-first by creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub key: SortKey,
    pub order: SortOrder,
}

impl Default for Sort {
    fn default() -> Self {
        Self {
            key: SortKey::CreatedAt,
            order: SortOrder::Desc,
        }
    }
}

impl Sort {
    pub fn created_at(order: SortOrder) -> Self {
        Self {
            key: SortKey::CreatedAt,
            order,
        }
    }

    pub fn updated_at(order: SortOrder) -> Self {
        Self {
            key: SortKey::UpdatedAt,
            order,
        }
    }
}
