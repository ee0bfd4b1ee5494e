//! Store delegate trait.
//!
//! The mediator never issues raw queries against the authoritative store; it
//! only ever calls these operations with parameters it constructs from actor
//! context and options. A delegate exists per entity type and is injected
//! into the manager at the composition root.

use async_trait::async_trait;
use engram_core::{Entity, EntityId, StoreError};

use crate::query::{Filter, Sort};

/// The six operations the mediator requires of the authoritative store.
///
/// Errors are reported in the raw [`StoreError`] shapes; the mediator
/// classifies them into the domain taxonomy exactly once at its boundary.
#[async_trait]
pub trait StoreDelegate<T: Entity>: Send + Sync {
    /// Look a record up by primary key, unscoped.
    async fn find_unique(&self, id: EntityId) -> Result<Option<T>, StoreError>;

    /// The first record matching a filter, or `None`.
    async fn find_first(&self, filter: &Filter) -> Result<Option<T>, StoreError>;

    /// Up to `take` records matching a filter, ordered by `sort`, starting
    /// after the `cursor` record when one is given (exclusive cursor).
    async fn find_many(
        &self,
        filter: &Filter,
        sort: Sort,
        take: usize,
        cursor: Option<EntityId>,
    ) -> Result<Vec<T>, StoreError>;

    /// Insert a record; echoes the stored row back.
    async fn create(&self, record: T) -> Result<T, StoreError>;

    /// Replace a record by primary key; the mediator owns patch application,
    /// so the delegate receives the full post-patch record.
    async fn update(&self, id: EntityId, record: &T) -> Result<T, StoreError>;

    /// Remove a record permanently by primary key.
    async fn delete(&self, id: EntityId) -> Result<(), StoreError>;

    /// Count records matching a filter.
    async fn count(&self, filter: &Filter) -> Result<u64, StoreError>;
}
