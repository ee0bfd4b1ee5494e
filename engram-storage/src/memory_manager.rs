//! Mediator for the embedding-bearing memory-record kinds.
//!
//! Same create/read/update/delete/list contract as [`crate::EntityManager`],
//! with two deliberate differences: there is no cache-tier dependency here —
//! embedding vectors are large, so document-cache population stays under the
//! control of the specific memory-record manager and its call sites — and
//! the error mapping is narrower, since these kinds have no foreign-key-heavy
//! relations in this layer (a foreign-key shape from the delegate is treated
//! as unexpected).

use std::marker::PhantomData;

use chrono::Utc;
use engram_core::{
    new_entity_id, ActorContext, CreateContext, CreateInput, Entity, EntityId, Error, Result,
    StoreError,
};
use tracing::error;

use crate::page::{ListOptions, Page, ReadOptions};
use crate::query::Filter;
use crate::store::StoreDelegate;

/// Narrow classification: unique-violation and not-found only.
fn classify_memory<T: Entity>(e: StoreError) -> Error {
    match e {
        StoreError::NotFound { kind, id } => Error::NotFound { kind, id },
        StoreError::UniqueViolation { kind, constraint } => Error::Conflict { kind, constraint },
        other => {
            error!(kind = %T::KIND, error = %other, "unexpected store error");
            Error::UnexpectedStore {
                kind: T::KIND,
                source: other,
            }
        }
    }
}

/// Generic CRUD engine for memory-record kinds.
pub struct MemoryRecordManager<T, S>
where
    T: Entity,
    S: StoreDelegate<T>,
{
    store: S,
    _record: PhantomData<T>,
}

impl<T, S> MemoryRecordManager<T, S>
where
    T: Entity,
    S: StoreDelegate<T>,
{
    pub fn new(store: S) -> Self {
        Self {
            store,
            _record: PhantomData,
        }
    }

    /// The underlying store delegate.
    pub fn store(&self) -> &S {
        &self.store
    }

    fn visible(&self, record: &T, actor: Option<&ActorContext>, include_deleted: bool) -> bool {
        if record.is_deleted() && !include_deleted {
            return false;
        }
        match actor {
            Some(actor) => record.organization_id() == Some(actor.organization_id),
            None => true,
        }
    }

    fn read_filter(
        &self,
        id: EntityId,
        actor: Option<&ActorContext>,
        include_deleted: bool,
    ) -> Filter {
        let mut filter = Filter::new().id(id);
        if let Some(actor) = actor {
            filter = filter.organization(actor.organization_id);
        }
        if !include_deleted {
            filter = filter.deleted(false);
        }
        filter
    }

    pub async fn create(&self, input: T::Create, actor: Option<&ActorContext>) -> Result<T> {
        let explicit = input.organization_id();
        if explicit.is_none() && actor.is_none() {
            return Err(Error::InvalidReference {
                kind: T::KIND,
                field: "organization_id".to_string(),
            });
        }
        let ctx = CreateContext::resolve(new_entity_id(), Utc::now(), explicit, actor);
        let record = T::from_create(input, &ctx);
        self.store
            .create(record)
            .await
            .map_err(classify_memory::<T>)
    }

    pub async fn read(
        &self,
        id: EntityId,
        actor: Option<&ActorContext>,
        opts: ReadOptions,
    ) -> Result<T> {
        let filter = self.read_filter(id, actor, opts.include_deleted);
        self.store
            .find_first(&filter)
            .await
            .map_err(classify_memory::<T>)?
            .ok_or(Error::NotFound { kind: T::KIND, id })
    }

    pub async fn update(
        &self,
        id: EntityId,
        patch: T::Patch,
        actor: Option<&ActorContext>,
    ) -> Result<T> {
        let mut record = self.read(id, actor, ReadOptions::default()).await?;
        record.apply_patch(patch);
        record.touch(Utc::now(), actor.map(|a| a.actor_id));
        self.store
            .update(id, &record)
            .await
            .map_err(classify_memory::<T>)
    }

    pub async fn delete(&self, id: EntityId, actor: Option<&ActorContext>) -> Result<T> {
        let mut record = self.read(id, actor, ReadOptions::default()).await?;
        record.set_deleted(true);
        record.touch(Utc::now(), actor.map(|a| a.actor_id));
        self.store
            .update(id, &record)
            .await
            .map_err(classify_memory::<T>)
    }

    pub async fn hard_delete(&self, id: EntityId, actor: Option<&ActorContext>) -> Result<()> {
        let record = self.read(id, actor, ReadOptions::with_deleted()).await?;
        self.store
            .delete(record.id())
            .await
            .map_err(classify_memory::<T>)
    }

    fn list_filter(
        &self,
        actor: Option<&ActorContext>,
        agent_id: Option<EntityId>,
        opts: &ListOptions,
    ) -> Filter {
        let mut filter = Filter::new();
        if let Some(actor) = actor {
            filter = filter.organization(actor.organization_id);
        }
        if let Some(agent_id) = agent_id {
            filter = filter.agent(agent_id);
        }
        if !opts.include_deleted {
            filter = filter.deleted(false);
        }
        if let Some(start) = opts.start_date {
            filter = filter.created_after(start);
        }
        if let Some(end) = opts.end_date {
            filter = filter.created_before(end);
        }
        filter
    }

    /// Cursor-paginated listing, optionally scoped to the owning agent on
    /// top of tenant scoping.
    pub async fn list(
        &self,
        actor: Option<&ActorContext>,
        agent_id: Option<EntityId>,
        opts: ListOptions,
    ) -> Result<Page<T>> {
        let filter = self.list_filter(actor, agent_id, &opts);
        let take = opts.limit + 1;
        let (mut rows, total) = tokio::try_join!(
            self.store.find_many(&filter, opts.sort, take, opts.cursor),
            self.store.count(&filter),
        )
        .map_err(classify_memory::<T>)?;

        let has_more = rows.len() > opts.limit;
        if has_more {
            rows.truncate(opts.limit);
        }
        let next_cursor = if has_more {
            rows.last().map(|r| r.id())
        } else {
            None
        };
        Ok(Page {
            items: rows,
            total,
            has_more,
            next_cursor,
        })
    }

    pub async fn count(
        &self,
        actor: Option<&ActorContext>,
        agent_id: Option<EntityId>,
        include_deleted: bool,
    ) -> Result<u64> {
        let opts = ListOptions {
            include_deleted,
            ..ListOptions::default()
        };
        let filter = self.list_filter(actor, agent_id, &opts);
        self.store
            .count(&filter)
            .await
            .map_err(classify_memory::<T>)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MemoryStore;
    use engram_core::{CreateSemanticFact, EntityKind, SemanticFact};

    fn manager() -> MemoryRecordManager<SemanticFact, MemoryStore<SemanticFact>> {
        MemoryRecordManager::new(MemoryStore::new())
    }

    fn actor_for(org: EntityId) -> ActorContext {
        ActorContext::new(new_entity_id(), org)
    }

    fn fact_input(agent: EntityId, name: &str) -> CreateSemanticFact {
        CreateSemanticFact {
            agent_id: agent,
            name: name.to_string(),
            summary: format!("{name} summary"),
            embedding: Some(vec![0.5, 0.5]),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_create_read_round_trip() {
        let manager = manager();
        let actor = actor_for(new_entity_id());
        let agent = new_entity_id();

        let created = manager
            .create(fact_input(agent, "editor"), Some(&actor))
            .await
            .unwrap();
        assert_eq!(created.organization_id, actor.organization_id);

        let read = manager
            .read(created.id, Some(&actor), ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(read, created);
        assert_eq!(read.embedding.as_deref(), Some(&[0.5, 0.5][..]));
    }

    #[tokio::test]
    async fn test_tenant_isolation() {
        let manager = manager();
        let owner = actor_for(new_entity_id());
        let outsider = actor_for(new_entity_id());

        let created = manager
            .create(fact_input(new_entity_id(), "editor"), Some(&owner))
            .await
            .unwrap();

        let err = manager
            .read(created.id, Some(&outsider), ReadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_scopes_by_agent() {
        let manager = manager();
        let actor = actor_for(new_entity_id());
        let agent_a = new_entity_id();
        let agent_b = new_entity_id();

        for i in 0..3 {
            manager
                .create(fact_input(agent_a, &format!("a-{i}")), Some(&actor))
                .await
                .unwrap();
        }
        manager
            .create(fact_input(agent_b, "b-0"), Some(&actor))
            .await
            .unwrap();

        let scoped = manager
            .list(Some(&actor), Some(agent_a), ListOptions::new())
            .await
            .unwrap();
        assert_eq!(scoped.total, 3);
        assert!(scoped.items.iter().all(|f| f.agent_id == agent_a));

        let all = manager
            .list(Some(&actor), None, ListOptions::new())
            .await
            .unwrap();
        assert_eq!(all.total, 4);

        assert_eq!(
            manager.count(Some(&actor), Some(agent_b), false).await.unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_soft_delete_then_hard_delete() {
        let manager = manager();
        let actor = actor_for(new_entity_id());

        let created = manager
            .create(fact_input(new_entity_id(), "editor"), Some(&actor))
            .await
            .unwrap();

        let deleted = manager.delete(created.id, Some(&actor)).await.unwrap();
        assert!(deleted.is_deleted);
        assert!(manager
            .read(created.id, Some(&actor), ReadOptions::default())
            .await
            .is_err());

        manager.hard_delete(created.id, Some(&actor)).await.unwrap();
        assert!(manager.store().is_empty());
    }

    #[test]
    fn test_narrow_classification() {
        let conflict = classify_memory::<SemanticFact>(StoreError::UniqueViolation {
            kind: EntityKind::SemanticFact,
            constraint: "primary_key".to_string(),
        });
        assert!(matches!(conflict, Error::Conflict { .. }));

        // Foreign-key shapes are outside this mediator's taxonomy.
        let unexpected = classify_memory::<SemanticFact>(StoreError::ForeignKeyViolation {
            kind: EntityKind::SemanticFact,
            field: "agent_id".to_string(),
        });
        assert!(matches!(unexpected, Error::UnexpectedStore { .. }));
    }
}
