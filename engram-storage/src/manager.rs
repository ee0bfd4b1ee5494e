//! Cache-aside CRUD mediator.
//!
//! Implements create/read/update/delete/list once, generically. An entity
//! manager supplies the store delegate, the cache policy, and the entity's
//! input shaping (via [`Entity::from_create`] / [`Entity::apply_patch`]);
//! everything else — read-through population, write refresh, soft-delete
//! invalidation, actor scoping, cursor pagination, error classification —
//! lives here.
//!
//! The cache is strictly best-effort: a cache failure degrades a read to the
//! store path and turns a write into a counted, logged no-op. No mediator
//! operation ever fails because the cache is down.

use std::marker::PhantomData;
use std::sync::Arc;

use chrono::Utc;
use engram_cache::{decode_flat, encode_flat, CacheMetrics, CacheTier, Representation};
use engram_core::{
    new_entity_id, ActorContext, CreateInput, Entity, EntityId, Error, Result, StoreError,
};
use tracing::{error, warn};

use crate::page::{ListOptions, Page, ReadOptions};
use crate::query::{Filter, Predicate};
use crate::store::StoreDelegate;

/// Per-manager cache configuration.
#[derive(Debug, Clone)]
pub struct CachePolicy {
    pub enabled: bool,
    /// Key prefix; the full key is `"<prefix><id>"`.
    pub prefix: &'static str,
    /// TTL in seconds. `None` means the kind is never written to cache
    /// (bypass, not an error).
    pub ttl: Option<u64>,
    pub representation: Representation,
}

impl CachePolicy {
    pub fn flat(prefix: &'static str, ttl: Option<u64>) -> Self {
        Self {
            enabled: true,
            prefix,
            ttl,
            representation: Representation::Flat,
        }
    }

    pub fn document(prefix: &'static str, ttl: Option<u64>) -> Self {
        Self {
            enabled: true,
            prefix,
            ttl,
            representation: Representation::Document,
        }
    }

    /// A policy that skips the cache entirely.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            prefix: "",
            ttl: None,
            representation: Representation::Flat,
        }
    }
}

/// Classify a raw store error into the domain taxonomy. Happens exactly once,
/// here; callers never see store-specific shapes.
pub(crate) fn classify_store<T: Entity>(e: StoreError) -> Error {
    match e {
        StoreError::NotFound { kind, id } => Error::NotFound { kind, id },
        StoreError::UniqueViolation { kind, constraint } => Error::Conflict { kind, constraint },
        StoreError::ForeignKeyViolation { kind, field } => Error::InvalidReference { kind, field },
        other @ StoreError::Backend { .. } => {
            error!(kind = %T::KIND, error = %other, "unexpected store error");
            Error::UnexpectedStore {
                kind: T::KIND,
                source: other,
            }
        }
    }
}

/// Generic cache-aside CRUD engine.
pub struct EntityManager<T, S>
where
    T: Entity,
    S: StoreDelegate<T>,
{
    store: S,
    cache: Option<Arc<dyn CacheTier>>,
    policy: CachePolicy,
    metrics: Arc<CacheMetrics>,
    _record: PhantomData<T>,
}

impl<T, S> EntityManager<T, S>
where
    T: Entity,
    S: StoreDelegate<T>,
{
    pub fn new(store: S, cache: Option<Arc<dyn CacheTier>>, policy: CachePolicy) -> Self {
        Self {
            store,
            cache,
            policy,
            metrics: Arc::new(CacheMetrics::new()),
            _record: PhantomData,
        }
    }

    /// The underlying store delegate, for type-specific query refinements.
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn metrics(&self) -> &CacheMetrics {
        &self.metrics
    }

    fn cache_key(&self, id: EntityId) -> String {
        format!("{}{}", self.policy.prefix, id)
    }

    fn active_cache(&self) -> Option<&Arc<dyn CacheTier>> {
        if self.policy.enabled {
            self.cache.as_ref()
        } else {
            None
        }
    }

    /// Read-through lookup. Any failure, including a shape mismatch from a
    /// stale wire format, counts as a miss.
    async fn cache_load(&self, id: EntityId) -> Option<T> {
        let cache = self.active_cache()?;
        let key = self.cache_key(id);
        let loaded = match self.policy.representation {
            Representation::Flat => match cache.get_flat(&key).await {
                Ok(fields) => fields.and_then(|f| decode_flat::<T>(&f).ok()),
                Err(e) => {
                    warn!(kind = %T::KIND, %id, error = %e, "cache read failed, using store");
                    None
                }
            },
            Representation::Document => match cache.get_document(&key).await {
                Ok(doc) => doc.and_then(|d| serde_json::from_value(d).ok()),
                Err(e) => {
                    warn!(kind = %T::KIND, %id, error = %e, "cache read failed, using store");
                    None
                }
            },
        };
        match loaded {
            Some(record) => {
                self.metrics.record_hit();
                Some(record)
            }
            None => {
                self.metrics.record_miss();
                None
            }
        }
    }

    /// Best-effort cache write. Kinds with no TTL are never written.
    async fn cache_populate(&self, record: &T) {
        let Some(cache) = self.active_cache() else {
            return;
        };
        let Some(ttl) = self.policy.ttl else {
            return;
        };
        let key = self.cache_key(record.id());
        let outcome = match self.policy.representation {
            Representation::Flat => match encode_flat(record) {
                Ok(fields) => cache.set_flat(&key, &fields, Some(ttl)).await,
                Err(e) => Err(e),
            },
            Representation::Document => match serde_json::to_value(record) {
                Ok(doc) => cache.set_document(&key, &doc, Some(ttl)).await,
                Err(e) => Err(engram_core::CacheError::Serialization {
                    reason: e.to_string(),
                }),
            },
        };
        if let Err(e) = outcome {
            self.metrics.record_write_failure();
            warn!(kind = %T::KIND, id = %record.id(), error = %e, "cache populate failed");
        }
    }

    /// Best-effort cache removal.
    async fn cache_remove(&self, id: EntityId) {
        let Some(cache) = self.active_cache() else {
            return;
        };
        if let Err(e) = cache.delete(&self.cache_key(id)).await {
            self.metrics.record_write_failure();
            warn!(kind = %T::KIND, %id, error = %e, "cache invalidation failed");
        }
    }

    fn visible(&self, record: &T, actor: Option<&ActorContext>, include_deleted: bool) -> bool {
        if record.is_deleted() && !include_deleted {
            return false;
        }
        if T::TENANT_SCOPED {
            if let Some(actor) = actor {
                return record.organization_id() == Some(actor.organization_id);
            }
        }
        true
    }

    fn read_filter(
        &self,
        id: EntityId,
        actor: Option<&ActorContext>,
        include_deleted: bool,
    ) -> Filter {
        let mut filter = Filter::new().id(id);
        if T::TENANT_SCOPED {
            if let Some(actor) = actor {
                filter = filter.organization(actor.organization_id);
            }
        }
        if !include_deleted {
            filter = filter.deleted(false);
        }
        filter
    }

    fn list_filter(&self, actor: Option<&ActorContext>, opts: &ListOptions) -> Filter {
        let mut filter = Filter::new();
        if T::TENANT_SCOPED {
            if let Some(actor) = actor {
                filter = filter.organization(actor.organization_id);
            }
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

    /// Create a record.
    ///
    /// Tenant bookkeeping comes from the input when it names an organization,
    /// else from the actor; a tenant-scoped create with neither is rejected
    /// before touching the store.
    pub async fn create(&self, input: T::Create, actor: Option<&ActorContext>) -> Result<T> {
        let explicit = input.organization_id();
        if T::TENANT_SCOPED && explicit.is_none() && actor.is_none() {
            return Err(Error::InvalidReference {
                kind: T::KIND,
                field: "organization_id".to_string(),
            });
        }
        let ctx = engram_core::CreateContext::resolve(new_entity_id(), Utc::now(), explicit, actor);
        let record = T::from_create(input, &ctx);
        let created = self
            .store
            .create(record)
            .await
            .map_err(classify_store::<T>)?;
        self.cache_populate(&created).await;
        Ok(created)
    }

    /// Read a record, cache first.
    ///
    /// A cache hit returns without touching the store — this is the
    /// latency-critical path. A hit the actor cannot see reports the same
    /// `NotFound` a store miss would, so tenancy never leaks through the
    /// cache. A store hit repopulates the cache opportunistically.
    pub async fn read(
        &self,
        id: EntityId,
        actor: Option<&ActorContext>,
        opts: ReadOptions,
    ) -> Result<T> {
        if let Some(record) = self.cache_load(id).await {
            if self.visible(&record, actor, opts.include_deleted) {
                return Ok(record);
            }
            return Err(Error::NotFound { kind: T::KIND, id });
        }

        let filter = self.read_filter(id, actor, opts.include_deleted);
        match self
            .store
            .find_first(&filter)
            .await
            .map_err(classify_store::<T>)?
        {
            Some(record) => {
                self.cache_populate(&record).await;
                Ok(record)
            }
            None => Err(Error::NotFound { kind: T::KIND, id }),
        }
    }

    /// Update a record.
    ///
    /// The scoped existence check doubles as the access-control gate: an
    /// actor from another tenant gets `NotFound`, never a distinct
    /// "forbidden" signal.
    pub async fn update(
        &self,
        id: EntityId,
        patch: T::Patch,
        actor: Option<&ActorContext>,
    ) -> Result<T> {
        let mut record = self.read(id, actor, ReadOptions::default()).await?;
        record.apply_patch(patch);
        record.touch(Utc::now(), actor.map(|a| a.actor_id));
        let updated = self
            .store
            .update(id, &record)
            .await
            .map_err(classify_store::<T>)?;
        self.cache_populate(&updated).await;
        Ok(updated)
    }

    /// Soft-delete a record: flips the delete flag in the store and removes
    /// (never refreshes) the cache entry, so a deleted record cannot be
    /// served warm. The store row survives.
    pub async fn delete(&self, id: EntityId, actor: Option<&ActorContext>) -> Result<T> {
        let mut record = self.read(id, actor, ReadOptions::default()).await?;
        record.set_deleted(true);
        record.touch(Utc::now(), actor.map(|a| a.actor_id));
        let deleted = self
            .store
            .update(id, &record)
            .await
            .map_err(classify_store::<T>)?;
        self.cache_remove(id).await;
        Ok(deleted)
    }

    /// Permanently destroy a record. Explicit only; [`Self::delete`] never
    /// escalates to this.
    pub async fn hard_delete(&self, id: EntityId, actor: Option<&ActorContext>) -> Result<()> {
        let record = self
            .read(id, actor, ReadOptions::with_deleted())
            .await?;
        self.store
            .delete(record.id())
            .await
            .map_err(classify_store::<T>)?;
        self.cache_remove(id).await;
        Ok(())
    }

    /// Cursor-paginated listing scoped to the actor's tenant.
    ///
    /// Fetches `limit + 1` rows to detect a next page without a count-ahead
    /// query; `total` comes from a parallel count against the same filter.
    pub async fn list(&self, actor: Option<&ActorContext>, opts: ListOptions) -> Result<Page<T>> {
        self.list_with(actor, opts, Vec::new()).await
    }

    pub(crate) async fn list_with(
        &self,
        actor: Option<&ActorContext>,
        opts: ListOptions,
        extra: Vec<Predicate>,
    ) -> Result<Page<T>> {
        let mut filter = self.list_filter(actor, &opts);
        for predicate in extra {
            filter = filter.push(predicate);
        }
        let take = opts.limit + 1;
        let (mut rows, total) = tokio::try_join!(
            self.store.find_many(&filter, opts.sort, take, opts.cursor),
            self.store.count(&filter),
        )
        .map_err(classify_store::<T>)?;

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

    /// Count records under the same filter construction as [`Self::list`].
    pub async fn count(&self, actor: Option<&ActorContext>, include_deleted: bool) -> Result<u64> {
        let opts = ListOptions {
            include_deleted,
            ..ListOptions::default()
        };
        let filter = self.list_filter(actor, &opts);
        self.store
            .count(&filter)
            .await
            .map_err(classify_store::<T>)
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use engram_cache::{decode_value, keys, CacheResult, CacheValue, FlatRecord, MemoryCacheTier};
    use engram_core::{
        CacheError, CreateOrganization, CreateUser, EntityKind, Organization, OrganizationPatch,
        User, UserPatch,
    };
    use serde_json::Value;
    use std::collections::HashMap;

    fn org_manager(
        cache: Option<Arc<dyn CacheTier>>,
    ) -> EntityManager<Organization, MemoryStore<Organization>> {
        EntityManager::new(
            MemoryStore::new(),
            cache,
            CachePolicy::flat(keys::ORGANIZATION_PREFIX, Some(3600)),
        )
    }

    fn user_manager(
        cache: Option<Arc<dyn CacheTier>>,
    ) -> EntityManager<User, MemoryStore<User>> {
        EntityManager::new(
            MemoryStore::new(),
            cache,
            CachePolicy::flat(keys::USER_PREFIX, Some(1800)),
        )
    }

    fn actor_for(org: EntityId) -> ActorContext {
        ActorContext::new(new_entity_id(), org)
    }

    use crate::mock::MemoryStore;

    #[tokio::test]
    async fn test_create_then_read_from_both_paths() {
        let cache = Arc::new(MemoryCacheTier::new());
        let manager = org_manager(Some(cache.clone()));

        let created = manager
            .create(
                CreateOrganization {
                    name: "Acme".to_string(),
                    credits: 10.0,
                },
                None,
            )
            .await
            .unwrap();

        // Create populated the cache; drop the entry to force a store read.
        let key = keys::key_for(EntityKind::Organization, created.id);
        assert!(cache.exists(&key).await.unwrap());
        cache.delete(&key).await.unwrap();

        let from_store = manager
            .read(created.id, None, ReadOptions::default())
            .await
            .unwrap();
        // The store read repopulated the cache; this one is a hit.
        let from_cache = manager
            .read(created.id, None, ReadOptions::default())
            .await
            .unwrap();

        assert_eq!(from_store, created);
        assert_eq!(from_cache, created);
        assert_eq!(from_cache.credits, 10.0);
        assert_eq!(manager.metrics().hits(), 1);
        assert_eq!(manager.metrics().misses(), 1);
    }

    #[tokio::test]
    async fn test_cache_hit_skips_store() {
        let cache = Arc::new(MemoryCacheTier::new());
        let manager = org_manager(Some(cache.clone()));

        let created = manager
            .create(
                CreateOrganization {
                    name: "Acme".to_string(),
                    credits: 10.0,
                },
                None,
            )
            .await
            .unwrap();

        // Tamper with the store row; a warm cache must still win the read.
        let mut tampered = created.clone();
        tampered.name = "Tampered".to_string();
        manager.store().update(created.id, &tampered).await.unwrap();

        let read = manager
            .read(created.id, None, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(read.name, "Acme");
        assert_eq!(manager.metrics().hits(), 1);
    }

    #[tokio::test]
    async fn test_update_refreshes_cache_with_typed_value() {
        let cache = Arc::new(MemoryCacheTier::new());
        let manager = org_manager(Some(cache.clone()));

        let created = manager
            .create(
                CreateOrganization {
                    name: "Acme".to_string(),
                    credits: 10.0,
                },
                None,
            )
            .await
            .unwrap();

        let updated = manager
            .update(
                created.id,
                OrganizationPatch {
                    credits: Some(15.0),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        assert_eq!(updated.credits, 15.0);

        let read = manager
            .read(created.id, None, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(read.credits, 15.0);

        // Inspect the wire format directly: the stored string must decode
        // back to the number, not the string.
        let key = keys::key_for(EntityKind::Organization, created.id);
        let fields = cache.get_flat(&key).await.unwrap().unwrap();
        assert_eq!(decode_value(&fields["credits"]), CacheValue::Float(15.0));
    }

    #[tokio::test]
    async fn test_tenant_isolation_on_both_paths() {
        let cache = Arc::new(MemoryCacheTier::new());
        let manager = user_manager(Some(cache.clone()));

        let org_a = new_entity_id();
        let owner = actor_for(org_a);
        let created = manager
            .create(
                CreateUser {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    ..Default::default()
                },
                Some(&owner),
            )
            .await
            .unwrap();
        assert_eq!(created.organization_id, org_a);

        let outsider = actor_for(new_entity_id());

        // Warm cache: the hit is suppressed for the wrong tenant.
        let err = manager
            .read(created.id, Some(&outsider), ReadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        // Cold cache: the store filter does the same.
        cache
            .delete(&keys::key_for(EntityKind::User, created.id))
            .await
            .unwrap();
        let err = manager
            .read(created.id, Some(&outsider), ReadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        // The owner still sees it.
        assert!(manager
            .read(created.id, Some(&owner), ReadOptions::default())
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn test_soft_delete_visibility() {
        let cache = Arc::new(MemoryCacheTier::new());
        let manager = user_manager(Some(cache.clone()));
        let actor = actor_for(new_entity_id());

        let created = manager
            .create(
                CreateUser {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    ..Default::default()
                },
                Some(&actor),
            )
            .await
            .unwrap();

        let deleted = manager.delete(created.id, Some(&actor)).await.unwrap();
        assert!(deleted.is_deleted);

        // The cache entry is removed, not refreshed.
        let key = keys::key_for(EntityKind::User, created.id);
        assert!(!cache.exists(&key).await.unwrap());

        let err = manager
            .read(created.id, Some(&actor), ReadOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));

        let revived = manager
            .read(created.id, Some(&actor), ReadOptions::with_deleted())
            .await
            .unwrap();
        assert!(revived.is_deleted);
    }

    #[tokio::test]
    async fn test_hard_delete_destroys_row_and_cache() {
        let cache = Arc::new(MemoryCacheTier::new());
        let manager = user_manager(Some(cache.clone()));
        let actor = actor_for(new_entity_id());

        let created = manager
            .create(
                CreateUser {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    ..Default::default()
                },
                Some(&actor),
            )
            .await
            .unwrap();

        // Soft-delete first: hard delete must still find the record.
        manager.delete(created.id, Some(&actor)).await.unwrap();
        manager.hard_delete(created.id, Some(&actor)).await.unwrap();

        assert!(manager.store().is_empty());
        assert!(!cache
            .exists(&keys::key_for(EntityKind::User, created.id))
            .await
            .unwrap());

        let err = manager
            .read(created.id, Some(&actor), ReadOptions::with_deleted())
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_stamps_actor_and_timestamp() {
        let manager = user_manager(None);
        let actor = actor_for(new_entity_id());

        let created = manager
            .create(
                CreateUser {
                    name: "Ada".to_string(),
                    email: "ada@example.com".to_string(),
                    ..Default::default()
                },
                Some(&actor),
            )
            .await
            .unwrap();

        let editor = actor_for(actor.organization_id);
        let updated = manager
            .update(
                created.id,
                UserPatch {
                    name: Some("Ada L.".to_string()),
                    ..Default::default()
                },
                Some(&editor),
            )
            .await
            .unwrap();

        assert_eq!(updated.name, "Ada L.");
        assert_eq!(updated.last_updated_by_id, Some(editor.actor_id));
        assert!(updated.updated_at >= created.updated_at);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_tenant_scoped_create_requires_some_tenant() {
        let manager = user_manager(None);
        let err = manager
            .create(
                CreateUser {
                    name: "Nobody".to_string(),
                    email: "n@example.com".to_string(),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            Error::InvalidReference { kind: EntityKind::User, .. }
        ));
    }

    #[tokio::test]
    async fn test_pagination_is_complete_and_bounded() {
        let manager = user_manager(None);
        let actor = actor_for(new_entity_id());
        let other = actor_for(new_entity_id());

        for i in 0..25 {
            manager
                .create(
                    CreateUser {
                        name: format!("user-{i}"),
                        email: format!("u{i}@example.com"),
                        ..Default::default()
                    },
                    Some(&actor),
                )
                .await
                .unwrap();
        }
        // Records in another tenant must not surface.
        for i in 0..5 {
            manager
                .create(
                    CreateUser {
                        name: format!("other-{i}"),
                        email: format!("o{i}@example.com"),
                        ..Default::default()
                    },
                    Some(&other),
                )
                .await
                .unwrap();
        }

        let mut seen = Vec::new();
        let mut cursor = None;
        let mut pages = 0;
        loop {
            let mut opts = ListOptions::new().with_limit(10);
            if let Some(c) = cursor {
                opts = opts.with_cursor(c);
            }
            let page = manager.list(Some(&actor), opts).await.unwrap();
            assert_eq!(page.total, 25, "total reflects the filter on every page");
            seen.extend(page.items.iter().map(|u| u.id));
            pages += 1;
            if !page.has_more {
                assert!(page.next_cursor.is_none());
                break;
            }
            assert_eq!(page.next_cursor, Some(page.items.last().unwrap().id));
            cursor = page.next_cursor;
        }

        assert_eq!(pages, 3);
        seen.sort();
        seen.dedup();
        assert_eq!(seen.len(), 25, "every record exactly once");
        assert_eq!(manager.count(Some(&actor), false).await.unwrap(), 25);
    }

    #[tokio::test]
    async fn test_list_respects_date_range() {
        let manager = user_manager(None);
        let actor = actor_for(new_entity_id());

        let early = manager
            .create(
                CreateUser {
                    name: "early".to_string(),
                    email: "e@example.com".to_string(),
                    ..Default::default()
                },
                Some(&actor),
            )
            .await
            .unwrap();
        let late = manager
            .create(
                CreateUser {
                    name: "late".to_string(),
                    email: "l@example.com".to_string(),
                    ..Default::default()
                },
                Some(&actor),
            )
            .await
            .unwrap();

        let page = manager
            .list(
                Some(&actor),
                ListOptions::new().with_date_range(None, Some(early.created_at)),
            )
            .await
            .unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, early.id);
        assert_ne!(page.items[0].id, late.id);
    }

    #[tokio::test]
    async fn test_empty_list_is_success() {
        let manager = user_manager(None);
        let actor = actor_for(new_entity_id());
        let page = manager.list(Some(&actor), ListOptions::new()).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 0);
        assert!(!page.has_more);
    }

    #[tokio::test]
    async fn test_soft_deleted_rows_hidden_from_lists_by_default() {
        let manager = user_manager(None);
        let actor = actor_for(new_entity_id());

        let keep = manager
            .create(
                CreateUser {
                    name: "keep".to_string(),
                    email: "k@example.com".to_string(),
                    ..Default::default()
                },
                Some(&actor),
            )
            .await
            .unwrap();
        let gone = manager
            .create(
                CreateUser {
                    name: "gone".to_string(),
                    email: "g@example.com".to_string(),
                    ..Default::default()
                },
                Some(&actor),
            )
            .await
            .unwrap();
        manager.delete(gone.id, Some(&actor)).await.unwrap();

        let page = manager.list(Some(&actor), ListOptions::new()).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, keep.id);

        let with_deleted = manager
            .list(Some(&actor), ListOptions::new().with_deleted())
            .await
            .unwrap();
        assert_eq!(with_deleted.total, 2);
    }

    #[tokio::test]
    async fn test_ttl_bypass_never_writes_cache() {
        let cache = Arc::new(MemoryCacheTier::new());
        let manager: EntityManager<Organization, MemoryStore<Organization>> = EntityManager::new(
            MemoryStore::new(),
            Some(cache.clone()),
            CachePolicy::flat(keys::ORGANIZATION_PREFIX, None),
        );

        let created = manager
            .create(
                CreateOrganization {
                    name: "NoTtl".to_string(),
                    credits: 0.0,
                },
                None,
            )
            .await
            .unwrap();

        let key = keys::key_for(EntityKind::Organization, created.id);
        assert!(!cache.exists(&key).await.unwrap());

        // Reads fall through to the store and still do not populate.
        manager
            .read(created.id, None, ReadOptions::default())
            .await
            .unwrap();
        assert!(!cache.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_document_representation_preserves_vectors() {
        use engram_core::{CreateEpisodicEvent, EpisodicEvent};

        let cache = Arc::new(MemoryCacheTier::new());
        let manager: EntityManager<EpisodicEvent, MemoryStore<EpisodicEvent>> =
            EntityManager::new(
                MemoryStore::new(),
                Some(cache.clone()),
                CachePolicy::document(keys::EPISODIC_EVENT_PREFIX, Some(600)),
            );
        let actor = actor_for(new_entity_id());

        let created = manager
            .create(
                CreateEpisodicEvent {
                    agent_id: new_entity_id(),
                    event_type: "conversation".to_string(),
                    summary: "met the user".to_string(),
                    summary_embedding: Some(vec![0.25, -0.5, 0.125]),
                    ..Default::default()
                },
                Some(&actor),
            )
            .await
            .unwrap();

        let key = keys::key_for(EntityKind::EpisodicEvent, created.id);
        let doc = cache.get_document(&key).await.unwrap().unwrap();
        assert_eq!(
            doc["summary_embedding"],
            serde_json::json!([0.25, -0.5, 0.125])
        );

        let read = manager
            .read(created.id, Some(&actor), ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(read, created);
        assert_eq!(manager.metrics().hits(), 1);
    }

    #[test]
    fn test_classification_covers_taxonomy() {
        let conflict = classify_store::<User>(StoreError::UniqueViolation {
            kind: EntityKind::User,
            constraint: "email".to_string(),
        });
        assert!(matches!(conflict, Error::Conflict { .. }));

        let invalid = classify_store::<User>(StoreError::ForeignKeyViolation {
            kind: EntityKind::User,
            field: "organization_id".to_string(),
        });
        assert!(matches!(invalid, Error::InvalidReference { .. }));

        let missing = classify_store::<User>(StoreError::NotFound {
            kind: EntityKind::User,
            id: new_entity_id(),
        });
        assert!(matches!(missing, Error::NotFound { .. }));

        let unexpected = classify_store::<User>(StoreError::Backend {
            reason: "deadlock".to_string(),
        });
        match unexpected {
            Error::UnexpectedStore { source, .. } => {
                assert!(matches!(source, StoreError::Backend { .. }));
            }
            other => panic!("expected UnexpectedStore, got {:?}", other),
        }
    }

    // ------------------------------------------------------------------
    // Cache-failure degradation
    // ------------------------------------------------------------------

    /// A tier that fails every call, for asserting the never-fail contract.
    struct DownCacheTier;

    #[async_trait]
    impl CacheTier for DownCacheTier {
        async fn set_flat(
            &self,
            _key: &str,
            _fields: &FlatRecord,
            _ttl: Option<u64>,
        ) -> CacheResult<()> {
            Err(down())
        }
        async fn get_flat(&self, _key: &str) -> CacheResult<Option<FlatRecord>> {
            Err(down())
        }
        async fn get_flat_fields(
            &self,
            _key: &str,
            _names: &[&str],
        ) -> CacheResult<Vec<Option<String>>> {
            Err(down())
        }
        async fn get_many_flat(
            &self,
            _keys: &[String],
        ) -> CacheResult<HashMap<String, FlatRecord>> {
            Err(down())
        }
        async fn set_document(
            &self,
            _key: &str,
            _doc: &Value,
            _ttl: Option<u64>,
        ) -> CacheResult<()> {
            Err(down())
        }
        async fn get_document(&self, _key: &str) -> CacheResult<Option<Value>> {
            Err(down())
        }
        async fn get_document_path(&self, _key: &str, _path: &str) -> CacheResult<Option<Value>> {
            Err(down())
        }
        async fn delete(&self, _key: &str) -> CacheResult<bool> {
            Err(down())
        }
        async fn delete_many(&self, _keys: &[String]) -> CacheResult<u64> {
            Err(down())
        }
        async fn exists(&self, _key: &str) -> CacheResult<bool> {
            Err(down())
        }
        async fn scan_page(
            &self,
            _pattern: &str,
            _cursor: u64,
            _count: usize,
        ) -> CacheResult<(u64, Vec<String>)> {
            Err(down())
        }
        fn ready(&self) -> bool {
            false
        }
    }

    fn down() -> CacheError {
        CacheError::Unavailable {
            reason: "connection refused".to_string(),
        }
    }

    #[tokio::test]
    async fn test_down_cache_never_fails_operations() {
        let manager = org_manager(Some(Arc::new(DownCacheTier)));

        let created = manager
            .create(
                CreateOrganization {
                    name: "Resilient".to_string(),
                    credits: 1.0,
                },
                None,
            )
            .await
            .unwrap();
        // The populate failure is observable, not propagated.
        assert_eq!(manager.metrics().write_failures(), 1);

        let read = manager
            .read(created.id, None, ReadOptions::default())
            .await
            .unwrap();
        assert_eq!(read, created);
        assert_eq!(manager.metrics().hits(), 0);

        manager
            .update(
                created.id,
                OrganizationPatch {
                    credits: Some(2.0),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap();
        manager.delete(created.id, None).await.unwrap();
        manager.hard_delete(created.id, None).await.unwrap();
        assert!(manager.store().is_empty());
        assert!(manager.metrics().write_failures() >= 3);
    }
}
