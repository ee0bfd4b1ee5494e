//! In-memory store delegate.
//!
//! Backs the mediator test suites and embedded deployments. Honors the full
//! delegate contract: duplicate inserts report a unique violation, updates
//! and deletes of absent rows report not-found, and `find_many` implements
//! the same exclusive-cursor positioning a relational delegate would.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use engram_core::{Entity, EntityId, StoreError};

use crate::query::{Filter, Sort, SortKey, SortOrder};
use crate::store::StoreDelegate;

/// In-memory implementation of [`StoreDelegate`].
#[derive(Debug, Default)]
pub struct MemoryStore<T> {
    rows: RwLock<HashMap<EntityId, T>>,
}

impl<T: Entity> MemoryStore<T> {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(HashMap::new()),
        }
    }

    /// Number of stored rows, soft-deleted included.
    pub fn len(&self) -> usize {
        self.rows.read().expect("store lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop all rows.
    pub fn clear(&self) {
        self.rows.write().expect("store lock poisoned").clear();
    }

    fn sorted(&self, filter: &Filter, sort: Sort) -> Vec<T> {
        let rows = self.rows.read().expect("store lock poisoned");
        let mut matching: Vec<T> = rows.values().filter(|r| filter.matches(*r)).cloned().collect();
        matching.sort_by(|a, b| {
            let ordering = match sort.key {
                SortKey::CreatedAt => a.created_at().cmp(&b.created_at()),
                SortKey::UpdatedAt => a.updated_at().cmp(&b.updated_at()),
            }
            .then_with(|| a.id().cmp(&b.id()));
            match sort.order {
                SortOrder::Asc => ordering,
                SortOrder::Desc => ordering.reverse(),
            }
        });
        matching
    }
}

#[async_trait]
impl<T: Entity> StoreDelegate<T> for MemoryStore<T> {
    async fn find_unique(&self, id: EntityId) -> Result<Option<T>, StoreError> {
        let rows = self.rows.read().expect("store lock poisoned");
        Ok(rows.get(&id).cloned())
    }

    async fn find_first(&self, filter: &Filter) -> Result<Option<T>, StoreError> {
        let rows = self.rows.read().expect("store lock poisoned");
        Ok(rows.values().find(|r| filter.matches(*r)).cloned())
    }

    async fn find_many(
        &self,
        filter: &Filter,
        sort: Sort,
        take: usize,
        cursor: Option<EntityId>,
    ) -> Result<Vec<T>, StoreError> {
        let sorted = self.sorted(filter, sort);
        let start = match cursor {
            // Exclusive cursor: resume after the named row. A cursor that no
            // longer matches the filter yields an empty page.
            Some(cursor_id) => match sorted.iter().position(|r| r.id() == cursor_id) {
                Some(index) => index + 1,
                None => return Ok(Vec::new()),
            },
            None => 0,
        };
        Ok(sorted.into_iter().skip(start).take(take).collect())
    }

    async fn create(&self, record: T) -> Result<T, StoreError> {
        let mut rows = self.rows.write().expect("store lock poisoned");
        if rows.contains_key(&record.id()) {
            return Err(StoreError::UniqueViolation {
                kind: T::KIND,
                constraint: "primary_key".to_string(),
            });
        }
        rows.insert(record.id(), record.clone());
        Ok(record)
    }

    async fn update(&self, id: EntityId, record: &T) -> Result<T, StoreError> {
        let mut rows = self.rows.write().expect("store lock poisoned");
        if !rows.contains_key(&id) {
            return Err(StoreError::NotFound { kind: T::KIND, id });
        }
        rows.insert(id, record.clone());
        Ok(record.clone())
    }

    async fn delete(&self, id: EntityId) -> Result<(), StoreError> {
        let mut rows = self.rows.write().expect("store lock poisoned");
        match rows.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound { kind: T::KIND, id }),
        }
    }

    async fn count(&self, filter: &Filter) -> Result<u64, StoreError> {
        let rows = self.rows.read().expect("store lock poisoned");
        Ok(rows.values().filter(|r| filter.matches(*r)).count() as u64)
    }
}

// ============================================================================
// TESTS
// ============================================================================
