//! In-memory cache tier.
//!
//! A process-local substitute for the Redis backend, used by mediator tests
//! and by deployments that run without an external cache. Honors TTL by
//! lazy expiry on read; scan cursors index into a sorted snapshot of the
//! key space, which gives the same at-least-once delivery the real backend
//! provides.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use serde_json::Value;

use crate::tier::{CacheResult, CacheTier, FlatRecord};

#[derive(Debug, Clone)]
enum Stored {
    Flat(FlatRecord),
    Document(Value),
}

#[derive(Debug, Clone)]
struct Entry {
    value: Stored,
    expires_at: Option<Instant>,
}

impl Entry {
    fn is_expired(&self) -> bool {
        self.expires_at.is_some_and(|at| at <= Instant::now())
    }
}

/// In-memory implementation of [`CacheTier`].
#[derive(Debug, Default)]
pub struct MemoryCacheTier {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryCacheTier {
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, key: &str, value: Stored, ttl_seconds: Option<u64>) {
        let entry = Entry {
            value,
            expires_at: ttl_seconds.map(|s| Instant::now() + Duration::from_secs(s)),
        };
        self.entries
            .write()
            .expect("cache lock poisoned")
            .insert(key.to_string(), entry);
    }

    fn live(&self, key: &str) -> Option<Stored> {
        let entries = self.entries.read().expect("cache lock poisoned");
        entries
            .get(key)
            .filter(|e| !e.is_expired())
            .map(|e| e.value.clone())
    }

    /// Force a key to expire immediately. Test hook.
    #[cfg(test)]
    pub(crate) fn expire_now(&self, key: &str) {
        if let Some(entry) = self
            .entries
            .write()
            .expect("cache lock poisoned")
            .get_mut(key)
        {
            entry.expires_at = Some(Instant::now() - Duration::from_secs(1));
        }
    }
}

/// Glob matching supporting `*` wildcards, the subset the scan contract
/// requires.
fn glob_match(pattern: &str, key: &str) -> bool {
    let parts: Vec<&str> = pattern.split('*').collect();
    if parts.len() == 1 {
        return pattern == key;
    }
    let mut rest = key;
    if !rest.starts_with(parts[0]) {
        return false;
    }
    rest = &rest[parts[0].len()..];
    for part in &parts[1..parts.len() - 1] {
        if part.is_empty() {
            continue;
        }
        match rest.find(part) {
            Some(i) => rest = &rest[i + part.len()..],
            None => return false,
        }
    }
    let last = parts[parts.len() - 1];
    last.is_empty() || rest.ends_with(last)
}

#[async_trait]
impl CacheTier for MemoryCacheTier {
    async fn set_flat(
        &self,
        key: &str,
        fields: &FlatRecord,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.store(key, Stored::Flat(fields.clone()), ttl_seconds);
        Ok(())
    }

    async fn get_flat(&self, key: &str) -> CacheResult<Option<FlatRecord>> {
        Ok(match self.live(key) {
            Some(Stored::Flat(fields)) if !fields.is_empty() => Some(fields),
            _ => None,
        })
    }

    async fn get_flat_fields(
        &self,
        key: &str,
        field_names: &[&str],
    ) -> CacheResult<Vec<Option<String>>> {
        let fields = match self.live(key) {
            Some(Stored::Flat(fields)) => fields,
            _ => FlatRecord::new(),
        };
        Ok(field_names
            .iter()
            .map(|name| fields.get(*name).cloned())
            .collect())
    }

    async fn get_many_flat(&self, keys: &[String]) -> CacheResult<HashMap<String, FlatRecord>> {
        let mut found = HashMap::new();
        for key in keys {
            if let Some(Stored::Flat(fields)) = self.live(key) {
                if !fields.is_empty() {
                    found.insert(key.clone(), fields);
                }
            }
        }
        Ok(found)
    }

    async fn set_document(
        &self,
        key: &str,
        doc: &Value,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        self.store(key, Stored::Document(doc.clone()), ttl_seconds);
        Ok(())
    }

    async fn get_document(&self, key: &str) -> CacheResult<Option<Value>> {
        Ok(match self.live(key) {
            Some(Stored::Document(doc)) => Some(doc),
            _ => None,
        })
    }

    async fn get_document_path(&self, key: &str, path: &str) -> CacheResult<Option<Value>> {
        let Some(Stored::Document(doc)) = self.live(key) else {
            return Ok(None);
        };
        let mut current = &doc;
        for segment in path.split('.') {
            match current.get(segment) {
                Some(next) => current = next,
                None => return Ok(None),
            }
        }
        Ok(Some(current.clone()))
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let removed = self
            .entries
            .write()
            .expect("cache lock poisoned")
            .remove(key);
        Ok(removed.is_some_and(|e| !e.is_expired()))
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        let mut entries = self.entries.write().expect("cache lock poisoned");
        let mut removed = 0;
        for key in keys {
            if entries.remove(key).is_some_and(|e| !e.is_expired()) {
                removed += 1;
            }
        }
        Ok(removed)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        Ok(self.live(key).is_some())
    }

    async fn scan_page(
        &self,
        pattern: &str,
        cursor: u64,
        count: usize,
    ) -> CacheResult<(u64, Vec<String>)> {
        let entries = self.entries.read().expect("cache lock poisoned");
        let mut matching: Vec<String> = entries
            .iter()
            .filter(|(k, e)| !e.is_expired() && glob_match(pattern, k))
            .map(|(k, _)| k.clone())
            .collect();
        matching.sort();

        let start = cursor as usize;
        let end = (start + count.max(1)).min(matching.len());
        let page = matching.get(start..end).unwrap_or_default().to_vec();
        let next = if end >= matching.len() { 0 } else { end as u64 };
        Ok((next, page))
    }

    fn ready(&self) -> bool {
        true
    }
}

// ============================================================================
// TESTS
// ============================================================================
