//! Cache tier trait and record representations.
//!
//! This module defines the operation set every cache backend implements.
//! The trait is object-safe so mediators can hold `Arc<dyn CacheTier>` and
//! tests can substitute the in-memory backend for the Redis one.

use std::collections::HashMap;

use async_trait::async_trait;
use engram_core::CacheError;
use serde_json::Value;

/// Result alias for cache-tier operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Flat cache representation: field name to string-encoded scalar.
///
/// No schema is stored alongside the fields; readers recover primitive types
/// with the ordered heuristics in [`crate::codec`].
pub type FlatRecord = HashMap<String, String>;

/// Physical representation an entity kind uses in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Field-map record, string-encoded values. Simple entities.
    Flat,
    /// Nested document preserved as-is. Memory-record kinds.
    Document,
}

/// Uniform interface over the external key/value service.
///
/// # Contracts
///
/// - Writes have overwrite semantics; an existing key is replaced silently.
/// - A `ttl_seconds` of `Some(n)` sets expiry atomically with (or immediately
///   after) the write. `None` writes without expiry.
/// - Reads return `None` for absent keys and for keys holding no fields;
///   a partially-readable record is never silently treated as present.
/// - `scan_page` is a restartable cursor in the style of the backing
///   service: keys may be delivered more than once while writes race the
///   scan, but a key present for the whole scan is never dropped.
/// - Bulk helpers issue pipelined requests, not one round-trip per key.
/// - Any operation may fail with [`CacheError::Unavailable`]; callers must
///   degrade rather than propagate.
#[async_trait]
pub trait CacheTier: Send + Sync {
    /// Write a flat record, optionally with expiry.
    async fn set_flat(
        &self,
        key: &str,
        fields: &FlatRecord,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()>;

    /// Read a whole flat record. `None` if absent or empty.
    async fn get_flat(&self, key: &str) -> CacheResult<Option<FlatRecord>>;

    /// Read selected fields of a flat record, positionally aligned with
    /// `field_names`; absent fields yield `None` in place.
    async fn get_flat_fields(
        &self,
        key: &str,
        field_names: &[&str],
    ) -> CacheResult<Vec<Option<String>>>;

    /// Read many flat records in one pipelined round-trip. Keys with no data
    /// are skipped in the result map.
    async fn get_many_flat(&self, keys: &[String]) -> CacheResult<HashMap<String, FlatRecord>>;

    /// Write a document record, optionally with expiry.
    async fn set_document(&self, key: &str, doc: &Value, ttl_seconds: Option<u64>)
        -> CacheResult<()>;

    /// Read a whole document record. `None` if absent.
    async fn get_document(&self, key: &str) -> CacheResult<Option<Value>>;

    /// Read a single dotted path out of a document record. Secondary
    /// operation; correctness never depends on it.
    async fn get_document_path(&self, key: &str, path: &str) -> CacheResult<Option<Value>>;

    /// Remove a key. `true` iff the key existed.
    async fn delete(&self, key: &str) -> CacheResult<bool>;

    /// Remove many keys; returns the number actually removed.
    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64>;

    /// Whether a key currently exists.
    async fn exists(&self, key: &str) -> CacheResult<bool>;

    /// One page of a restartable key scan. Pass `cursor = 0` to start;
    /// iteration is complete when the returned cursor is `0`.
    async fn scan_page(
        &self,
        pattern: &str,
        cursor: u64,
        count: usize,
    ) -> CacheResult<(u64, Vec<String>)>;

    /// Drain the scan cursor and collect every matching key.
    async fn scan_keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut keys = Vec::new();
        let mut cursor = 0u64;
        loop {
            let (next, mut batch) = self.scan_page(pattern, cursor, 100).await?;
            keys.append(&mut batch);
            if next == 0 {
                break;
            }
            cursor = next;
        }
        Ok(keys)
    }

    /// Current reachability of the backing service. A degraded tier returns
    /// `false` here instead of failing every call.
    fn ready(&self) -> bool;
}
