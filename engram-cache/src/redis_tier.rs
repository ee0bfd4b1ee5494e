//! Redis-backed cache tier.
//!
//! Flat records map onto hashes (`HSET`/`HGETALL`/`HMGET`), document records
//! onto RedisJSON values (`JSON.SET`/`JSON.GET`), key enumeration onto `SCAN`
//! cursors, and bulk reads onto pipelines so list operations stay one
//! round-trip.
//!
//! # Connection lifecycle
//!
//! One `RedisCacheTier` wraps one multiplexed connection manager and is meant
//! to be constructed once per process at the composition root, then shared as
//! `Arc<dyn CacheTier>` by every manager. The manager reconnects on its own
//! with exponential backoff; on top of that, each command retries transient
//! failures up to the configured ceiling. Reachability is tracked in an
//! atomic flag so a degraded tier answers `ready() == false` instead of
//! erroring from every call site.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use engram_core::CacheError;
use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::{Client, FromRedisValue, RedisError};
use serde_json::Value;
use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::settings::CacheSettings;
use crate::tier::{CacheResult, CacheTier, FlatRecord};

fn to_cache_error(e: RedisError) -> CacheError {
    if is_transient(&e) {
        CacheError::Unavailable {
            reason: e.to_string(),
        }
    } else {
        CacheError::Backend {
            reason: e.to_string(),
        }
    }
}

fn is_transient(e: &RedisError) -> bool {
    e.is_connection_dropped() || e.is_io_error() || e.is_timeout()
}

/// Redis implementation of [`CacheTier`].
pub struct RedisCacheTier {
    client: Client,
    conn: OnceCell<ConnectionManager>,
    settings: CacheSettings,
    reachable: AtomicBool,
}

impl RedisCacheTier {
    /// Connect according to the settings. With `lazy_connect` the first
    /// command establishes the connection instead.
    pub async fn connect(settings: CacheSettings) -> CacheResult<Self> {
        let url = effective_url(&settings);
        let client = Client::open(url.as_str()).map_err(to_cache_error)?;
        let tier = Self {
            client,
            conn: OnceCell::new(),
            settings,
            reachable: AtomicBool::new(false),
        };
        if !tier.settings.lazy_connect {
            tier.connection().await?;
            tier.reachable.store(true, Ordering::Relaxed);
        }
        Ok(tier)
    }

    fn manager_config(&self) -> ConnectionManagerConfig {
        ConnectionManagerConfig::new()
            .set_number_of_retries(self.settings.max_retries)
            .set_factor(self.settings.backoff_base.as_millis().max(1) as u64)
            .set_exponent_base(2)
            .set_connection_timeout(self.settings.connect_timeout)
            .set_response_timeout(self.settings.command_timeout)
    }

    async fn connection(&self) -> CacheResult<ConnectionManager> {
        let manager = self
            .conn
            .get_or_try_init(|| async {
                self.client
                    .get_connection_manager_with_config(self.manager_config())
                    .await
            })
            .await
            .map_err(|e| {
                self.reachable.store(false, Ordering::Relaxed);
                CacheError::Unavailable {
                    reason: e.to_string(),
                }
            })?;
        Ok(manager.clone())
    }

    /// Run one command with bounded exponential-backoff retry on transient
    /// failure.
    async fn query<T: FromRedisValue>(&self, cmd: &redis::Cmd) -> CacheResult<T> {
        if !self.ready() && !self.settings.queue_when_offline && self.conn.get().is_some() {
            return Err(CacheError::Unavailable {
                reason: "cache marked offline and offline queueing is disabled".to_string(),
            });
        }
        let mut conn = self.connection().await?;
        let mut attempt: u32 = 0;
        loop {
            let result: Result<T, RedisError> = cmd.query_async(&mut conn).await;
            match result {
                Ok(value) => {
                    self.reachable.store(true, Ordering::Relaxed);
                    return Ok(value);
                }
                Err(e) if is_transient(&e) && (attempt as usize) < self.settings.max_retries => {
                    attempt += 1;
                    let delay = self.settings.backoff_base * 2u32.saturating_pow(attempt - 1);
                    debug!(attempt, ?delay, error = %e, "cache command retry");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    self.reachable.store(false, Ordering::Relaxed);
                    return Err(to_cache_error(e));
                }
            }
        }
    }

    /// Pipeline variant of [`Self::query`]. Retrying a pipeline re-issues
    /// all of its commands, which is safe here because every pipeline this
    /// tier builds has overwrite semantics.
    async fn exec_pipeline<T: FromRedisValue>(&self, pipe: &redis::Pipeline) -> CacheResult<T> {
        let mut conn = self.connection().await?;
        let mut attempt: u32 = 0;
        loop {
            let result: Result<T, RedisError> = pipe.query_async(&mut conn).await;
            match result {
                Ok(value) => {
                    self.reachable.store(true, Ordering::Relaxed);
                    return Ok(value);
                }
                Err(e) if is_transient(&e) && (attempt as usize) < self.settings.max_retries => {
                    attempt += 1;
                    let delay = self.settings.backoff_base * 2u32.saturating_pow(attempt - 1);
                    debug!(attempt, ?delay, error = %e, "cache pipeline retry");
                    tokio::time::sleep(delay).await;
                }
                Err(e) => {
                    self.reachable.store(false, Ordering::Relaxed);
                    return Err(to_cache_error(e));
                }
            }
        }
    }
}

/// Fold the logical database index into the connection url unless the url
/// already names one.
fn effective_url(settings: &CacheSettings) -> String {
    if settings.database == 0 {
        return settings.url.clone();
    }
    let after_scheme = settings
        .url
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(&settings.url);
    if after_scheme.contains('/') {
        settings.url.clone()
    } else {
        format!("{}/{}", settings.url, settings.database)
    }
}

#[async_trait]
impl CacheTier for RedisCacheTier {
    async fn set_flat(
        &self,
        key: &str,
        fields: &FlatRecord,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        if fields.is_empty() {
            return Ok(());
        }
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("HSET").arg(key);
        for (field, value) in fields {
            pipe.arg(field.as_str()).arg(value.as_str());
        }
        pipe.ignore();
        if let Some(ttl) = ttl_seconds {
            pipe.cmd("EXPIRE").arg(key).arg(ttl).ignore();
        }
        self.exec_pipeline::<()>(&pipe).await
    }

    async fn get_flat(&self, key: &str) -> CacheResult<Option<FlatRecord>> {
        let fields: HashMap<String, String> =
            self.query(redis::cmd("HGETALL").arg(key)).await?;
        Ok(if fields.is_empty() { None } else { Some(fields) })
    }

    async fn get_flat_fields(
        &self,
        key: &str,
        field_names: &[&str],
    ) -> CacheResult<Vec<Option<String>>> {
        if field_names.is_empty() {
            return Ok(Vec::new());
        }
        let mut cmd = redis::cmd("HMGET");
        cmd.arg(key);
        for name in field_names {
            cmd.arg(*name);
        }
        self.query(&cmd).await
    }

    async fn get_many_flat(&self, keys: &[String]) -> CacheResult<HashMap<String, FlatRecord>> {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }
        let mut pipe = redis::pipe();
        for key in keys {
            pipe.cmd("HGETALL").arg(key);
        }
        let maps: Vec<HashMap<String, String>> = self.exec_pipeline(&pipe).await?;
        Ok(keys
            .iter()
            .zip(maps)
            .filter(|(_, fields)| !fields.is_empty())
            .map(|(key, fields)| (key.clone(), fields))
            .collect())
    }

    async fn set_document(
        &self,
        key: &str,
        doc: &Value,
        ttl_seconds: Option<u64>,
    ) -> CacheResult<()> {
        let body = serde_json::to_string(doc).map_err(|e| CacheError::Serialization {
            reason: e.to_string(),
        })?;
        let mut pipe = redis::pipe();
        pipe.atomic();
        pipe.cmd("JSON.SET").arg(key).arg("$").arg(body).ignore();
        if let Some(ttl) = ttl_seconds {
            pipe.cmd("EXPIRE").arg(key).arg(ttl).ignore();
        }
        self.exec_pipeline::<()>(&pipe).await
    }

    async fn get_document(&self, key: &str) -> CacheResult<Option<Value>> {
        let raw: Option<String> = self.query(redis::cmd("JSON.GET").arg(key).arg("$")).await?;
        decode_json_path_reply(raw)
    }

    async fn get_document_path(&self, key: &str, path: &str) -> CacheResult<Option<Value>> {
        let json_path = format!("$.{}", path);
        let raw: Option<String> = self
            .query(redis::cmd("JSON.GET").arg(key).arg(json_path))
            .await?;
        decode_json_path_reply(raw)
    }

    async fn delete(&self, key: &str) -> CacheResult<bool> {
        let removed: i64 = self.query(redis::cmd("DEL").arg(key)).await?;
        Ok(removed > 0)
    }

    async fn delete_many(&self, keys: &[String]) -> CacheResult<u64> {
        if keys.is_empty() {
            return Ok(0);
        }
        let mut cmd = redis::cmd("DEL");
        for key in keys {
            cmd.arg(key);
        }
        let removed: i64 = self.query(&cmd).await?;
        Ok(removed.max(0) as u64)
    }

    async fn exists(&self, key: &str) -> CacheResult<bool> {
        let found: i64 = self.query(redis::cmd("EXISTS").arg(key)).await?;
        Ok(found > 0)
    }

    async fn scan_page(
        &self,
        pattern: &str,
        cursor: u64,
        count: usize,
    ) -> CacheResult<(u64, Vec<String>)> {
        self.query(
            redis::cmd("SCAN")
                .arg(cursor)
                .arg("MATCH")
                .arg(pattern)
                .arg("COUNT")
                .arg(count.max(1)),
        )
        .await
    }

    fn ready(&self) -> bool {
        self.reachable.load(Ordering::Relaxed)
    }
}

/// RedisJSON `$`-path replies arrive as a JSON array of matches; unwrap the
/// first match, treating an empty array or nil reply as a miss.
fn decode_json_path_reply(raw: Option<String>) -> CacheResult<Option<Value>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let parsed: Value = serde_json::from_str(&raw).map_err(|e| {
        warn!(error = %e, "cache document reply was not valid JSON");
        CacheError::Decode {
            reason: e.to_string(),
        }
    })?;
    match parsed {
        Value::Array(mut matches) => {
            if matches.is_empty() {
                Ok(None)
            } else {
                Ok(Some(matches.remove(0)))
            }
        }
        // Legacy (non-`$`) path replies come back bare.
        other => Ok(Some(other)),
    }
}

// ============================================================================
// TESTS
// ============================================================================
