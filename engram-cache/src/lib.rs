//! ENGRAM Cache - Cache Tier
//!
//! A thin, entity-agnostic client over an external key/value service. Records
//! are stored in one of two physical representations: flat field-maps for
//! simple entities, nested documents for the embedding-bearing memory-record
//! kinds. Every write carries the entity kind's configured TTL; kinds without
//! one bypass the cache entirely.
//!
//! The tier is never authoritative. Every operation can fail with
//! [`engram_core::CacheError`], and callers above (the mediators in
//! `engram-storage`) treat any failure as a cache miss or a best-effort
//! no-op, so a degraded cache slows reads down but never fails them.

pub mod codec;
pub mod keys;
pub mod memory_tier;
pub mod metrics;
pub mod redis_tier;
pub mod settings;
pub mod tier;
pub mod ttl;

pub use codec::{decode_flat, decode_value, encode_flat, CacheValue};
pub use keys::key_for;
pub use memory_tier::MemoryCacheTier;
pub use metrics::CacheMetrics;
pub use redis_tier::RedisCacheTier;
pub use settings::CacheSettings;
pub use tier::{CacheResult, CacheTier, FlatRecord, Representation};
pub use ttl::TtlPolicy;
