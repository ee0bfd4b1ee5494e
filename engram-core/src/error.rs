//! Error types for Engram data-layer operations

use thiserror::Error;
use uuid::Uuid;

use crate::kind::EntityKind;

/// Errors surfaced by a store delegate.
///
/// These are the raw shapes a delegate is allowed to report; the mediator
/// classifies them into the domain [`Error`] taxonomy exactly once, so
/// callers never match on store-specific conditions.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("Record not found: {kind} with id {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("Unique constraint violated on {kind}: {constraint}")]
    UniqueViolation { kind: EntityKind, constraint: String },

    #[error("Foreign key violated on {kind}.{field}")]
    ForeignKeyViolation { kind: EntityKind, field: String },

    #[error("Store backend error: {reason}")]
    Backend { reason: String },
}

/// Errors raised inside the cache tier.
///
/// The mediators absorb every one of these: a cache failure degrades a read
/// to the store path and turns a write into a logged no-op. They exist as a
/// type so the tier itself and direct cache callers can report precisely.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CacheError {
    #[error("Cache unavailable: {reason}")]
    Unavailable { reason: String },

    #[error("Cache serialization failed: {reason}")]
    Serialization { reason: String },

    #[error("Cached value could not be decoded: {reason}")]
    Decode { reason: String },

    #[error("Cache backend error: {reason}")]
    Backend { reason: String },
}

/// Master error type for all data-layer operations.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The record does not exist, or the actor's tenant cannot see it.
    /// The two cases are indistinguishable by design.
    #[error("Not found: {kind} with id {id}")]
    NotFound { kind: EntityKind, id: Uuid },

    #[error("Conflict on {kind}: {constraint}")]
    Conflict { kind: EntityKind, constraint: String },

    #[error("Invalid reference on {kind}.{field}")]
    InvalidReference { kind: EntityKind, field: String },

    /// Never escapes a mediator operation; present for direct cache callers.
    #[error("Cache unavailable: {0}")]
    Cache(#[from] CacheError),

    #[error("Unexpected store error on {kind}: {source}")]
    UnexpectedStore {
        kind: EntityKind,
        #[source]
        source: StoreError,
    },
}

/// Result type alias for Engram data-layer operations.
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// TESTS
// =============================================================================
