//! Per-kind time-to-live policy.

use std::collections::HashMap;

use engram_core::EntityKind;

/// Mapping from entity kind to cache TTL in seconds.
///
/// A kind with no configured TTL is never written to the cache: the mediator
/// treats the missing entry as a bypass, not an error. The defaults keep
/// high-churn kinds (messages) short and slow-moving ones (organizations,
/// tools) long; memory-record kinds default to no TTL because their caching
/// is owned by callers, not the mediator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TtlPolicy {
    seconds: HashMap<EntityKind, u64>,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        let mut seconds = HashMap::new();
        seconds.insert(EntityKind::Organization, 3600);
        seconds.insert(EntityKind::Client, 3600);
        seconds.insert(EntityKind::User, 1800);
        seconds.insert(EntityKind::Agent, 900);
        seconds.insert(EntityKind::Tool, 3600);
        seconds.insert(EntityKind::Message, 300);
        Self { seconds }
    }
}

impl TtlPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// A policy with no entries: every kind bypasses the cache.
    pub fn disabled() -> Self {
        Self {
            seconds: HashMap::new(),
        }
    }

    /// The TTL for a kind, or `None` when the kind bypasses the cache.
    pub fn get(&self, kind: EntityKind) -> Option<u64> {
        self.seconds.get(&kind).copied()
    }

    /// Set or override a kind's TTL. Zero is rejected by debug assertion;
    /// use [`TtlPolicy::clear`] to bypass instead.
    pub fn set(mut self, kind: EntityKind, seconds: u64) -> Self {
        debug_assert!(seconds > 0, "TTL must be positive; clear() to bypass");
        self.seconds.insert(kind, seconds);
        self
    }

    /// Remove a kind's TTL, turning its cache writes into bypasses.
    pub fn clear(mut self, kind: EntityKind) -> Self {
        self.seconds.remove(&kind);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_cover_simple_kinds_only() {
        let policy = TtlPolicy::default();
        for kind in EntityKind::ALL {
            if kind.is_memory_record() {
                assert_eq!(policy.get(kind), None, "{:?} should bypass", kind);
            } else {
                assert!(policy.get(kind).is_some(), "{:?} should have a TTL", kind);
            }
        }
    }

    #[test]
    fn test_set_and_clear() {
        let policy = TtlPolicy::disabled()
            .set(EntityKind::Tool, 60)
            .set(EntityKind::User, 120)
            .clear(EntityKind::Tool);
        assert_eq!(policy.get(EntityKind::Tool), None);
        assert_eq!(policy.get(EntityKind::User), Some(120));
    }
}
