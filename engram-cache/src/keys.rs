//! Cache key naming.
//!
//! Wire format is `"<prefix><id>"`: one flat prefix per simple entity kind
//! and one document prefix per memory-record kind, enumerated here as
//! process-wide constants so every writer and reader agrees byte-for-byte.

use engram_core::{EntityId, EntityKind};

pub const ORGANIZATION_PREFIX: &str = "organization:";
pub const CLIENT_PREFIX: &str = "client:";
pub const USER_PREFIX: &str = "user:";
pub const AGENT_PREFIX: &str = "agent:";
pub const TOOL_PREFIX: &str = "tool:";
pub const MESSAGE_PREFIX: &str = "message:";
pub const EPISODIC_EVENT_PREFIX: &str = "episodic:";
pub const SEMANTIC_FACT_PREFIX: &str = "semantic:";
pub const PROCEDURAL_GUIDE_PREFIX: &str = "procedural:";
pub const RESOURCE_DOC_PREFIX: &str = "resource:";
pub const VAULT_ENTRY_PREFIX: &str = "vault:";

/// The key prefix for an entity kind.
pub fn prefix_for(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Organization => ORGANIZATION_PREFIX,
        EntityKind::Client => CLIENT_PREFIX,
        EntityKind::User => USER_PREFIX,
        EntityKind::Agent => AGENT_PREFIX,
        EntityKind::Tool => TOOL_PREFIX,
        EntityKind::Message => MESSAGE_PREFIX,
        EntityKind::EpisodicEvent => EPISODIC_EVENT_PREFIX,
        EntityKind::SemanticFact => SEMANTIC_FACT_PREFIX,
        EntityKind::ProceduralGuide => PROCEDURAL_GUIDE_PREFIX,
        EntityKind::ResourceDoc => RESOURCE_DOC_PREFIX,
        EntityKind::VaultEntry => VAULT_ENTRY_PREFIX,
    }
}

/// Build the cache key for a record.
pub fn key_for(kind: EntityKind, id: EntityId) -> String {
    format!("{}{}", prefix_for(kind), id)
}

/// The scan pattern matching every key of a kind.
pub fn pattern_for(kind: EntityKind) -> String {
    format!("{}*", prefix_for(kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use engram_core::new_entity_id;

    #[test]
    fn test_prefixes_are_distinct() {
        let mut prefixes: Vec<&str> = EntityKind::ALL.iter().map(|k| prefix_for(*k)).collect();
        prefixes.sort();
        prefixes.dedup();
        assert_eq!(prefixes.len(), EntityKind::ALL.len());
    }

    #[test]
    fn test_no_prefix_is_a_prefix_of_another() {
        for a in EntityKind::ALL {
            for b in EntityKind::ALL {
                if a != b {
                    assert!(
                        !prefix_for(a).starts_with(prefix_for(b)),
                        "{:?} prefix shadows {:?}",
                        a,
                        b
                    );
                }
            }
        }
    }

    #[test]
    fn test_key_for_embeds_id() {
        let id = new_entity_id();
        let key = key_for(EntityKind::Tool, id);
        assert!(key.starts_with(TOOL_PREFIX));
        assert!(key.ends_with(&id.to_string()));
    }

    #[test]
    fn test_pattern_matches_key_shape() {
        let pattern = pattern_for(EntityKind::Agent);
        assert_eq!(pattern, "agent:*");
    }
}
