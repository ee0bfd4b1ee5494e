//! Entity kind discriminant

use serde::{Deserialize, Serialize};

/// Discriminant for every record kind the data layer manages.
///
/// Used in error messages, cache key prefixes, and the TTL policy table.
/// The first six kinds are flat-cached simple entities; the remaining five
/// are the embedding-bearing memory-record kinds stored in document form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Organization,
    Client,
    User,
    Agent,
    Tool,
    Message,
    EpisodicEvent,
    SemanticFact,
    ProceduralGuide,
    ResourceDoc,
    VaultEntry,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 11] = [
        EntityKind::Organization,
        EntityKind::Client,
        EntityKind::User,
        EntityKind::Agent,
        EntityKind::Tool,
        EntityKind::Message,
        EntityKind::EpisodicEvent,
        EntityKind::SemanticFact,
        EntityKind::ProceduralGuide,
        EntityKind::ResourceDoc,
        EntityKind::VaultEntry,
    ];

    /// True for the five embedding-bearing memory-record kinds.
    pub fn is_memory_record(self) -> bool {
        matches!(
            self,
            EntityKind::EpisodicEvent
                | EntityKind::SemanticFact
                | EntityKind::ProceduralGuide
                | EntityKind::ResourceDoc
                | EntityKind::VaultEntry
        )
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Organization => "organization",
            EntityKind::Client => "client",
            EntityKind::User => "user",
            EntityKind::Agent => "agent",
            EntityKind::Tool => "tool",
            EntityKind::Message => "message",
            EntityKind::EpisodicEvent => "episodic_event",
            EntityKind::SemanticFact => "semantic_fact",
            EntityKind::ProceduralGuide => "procedural_guide",
            EntityKind::ResourceDoc => "resource_doc",
            EntityKind::VaultEntry => "vault_entry",
        };
        write!(f, "{}", name)
    }
}
