//! ENGRAM Core - Entity Types
//!
//! Pure data structures with no I/O. All other crates depend on this.
//! This crate contains the entity records, the actor context used to scope
//! operations to a tenant, and the error taxonomy shared by the cache and
//! storage layers.

pub mod actor;
pub mod entity;
pub mod error;
pub mod identity;
pub mod kind;
pub mod records;

pub use actor::ActorContext;
pub use entity::{CreateContext, CreateInput, Entity};
pub use error::{CacheError, Error, Result, StoreError};
pub use identity::{new_entity_id, EntityId, Timestamp};
pub use kind::EntityKind;

pub use records::{
    Agent, AgentPatch, Client, ClientPatch, CreateAgent, CreateClient, CreateEpisodicEvent,
    CreateMessage, CreateOrganization, CreateProceduralGuide, CreateResourceDoc,
    CreateSemanticFact, CreateTool, CreateUser, CreateVaultEntry, EpisodicEvent,
    EpisodicEventPatch, Message, MessagePatch, Organization, OrganizationPatch, ProceduralGuide,
    ProceduralGuidePatch, ResourceDoc, ResourceDocPatch, SemanticFact, SemanticFactPatch, Tool,
    ToolPatch, User, UserPatch, VaultEntry, VaultEntryPatch,
};
