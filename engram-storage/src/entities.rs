//! Entity-specific managers.
//!
//! Thin wiring over the generic mediators: each constructor supplies the
//! kind's key prefix, TTL from the policy table, and representation. The
//! refinements below (`find_by_name`, `list_for_agent`) are representative
//! type-specific queries; anything heavier belongs to the service layer, not
//! here.

use std::sync::Arc;

use engram_cache::{keys, CacheTier, TtlPolicy};
use engram_core::{
    ActorContext, Agent, Client, EntityId, EntityKind, EpisodicEvent, Message, Organization,
    ProceduralGuide, ResourceDoc, Result, SemanticFact, Tool, User, VaultEntry,
};

use crate::manager::{classify_store, CachePolicy, EntityManager};
use crate::memory_manager::MemoryRecordManager;
use crate::page::{ListOptions, Page};
use crate::query::{Filter, Predicate};
use crate::store::StoreDelegate;

pub type OrganizationManager<S> = EntityManager<Organization, S>;
pub type ClientManager<S> = EntityManager<Client, S>;
pub type UserManager<S> = EntityManager<User, S>;
pub type AgentManager<S> = EntityManager<Agent, S>;
pub type ToolManager<S> = EntityManager<Tool, S>;
pub type MessageManager<S> = EntityManager<Message, S>;

pub type EpisodicEventManager<S> = MemoryRecordManager<EpisodicEvent, S>;
pub type SemanticFactManager<S> = MemoryRecordManager<SemanticFact, S>;
pub type ProceduralGuideManager<S> = MemoryRecordManager<ProceduralGuide, S>;
pub type ResourceDocManager<S> = MemoryRecordManager<ResourceDoc, S>;
pub type VaultEntryManager<S> = MemoryRecordManager<VaultEntry, S>;

macro_rules! flat_manager_constructor {
    ($name:ident, $record:ty, $kind:expr, $prefix:expr) => {
        #[doc = concat!("Wire a `", stringify!($record), "` manager with its flat cache policy.")]
        pub fn $name<S: StoreDelegate<$record>>(
            store: S,
            cache: Option<Arc<dyn CacheTier>>,
            ttl: &TtlPolicy,
        ) -> EntityManager<$record, S> {
            EntityManager::new(store, cache, CachePolicy::flat($prefix, ttl.get($kind)))
        }
    };
}

flat_manager_constructor!(
    organization_manager,
    Organization,
    EntityKind::Organization,
    keys::ORGANIZATION_PREFIX
);
flat_manager_constructor!(client_manager, Client, EntityKind::Client, keys::CLIENT_PREFIX);
flat_manager_constructor!(user_manager, User, EntityKind::User, keys::USER_PREFIX);
flat_manager_constructor!(agent_manager, Agent, EntityKind::Agent, keys::AGENT_PREFIX);
flat_manager_constructor!(tool_manager, Tool, EntityKind::Tool, keys::TOOL_PREFIX);
flat_manager_constructor!(
    message_manager,
    Message,
    EntityKind::Message,
    keys::MESSAGE_PREFIX
);

impl<S: StoreDelegate<Tool>> EntityManager<Tool, S> {
    /// Look a live tool up by its name within the actor's tenant.
    pub async fn find_by_name(
        &self,
        name: &str,
        actor: Option<&ActorContext>,
    ) -> Result<Option<Tool>> {
        let mut filter = Filter::new().name(name).deleted(false);
        if let Some(actor) = actor {
            filter = filter.organization(actor.organization_id);
        }
        self.store()
            .find_first(&filter)
            .await
            .map_err(classify_store::<Tool>)
    }
}

impl<S: StoreDelegate<Message>> EntityManager<Message, S> {
    /// List one agent's messages, tenant-scoped like [`EntityManager::list`].
    pub async fn list_for_agent(
        &self,
        agent_id: EntityId,
        actor: Option<&ActorContext>,
        opts: ListOptions,
    ) -> Result<Page<Message>> {
        self.list_with(actor, opts, vec![Predicate::AgentEq(agent_id)])
            .await
    }
}

// ============================================================================
// TESTS
// ============================================================================
