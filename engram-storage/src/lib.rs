//! ENGRAM Storage - Cache-Aside Mediators
//!
//! The generic CRUD engine every entity manager extends. A manager supplies a
//! store delegate, a cache policy (key prefix, TTL, representation), and the
//! entity's input-shaping; the mediator owns read-through population,
//! write-refresh-or-invalidate, actor-scoped query construction, cursor
//! pagination, and error classification.
//!
//! The authoritative store is consumed as an opaque [`StoreDelegate`]; the
//! in-memory [`MemoryStore`] implementation backs the test suites and any
//! embedded deployment.

pub mod entities;
pub mod manager;
pub mod memory_manager;
pub mod mock;
pub mod page;
pub mod query;
pub mod store;

pub use manager::{CachePolicy, EntityManager};
pub use memory_manager::MemoryRecordManager;
pub use mock::MemoryStore;
pub use page::{ListOptions, Page, ReadOptions};
pub use query::{Filter, Predicate, Sort, SortKey, SortOrder};
pub use store::StoreDelegate;

pub use entities::{
    AgentManager, ClientManager, EpisodicEventManager, MessageManager, OrganizationManager,
    ProceduralGuideManager, ResourceDocManager, SemanticFactManager, ToolManager, UserManager,
    VaultEntryManager,
};
