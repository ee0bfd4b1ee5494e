//! Domain record structures
//!
//! Six simple entities (flat-cached) and five embedding-bearing memory-record
//! kinds (document-cached). Every record carries the common bookkeeping block:
//! id, soft-delete flag, tenant, timestamps, and last-modifying actor. Create
//! inputs name only caller-supplied fields; patches are all-`Option` structs
//! with `Default` meaning "no change".

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::entity::{CreateContext, CreateInput, Entity};
use crate::identity::{EntityId, Timestamp};
use crate::kind::EntityKind;

/// Expands to the bookkeeping accessors shared by every record.
macro_rules! bookkeeping {
    (common) => {
        fn id(&self) -> EntityId {
            self.id
        }
        fn is_deleted(&self) -> bool {
            self.is_deleted
        }
        fn set_deleted(&mut self, deleted: bool) {
            self.is_deleted = deleted;
        }
        fn created_at(&self) -> Timestamp {
            self.created_at
        }
        fn updated_at(&self) -> Timestamp {
            self.updated_at
        }
        fn touch(&mut self, now: Timestamp, actor_id: Option<EntityId>) {
            self.updated_at = now;
            self.last_updated_by_id = actor_id;
        }
    };
    (tenant) => {
        fn organization_id(&self) -> Option<EntityId> {
            Some(self.organization_id)
        }
        bookkeeping!(common);
    };
}

// ============================================================================
// ORGANIZATION (tenant-agnostic)
// ============================================================================

/// Organization - the tenant. The only record kind not scoped by an actor's
/// tenant, since it *is* the tenant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Organization {
    pub id: EntityId,
    pub name: String,
    /// Prepaid usage credits.
    pub credits: f64,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateOrganization {
    pub name: String,
    pub credits: f64,
}

#[derive(Debug, Clone, Default)]
pub struct OrganizationPatch {
    pub name: Option<String>,
    pub credits: Option<f64>,
}

impl CreateInput for CreateOrganization {}

impl Entity for Organization {
    const KIND: EntityKind = EntityKind::Organization;
    const TENANT_SCOPED: bool = false;
    type Create = CreateOrganization;
    type Patch = OrganizationPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            name: input.name,
            credits: input.credits,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(credits) = patch.credits {
            self.credits = credits;
        }
    }

    fn organization_id(&self) -> Option<EntityId> {
        None
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    bookkeeping!(common);
}

// ============================================================================
// CLIENT (client application)
// ============================================================================

/// Client - an API client application registered under an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Client {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateClient {
    pub organization_id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: Option<String>,
    pub description: Option<String>,
}

impl CreateInput for CreateClient {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for Client {
    const KIND: EntityKind = EntityKind::Client;
    type Create = CreateClient;
    type Patch = ClientPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            name: input.name,
            description: input.description,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    bookkeeping!(tenant);
}

// ============================================================================
// USER (account)
// ============================================================================

/// User - an end-user account inside an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub name: String,
    pub email: String,
    pub timezone: Option<String>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateUser {
    pub organization_id: Option<EntityId>,
    pub name: String,
    pub email: String,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct UserPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub timezone: Option<String>,
}

impl CreateInput for CreateUser {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for User {
    const KIND: EntityKind = EntityKind::User;
    type Create = CreateUser;
    type Patch = UserPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            name: input.name,
            email: input.email,
            timezone: input.timezone,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(email) = patch.email {
            self.email = email;
        }
        if let Some(timezone) = patch.timezone {
            self.timezone = Some(timezone);
        }
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    bookkeeping!(tenant);
}

// ============================================================================
// AGENT
// ============================================================================

/// Agent - a configured assistant owned by an organization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub model: Option<String>,
    pub metadata: Option<Value>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateAgent {
    pub organization_id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
    pub model: Option<String>,
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Default)]
pub struct AgentPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub model: Option<String>,
    pub metadata: Option<Value>,
}

impl CreateInput for CreateAgent {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for Agent {
    const KIND: EntityKind = EntityKind::Agent;
    type Create = CreateAgent;
    type Patch = AgentPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            name: input.name,
            description: input.description,
            model: input.model,
            metadata: input.metadata,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(model) = patch.model {
            self.model = Some(model);
        }
        if let Some(metadata) = patch.metadata {
            self.metadata = Some(metadata);
        }
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    bookkeeping!(tenant);
}

// ============================================================================
// TOOL
// ============================================================================

/// Tool - a callable tool definition. `parameters` holds the JSON schema of
/// the tool's arguments, uninterpreted by this layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub name: String,
    pub description: Option<String>,
    pub parameters: Option<Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateTool {
    pub organization_id: Option<EntityId>,
    pub name: String,
    pub description: Option<String>,
    pub parameters: Option<Value>,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ToolPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub parameters: Option<Value>,
    pub tags: Option<Vec<String>>,
}

impl CreateInput for CreateTool {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for Tool {
    const KIND: EntityKind = EntityKind::Tool;
    type Create = CreateTool;
    type Patch = ToolPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            name: input.name,
            description: input.description,
            parameters: input.parameters,
            tags: input.tags,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = Some(description);
        }
        if let Some(parameters) = patch.parameters {
            self.parameters = Some(parameters);
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    bookkeeping!(tenant);
}

// ============================================================================
// MESSAGE
// ============================================================================

/// Message - one conversational turn exchanged with an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub agent_id: EntityId,
    pub user_id: Option<EntityId>,
    pub role: String,
    pub content: String,
    pub model: Option<String>,
    /// Position within the agent's conversation.
    pub sequence: i64,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateMessage {
    pub organization_id: Option<EntityId>,
    pub agent_id: EntityId,
    pub user_id: Option<EntityId>,
    pub role: String,
    pub content: String,
    pub model: Option<String>,
    pub sequence: i64,
}

#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub model: Option<String>,
}

impl CreateInput for CreateMessage {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for Message {
    const KIND: EntityKind = EntityKind::Message;
    type Create = CreateMessage;
    type Patch = MessagePatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            agent_id: input.agent_id,
            user_id: input.user_id,
            role: input.role,
            content: input.content,
            model: input.model,
            sequence: input.sequence,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(model) = patch.model {
            self.model = Some(model);
        }
    }

    fn agent_id(&self) -> Option<EntityId> {
        Some(self.agent_id)
    }

    bookkeeping!(tenant);
}

// ============================================================================
// MEMORY-RECORD KINDS
// ============================================================================

/// EpisodicEvent - a time-stamped occurrence in an agent's experience.
/// Carries independent embeddings for its summary and its full detail text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EpisodicEvent {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub agent_id: EntityId,
    pub occurred_at: Timestamp,
    pub event_type: String,
    pub summary: String,
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_embedding: Option<Vec<f32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details_embedding: Option<Vec<f32>>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateEpisodicEvent {
    pub organization_id: Option<EntityId>,
    pub agent_id: EntityId,
    pub occurred_at: Option<Timestamp>,
    pub event_type: String,
    pub summary: String,
    pub details: Option<String>,
    pub summary_embedding: Option<Vec<f32>>,
    pub details_embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default)]
pub struct EpisodicEventPatch {
    pub event_type: Option<String>,
    pub summary: Option<String>,
    pub details: Option<String>,
    pub summary_embedding: Option<Vec<f32>>,
    pub details_embedding: Option<Vec<f32>>,
}

impl CreateInput for CreateEpisodicEvent {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for EpisodicEvent {
    const KIND: EntityKind = EntityKind::EpisodicEvent;
    type Create = CreateEpisodicEvent;
    type Patch = EpisodicEventPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            agent_id: input.agent_id,
            occurred_at: input.occurred_at.unwrap_or(ctx.now),
            event_type: input.event_type,
            summary: input.summary,
            details: input.details,
            summary_embedding: input.summary_embedding,
            details_embedding: input.details_embedding,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(event_type) = patch.event_type {
            self.event_type = event_type;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        if let Some(details) = patch.details {
            self.details = Some(details);
        }
        if let Some(embedding) = patch.summary_embedding {
            self.summary_embedding = Some(embedding);
        }
        if let Some(embedding) = patch.details_embedding {
            self.details_embedding = Some(embedding);
        }
    }

    fn agent_id(&self) -> Option<EntityId> {
        Some(self.agent_id)
    }

    bookkeeping!(tenant);
}

/// SemanticFact - a standing fact the agent knows, independent of when it
/// was learned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticFact {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub agent_id: EntityId,
    pub name: String,
    pub summary: String,
    pub details: Option<String>,
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateSemanticFact {
    pub organization_id: Option<EntityId>,
    pub agent_id: EntityId,
    pub name: String,
    pub summary: String,
    pub details: Option<String>,
    pub source: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default)]
pub struct SemanticFactPatch {
    pub name: Option<String>,
    pub summary: Option<String>,
    pub details: Option<String>,
    pub source: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

impl CreateInput for CreateSemanticFact {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for SemanticFact {
    const KIND: EntityKind = EntityKind::SemanticFact;
    type Create = CreateSemanticFact;
    type Patch = SemanticFactPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            agent_id: input.agent_id,
            name: input.name,
            summary: input.summary,
            details: input.details,
            source: input.source,
            embedding: input.embedding,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(summary) = patch.summary {
            self.summary = summary;
        }
        if let Some(details) = patch.details {
            self.details = Some(details);
        }
        if let Some(source) = patch.source {
            self.source = Some(source);
        }
        if let Some(embedding) = patch.embedding {
            self.embedding = Some(embedding);
        }
    }

    fn agent_id(&self) -> Option<EntityId> {
        Some(self.agent_id)
    }

    fn name(&self) -> Option<&str> {
        Some(&self.name)
    }

    bookkeeping!(tenant);
}

/// ProceduralGuide - an ordered how-to the agent has learned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProceduralGuide {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub agent_id: EntityId,
    pub title: String,
    pub steps: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateProceduralGuide {
    pub organization_id: Option<EntityId>,
    pub agent_id: EntityId,
    pub title: String,
    pub steps: Vec<String>,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default)]
pub struct ProceduralGuidePatch {
    pub title: Option<String>,
    pub steps: Option<Vec<String>>,
    pub embedding: Option<Vec<f32>>,
}

impl CreateInput for CreateProceduralGuide {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for ProceduralGuide {
    const KIND: EntityKind = EntityKind::ProceduralGuide;
    type Create = CreateProceduralGuide;
    type Patch = ProceduralGuidePatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            agent_id: input.agent_id,
            title: input.title,
            steps: input.steps,
            embedding: input.embedding,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(steps) = patch.steps {
            self.steps = steps;
        }
        if let Some(embedding) = patch.embedding {
            self.embedding = Some(embedding);
        }
    }

    fn agent_id(&self) -> Option<EntityId> {
        Some(self.agent_id)
    }

    bookkeeping!(tenant);
}

/// ResourceDoc - a document or file excerpt held in memory for an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceDoc {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub agent_id: EntityId,
    pub title: String,
    pub content: String,
    pub mime_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateResourceDoc {
    pub organization_id: Option<EntityId>,
    pub agent_id: EntityId,
    pub title: String,
    pub content: String,
    pub mime_type: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default)]
pub struct ResourceDocPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub mime_type: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

impl CreateInput for CreateResourceDoc {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for ResourceDoc {
    const KIND: EntityKind = EntityKind::ResourceDoc;
    type Create = CreateResourceDoc;
    type Patch = ResourceDocPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            agent_id: input.agent_id,
            title: input.title,
            content: input.content,
            mime_type: input.mime_type,
            embedding: input.embedding,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(mime_type) = patch.mime_type {
            self.mime_type = Some(mime_type);
        }
        if let Some(embedding) = patch.embedding {
            self.embedding = Some(embedding);
        }
    }

    fn agent_id(&self) -> Option<EntityId> {
        Some(self.agent_id)
    }

    bookkeeping!(tenant);
}

/// VaultEntry - a sensitive value the agent may reference by caption without
/// the value itself entering prompts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VaultEntry {
    pub id: EntityId,
    pub organization_id: EntityId,
    pub agent_id: EntityId,
    pub caption: String,
    pub secret_value: String,
    pub sensitivity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embedding: Option<Vec<f32>>,
    pub is_deleted: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub created_by_id: Option<EntityId>,
    pub last_updated_by_id: Option<EntityId>,
}

#[derive(Debug, Clone, Default)]
pub struct CreateVaultEntry {
    pub organization_id: Option<EntityId>,
    pub agent_id: EntityId,
    pub caption: String,
    pub secret_value: String,
    pub sensitivity: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Default)]
pub struct VaultEntryPatch {
    pub caption: Option<String>,
    pub secret_value: Option<String>,
    pub sensitivity: Option<String>,
    pub embedding: Option<Vec<f32>>,
}

impl CreateInput for CreateVaultEntry {
    fn organization_id(&self) -> Option<EntityId> {
        self.organization_id
    }
}

impl Entity for VaultEntry {
    const KIND: EntityKind = EntityKind::VaultEntry;
    type Create = CreateVaultEntry;
    type Patch = VaultEntryPatch;

    fn from_create(input: Self::Create, ctx: &CreateContext) -> Self {
        Self {
            id: ctx.id,
            organization_id: ctx.organization(),
            agent_id: input.agent_id,
            caption: input.caption,
            secret_value: input.secret_value,
            sensitivity: input.sensitivity,
            embedding: input.embedding,
            is_deleted: false,
            created_at: ctx.now,
            updated_at: ctx.now,
            created_by_id: ctx.actor_id,
            last_updated_by_id: ctx.actor_id,
        }
    }

    fn apply_patch(&mut self, patch: Self::Patch) {
        if let Some(caption) = patch.caption {
            self.caption = caption;
        }
        if let Some(secret_value) = patch.secret_value {
            self.secret_value = secret_value;
        }
        if let Some(sensitivity) = patch.sensitivity {
            self.sensitivity = Some(sensitivity);
        }
        if let Some(embedding) = patch.embedding {
            self.embedding = Some(embedding);
        }
    }

    fn agent_id(&self) -> Option<EntityId> {
        Some(self.agent_id)
    }

    bookkeeping!(tenant);
}

// ============================================================================
// TESTS
// ============================================================================
