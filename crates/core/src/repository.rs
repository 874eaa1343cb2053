//! Storage interfaces the generation pipeline depends on.
//!
//! One narrow trait per entity, exposing only the typed operations the
//! pipeline needs. The Postgres repositories implement these in
//! the `scribe-db` crate; in-memory versions back the tests.

use std::error::Error as StdError;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::artifact::{Artifact, ArtifactKey, ArtifactType, ReferenceType};
use crate::content::{InvalidationOutcome, SessionContent};
use crate::prompt::PromptTemplate;
use crate::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A storage backend failed (connection, timeout, constraint, decode).
#[derive(Debug, thiserror::Error)]
#[error("Store error: {0}")]
pub struct StoreError(#[source] pub Box<dyn StdError + Send + Sync>);

impl StoreError {
    pub fn backend(err: impl StdError + Send + Sync + 'static) -> Self {
        Self(Box::new(err))
    }

    /// A row that could not be mapped onto a domain type.
    pub fn corrupt(msg: impl Into<String>) -> Self {
        let msg: String = msg.into();
        Self(msg.into())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A therapy session as seen by the pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionRecord {
    pub id: DbId,
    pub account_id: DbId,
    pub client_id: DbId,
    pub title: Option<String>,
    pub transcript: Option<String>,
    pub note: Option<String>,
    pub session_date: Option<Timestamp>,
}

impl SessionRecord {
    pub fn content(&self) -> SessionContent {
        SessionContent {
            transcript: self.transcript.clone(),
            note: self.note.clone(),
        }
    }
}

/// Partial update of a session. `None` leaves a field untouched;
/// `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPatch {
    pub title: Option<Option<String>>,
    pub transcript: Option<Option<String>>,
    pub note: Option<Option<String>>,
}

impl SessionPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.transcript.is_none() && self.note.is_none()
    }
}

/// A session after an update, with what the update invalidated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUpdate {
    pub session: SessionRecord,
    pub invalidation: InvalidationOutcome,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRecord {
    pub id: DbId,
    pub account_id: DbId,
    pub name: String,
    pub description: Option<String>,
}

/// Account-level settings that shape every prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountProfile {
    pub account_id: DbId,
    pub language: Option<String>,
    pub primary_therapeutic_approach: Option<String>,
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Read-only access to active prompt templates.
#[async_trait]
pub trait PromptRepository: Send + Sync {
    async fn find_active_by_artifact_type(
        &self,
        artifact_type: ArtifactType,
    ) -> StoreResult<Option<PromptTemplate>>;

    async fn find_active_by_name(&self, name: &str) -> StoreResult<Option<PromptTemplate>>;
}

/// Cached artifacts keyed by [`ArtifactKey`].
#[async_trait]
pub trait ArtifactRepository: Send + Sync {
    async fn find(&self, key: &ArtifactKey) -> StoreResult<Option<Artifact>>;

    /// Insert or update in place, as one atomic statement.
    async fn upsert(&self, key: &ArtifactKey, content: &str) -> StoreResult<Artifact>;

    /// Delete every artifact of a reference. Returns the number removed.
    async fn delete_for_reference(
        &self,
        reference_id: DbId,
        reference_type: ReferenceType,
    ) -> StoreResult<u64>;

    /// Delete a single artifact. Returns whether a row existed.
    async fn delete_one(&self, key: &ArtifactKey) -> StoreResult<bool>;
}

/// Tenant-scoped session access.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn find(&self, account_id: DbId, session_id: DbId) -> StoreResult<Option<SessionRecord>>;

    /// Sessions of a client, oldest first.
    async fn list_for_client(
        &self,
        account_id: DbId,
        client_id: DbId,
    ) -> StoreResult<Vec<SessionRecord>>;

    /// Apply a patch and return the updated session, or `None` if the
    /// session does not exist for this account.
    ///
    /// The previous content is read in the same unit of work as the write.
    /// If the transcript or note changed, every artifact of the session and
    /// of its client is deleted in that unit of work too; when the delete
    /// fails the session is left as it was.
    async fn update(
        &self,
        account_id: DbId,
        session_id: DbId,
        patch: &SessionPatch,
    ) -> StoreResult<Option<SessionUpdate>>;
}

/// Tenant-scoped client access.
#[async_trait]
pub trait ClientRepository: Send + Sync {
    async fn find(&self, account_id: DbId, client_id: DbId) -> StoreResult<Option<ClientRecord>>;
}

#[async_trait]
pub trait AccountRepository: Send + Sync {
    async fn find_profile(&self, account_id: DbId) -> StoreResult<Option<AccountProfile>>;
}

/// Reachability check for the health endpoint.
#[async_trait]
pub trait StoreHealth: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;
}
