//! In-memory implementations of the storage traits.
//!
//! Used by this crate's tests and, through the `test-utils` feature, by the
//! HTTP tests. Semantics mirror the Postgres schema: one active prompt per
//! source, one artifact per key, tenant-scoped sessions and clients.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;
use scribe_core::artifact::{Artifact, ArtifactKey, ArtifactType, ReferenceType};
use scribe_core::content::{detect_content_change, InvalidationOutcome};
use scribe_core::prompt::{GenerationParameters, PromptSource, PromptTemplate, Provider};
use scribe_core::repository::{
    AccountProfile, AccountRepository, ArtifactRepository, ClientRecord, ClientRepository,
    PromptRepository, SessionPatch, SessionRecord, SessionRepository, SessionUpdate, StoreError,
    StoreHealth, StoreResult,
};
use scribe_core::types::DbId;

/// An active OpenAI template for `source`, for seeding.
pub fn prompt(source: PromptSource, template: &str) -> PromptTemplate {
    let (artifact_type, name) = match source {
        PromptSource::ArtifactType(t) => (Some(t), None),
        PromptSource::Name(n) => (None, Some(n)),
    };
    PromptTemplate {
        id: 0,
        artifact_type,
        name,
        version: 1,
        template: template.to_string(),
        provider: Provider::OpenAi,
        model: "gpt-4o-mini".to_string(),
        parameters: GenerationParameters::default(),
        active: true,
        updated_at: Utc::now(),
    }
}

#[derive(Debug, Default)]
struct Tables {
    prompts: Vec<PromptTemplate>,
    artifacts: HashMap<ArtifactKey, Artifact>,
    sessions: BTreeMap<DbId, SessionRecord>,
    clients: BTreeMap<DbId, ClientRecord>,
    accounts: BTreeMap<DbId, AccountProfile>,
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
    fail_artifact_writes: AtomicBool,
    fail_artifact_deletes: AtomicBool,
    unhealthy: AtomicBool,
}

impl Tables {
    fn remove_artifacts(&mut self, reference_id: DbId, reference_type: ReferenceType) -> u64 {
        let before = self.artifacts.len();
        self.artifacts.retain(|k, _| {
            !(k.reference_id == reference_id && k.reference_type == reference_type)
        });
        (before - self.artifacts.len()) as u64
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // -- seeding --

    /// Add a template. An active template replaces the active one for the
    /// same source, like a new version in the `prompts` table.
    pub fn insert_prompt(&self, mut template: PromptTemplate) {
        let mut tables = self.tables();
        template.id = tables.prompts.len() as DbId + 1;
        if template.active {
            let source = template.source();
            for existing in tables.prompts.iter_mut() {
                if existing.active && existing.source() == source {
                    existing.active = false;
                }
            }
        }
        tables.prompts.push(template);
    }

    pub fn seed_account(&self, account_id: DbId, language: Option<&str>, approach: Option<&str>) {
        self.tables().accounts.insert(
            account_id,
            AccountProfile {
                account_id,
                language: language.map(str::to_string),
                primary_therapeutic_approach: approach.map(str::to_string),
            },
        );
    }

    pub fn seed_client(
        &self,
        account_id: DbId,
        client_id: DbId,
        name: &str,
        description: Option<&str>,
    ) {
        self.tables().clients.insert(
            client_id,
            ClientRecord {
                id: client_id,
                account_id,
                name: name.to_string(),
                description: description.map(str::to_string),
            },
        );
    }

    pub fn seed_session(
        &self,
        account_id: DbId,
        client_id: DbId,
        session_id: DbId,
        transcript: Option<&str>,
        note: Option<&str>,
    ) {
        self.tables().sessions.insert(
            session_id,
            SessionRecord {
                id: session_id,
                account_id,
                client_id,
                title: Some(format!("Session {session_id}")),
                transcript: transcript.map(str::to_string),
                note: note.map(str::to_string),
                session_date: None,
            },
        );
    }

    pub fn seed_artifact(&self, key: &ArtifactKey, content: &str) {
        let now = Utc::now();
        self.tables().artifacts.insert(
            key.clone(),
            Artifact {
                key: key.clone(),
                content: content.to_string(),
                created_at: now,
                updated_at: now,
            },
        );
    }

    // -- failure injection --

    /// Make every artifact upsert fail with a store error.
    pub fn fail_artifact_writes(&self, fail: bool) {
        self.fail_artifact_writes.store(fail, Ordering::SeqCst);
    }

    /// Make every artifact delete fail with a store error, including the
    /// deletes a session update performs.
    pub fn fail_artifact_deletes(&self, fail: bool) {
        self.fail_artifact_deletes.store(fail, Ordering::SeqCst);
    }

    fn check_deletes(&self) -> StoreResult<()> {
        if self.fail_artifact_deletes.load(Ordering::SeqCst) {
            return Err(StoreError::corrupt("artifact deletes disabled"));
        }
        Ok(())
    }

    pub fn set_healthy(&self, healthy: bool) {
        self.unhealthy.store(!healthy, Ordering::SeqCst);
    }

    // -- inspection --

    pub fn artifact(&self, key: &ArtifactKey) -> Option<Artifact> {
        self.tables().artifacts.get(key).cloned()
    }

    pub fn artifact_count(&self) -> usize {
        self.tables().artifacts.len()
    }

    pub fn session(&self, session_id: DbId) -> Option<SessionRecord> {
        self.tables().sessions.get(&session_id).cloned()
    }
}

#[async_trait]
impl PromptRepository for MemoryStore {
    async fn find_active_by_artifact_type(
        &self,
        artifact_type: ArtifactType,
    ) -> StoreResult<Option<PromptTemplate>> {
        Ok(self
            .tables()
            .prompts
            .iter()
            .find(|p| p.active && p.artifact_type == Some(artifact_type))
            .cloned())
    }

    async fn find_active_by_name(&self, name: &str) -> StoreResult<Option<PromptTemplate>> {
        Ok(self
            .tables()
            .prompts
            .iter()
            .find(|p| p.active && p.name.as_deref() == Some(name))
            .cloned())
    }
}

#[async_trait]
impl ArtifactRepository for MemoryStore {
    async fn find(&self, key: &ArtifactKey) -> StoreResult<Option<Artifact>> {
        Ok(self.artifact(key))
    }

    async fn upsert(&self, key: &ArtifactKey, content: &str) -> StoreResult<Artifact> {
        if self.fail_artifact_writes.load(Ordering::SeqCst) {
            return Err(StoreError::corrupt("artifact writes disabled"));
        }
        let now = Utc::now();
        let mut tables = self.tables();
        let artifact = tables
            .artifacts
            .entry(key.clone())
            .and_modify(|a| {
                a.content = content.to_string();
                a.updated_at = now;
            })
            .or_insert_with(|| Artifact {
                key: key.clone(),
                content: content.to_string(),
                created_at: now,
                updated_at: now,
            });
        Ok(artifact.clone())
    }

    async fn delete_for_reference(
        &self,
        reference_id: DbId,
        reference_type: ReferenceType,
    ) -> StoreResult<u64> {
        self.check_deletes()?;
        Ok(self.tables().remove_artifacts(reference_id, reference_type))
    }

    async fn delete_one(&self, key: &ArtifactKey) -> StoreResult<bool> {
        self.check_deletes()?;
        Ok(self.tables().artifacts.remove(key).is_some())
    }
}

#[async_trait]
impl SessionRepository for MemoryStore {
    async fn find(&self, account_id: DbId, session_id: DbId) -> StoreResult<Option<SessionRecord>> {
        Ok(self
            .session(session_id)
            .filter(|s| s.account_id == account_id))
    }

    async fn list_for_client(
        &self,
        account_id: DbId,
        client_id: DbId,
    ) -> StoreResult<Vec<SessionRecord>> {
        Ok(self
            .tables()
            .sessions
            .values()
            .filter(|s| s.account_id == account_id && s.client_id == client_id)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        account_id: DbId,
        session_id: DbId,
        patch: &SessionPatch,
    ) -> StoreResult<Option<SessionUpdate>> {
        // One guard spans the read, the write and the deletes.
        let mut tables = self.tables();
        let Some(before) = tables
            .sessions
            .get(&session_id)
            .filter(|s| s.account_id == account_id)
            .cloned()
        else {
            return Ok(None);
        };

        let mut session = before.clone();
        if let Some(title) = &patch.title {
            session.title = title.clone();
        }
        if let Some(transcript) = &patch.transcript {
            session.transcript = transcript.clone();
        }
        if let Some(note) = &patch.note {
            session.note = note.clone();
        }

        let change = detect_content_change(&before.content(), &session.content());
        let invalidation = if change.is_changed() {
            self.check_deletes()?;
            InvalidationOutcome {
                change,
                session_artifacts_deleted: tables
                    .remove_artifacts(session.id, ReferenceType::Session),
                client_artifacts_deleted: tables
                    .remove_artifacts(session.client_id, ReferenceType::Client),
            }
        } else {
            InvalidationOutcome::unchanged()
        };

        tables.sessions.insert(session_id, session.clone());
        Ok(Some(SessionUpdate {
            session,
            invalidation,
        }))
    }
}

#[async_trait]
impl ClientRepository for MemoryStore {
    async fn find(&self, account_id: DbId, client_id: DbId) -> StoreResult<Option<ClientRecord>> {
        Ok(self
            .tables()
            .clients
            .get(&client_id)
            .filter(|c| c.account_id == account_id)
            .cloned())
    }
}

#[async_trait]
impl AccountRepository for MemoryStore {
    async fn find_profile(&self, account_id: DbId) -> StoreResult<Option<AccountProfile>> {
        Ok(self.tables().accounts.get(&account_id).cloned())
    }
}

#[async_trait]
impl StoreHealth for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        if self.unhealthy.load(Ordering::SeqCst) {
            return Err(StoreError::corrupt("store unreachable"));
        }
        Ok(())
    }
}
