//! [`PgStore`]: the Postgres implementation of the pipeline's storage traits.

use async_trait::async_trait;
use scribe_core::artifact::{Artifact, ArtifactKey, ArtifactType, ReferenceType};
use scribe_core::content::InvalidationOutcome;
use scribe_core::prompt::PromptTemplate;
use scribe_core::repository::{
    AccountProfile, AccountRepository, ArtifactRepository, ClientRecord, ClientRepository,
    PromptRepository, SessionPatch, SessionRecord, SessionRepository, SessionUpdate, StoreError,
    StoreHealth, StoreResult,
};
use scribe_core::types::DbId;

use crate::repositories::session_repo::UpdateSession;
use crate::repositories::{AccountRepo, ArtifactRepo, ClientRepo, PromptRepo, SessionRepo};
use crate::DbPool;

/// Shared handle over the connection pool. Cheap to clone.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

#[async_trait]
impl PromptRepository for PgStore {
    async fn find_active_by_artifact_type(
        &self,
        artifact_type: ArtifactType,
    ) -> StoreResult<Option<PromptTemplate>> {
        PromptRepo::find_active_by_artifact_type(&self.pool, artifact_type.as_str())
            .await
            .map_err(StoreError::backend)?
            .map(PromptTemplate::try_from)
            .transpose()
    }

    async fn find_active_by_name(&self, name: &str) -> StoreResult<Option<PromptTemplate>> {
        PromptRepo::find_active_by_name(&self.pool, name)
            .await
            .map_err(StoreError::backend)?
            .map(PromptTemplate::try_from)
            .transpose()
    }
}

#[async_trait]
impl ArtifactRepository for PgStore {
    async fn find(&self, key: &ArtifactKey) -> StoreResult<Option<Artifact>> {
        ArtifactRepo::find(
            &self.pool,
            key.reference_id,
            key.reference_type.as_str(),
            key.artifact_type.as_str(),
            &key.language,
        )
        .await
        .map_err(StoreError::backend)?
        .map(Artifact::try_from)
        .transpose()
    }

    async fn upsert(&self, key: &ArtifactKey, content: &str) -> StoreResult<Artifact> {
        let row = ArtifactRepo::upsert(
            &self.pool,
            key.reference_id,
            key.reference_type.as_str(),
            key.artifact_type.as_str(),
            &key.language,
            content,
        )
        .await
        .map_err(StoreError::backend)?;
        Artifact::try_from(row)
    }

    async fn delete_for_reference(
        &self,
        reference_id: DbId,
        reference_type: ReferenceType,
    ) -> StoreResult<u64> {
        ArtifactRepo::delete_for_reference(&self.pool, reference_id, reference_type.as_str())
            .await
            .map_err(StoreError::backend)
    }

    async fn delete_one(&self, key: &ArtifactKey) -> StoreResult<bool> {
        ArtifactRepo::delete_one(
            &self.pool,
            key.reference_id,
            key.reference_type.as_str(),
            key.artifact_type.as_str(),
            &key.language,
        )
        .await
        .map_err(StoreError::backend)
    }
}

#[async_trait]
impl SessionRepository for PgStore {
    async fn find(&self, account_id: DbId, session_id: DbId) -> StoreResult<Option<SessionRecord>> {
        let row = SessionRepo::find(&self.pool, account_id, session_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(SessionRecord::from))
    }

    async fn list_for_client(
        &self,
        account_id: DbId,
        client_id: DbId,
    ) -> StoreResult<Vec<SessionRecord>> {
        let rows = SessionRepo::list_for_client(&self.pool, account_id, client_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(rows.into_iter().map(SessionRecord::from).collect())
    }

    async fn update(
        &self,
        account_id: DbId,
        session_id: DbId,
        patch: &SessionPatch,
    ) -> StoreResult<Option<SessionUpdate>> {
        let update = UpdateSession {
            title: patch.title.as_ref().map(Option::as_deref),
            transcript: patch.transcript.as_ref().map(Option::as_deref),
            note: patch.note.as_ref().map(Option::as_deref),
        };
        let updated = SessionRepo::update(&self.pool, account_id, session_id, update)
            .await
            .map_err(StoreError::backend)?;
        Ok(updated.map(|u| SessionUpdate {
            session: SessionRecord::from(u.row),
            invalidation: InvalidationOutcome {
                change: u.change,
                session_artifacts_deleted: u.session_artifacts_deleted,
                client_artifacts_deleted: u.client_artifacts_deleted,
            },
        }))
    }
}

#[async_trait]
impl ClientRepository for PgStore {
    async fn find(&self, account_id: DbId, client_id: DbId) -> StoreResult<Option<ClientRecord>> {
        let row = ClientRepo::find(&self.pool, account_id, client_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(ClientRecord::from))
    }
}

#[async_trait]
impl AccountRepository for PgStore {
    async fn find_profile(&self, account_id: DbId) -> StoreResult<Option<AccountProfile>> {
        let row = AccountRepo::find_profile(&self.pool, account_id)
            .await
            .map_err(StoreError::backend)?;
        Ok(row.map(AccountProfile::from))
    }
}

#[async_trait]
impl StoreHealth for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        crate::health_check(&self.pool)
            .await
            .map_err(StoreError::backend)
    }
}
