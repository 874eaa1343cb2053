//! Repository for the `sessions` table and its one-to-one `transcripts` row.

use scribe_core::artifact::ReferenceType;
use scribe_core::content::{detect_content_change, ContentChange};
use scribe_core::types::DbId;
use sqlx::PgPool;

use crate::models::session::SessionRow;
use crate::repositories::ArtifactRepo;

const SELECT_SESSION: &str = "\
    SELECT s.id, s.account_id, s.client_id, s.title, t.content AS transcript, \
           s.note, s.session_date, s.created_at, s.updated_at \
    FROM sessions s \
    LEFT JOIN transcripts t ON t.session_id = s.id";

/// Field updates for a session. `None` leaves the column untouched,
/// `Some(None)` clears it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateSession<'a> {
    pub title: Option<Option<&'a str>>,
    pub transcript: Option<Option<&'a str>>,
    pub note: Option<Option<&'a str>>,
}

/// A committed session update.
#[derive(Debug, Clone)]
pub struct UpdatedSession {
    pub row: SessionRow,
    pub change: ContentChange,
    pub session_artifacts_deleted: u64,
    pub client_artifacts_deleted: u64,
}

pub struct SessionRepo;

impl SessionRepo {
    /// Find a session owned by `account_id`.
    pub async fn find(
        pool: &PgPool,
        account_id: DbId,
        session_id: DbId,
    ) -> Result<Option<SessionRow>, sqlx::Error> {
        let query = format!("{SELECT_SESSION} WHERE s.id = $1 AND s.account_id = $2");
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(session_id)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }

    /// All sessions of a client, oldest first.
    pub async fn list_for_client(
        pool: &PgPool,
        account_id: DbId,
        client_id: DbId,
    ) -> Result<Vec<SessionRow>, sqlx::Error> {
        let query = format!(
            "{SELECT_SESSION} WHERE s.client_id = $1 AND s.account_id = $2 \
             ORDER BY s.session_date ASC NULLS LAST, s.id ASC"
        );
        sqlx::query_as::<_, SessionRow>(&query)
            .bind(client_id)
            .bind(account_id)
            .fetch_all(pool)
            .await
    }

    /// Apply `update` to a session and return the refreshed row.
    ///
    /// One transaction: the session row is locked with `FOR UPDATE`, then
    /// its current content is read, the columns and the transcript upsert
    /// are written, and if the transcript or note changed the artifacts of
    /// the session and its client are deleted. Any error rolls all of it
    /// back. Returns `None` if the session does not belong to `account_id`.
    pub async fn update(
        pool: &PgPool,
        account_id: DbId,
        session_id: DbId,
        update: UpdateSession<'_>,
    ) -> Result<Option<UpdatedSession>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let locked =
            sqlx::query("SELECT id FROM sessions WHERE id = $1 AND account_id = $2 FOR UPDATE")
                .bind(session_id)
                .bind(account_id)
                .fetch_optional(&mut *tx)
                .await?;
        if locked.is_none() {
            tx.rollback().await?;
            return Ok(None);
        }

        // A fresh statement after the lock, so the joined transcript reflects
        // any writer that committed while this one waited.
        let query = format!("{SELECT_SESSION} WHERE s.id = $1");
        let before = sqlx::query_as::<_, SessionRow>(&query)
            .bind(session_id)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query(
            "UPDATE sessions SET \
                 title = CASE WHEN $2 THEN $3 ELSE title END, \
                 note = CASE WHEN $4 THEN $5 ELSE note END, \
                 updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(session_id)
        .bind(update.title.is_some())
        .bind(update.title.flatten())
        .bind(update.note.is_some())
        .bind(update.note.flatten())
        .execute(&mut *tx)
        .await?;

        if let Some(transcript) = update.transcript {
            sqlx::query(
                "INSERT INTO transcripts (session_id, content) VALUES ($1, $2) \
                 ON CONFLICT ON CONSTRAINT uq_transcripts_session \
                 DO UPDATE SET content = EXCLUDED.content, updated_at = NOW()",
            )
            .bind(session_id)
            .bind(transcript)
            .execute(&mut *tx)
            .await?;
        }

        let row = sqlx::query_as::<_, SessionRow>(&query)
            .bind(session_id)
            .fetch_one(&mut *tx)
            .await?;

        let change = detect_content_change(&before.content(), &row.content());
        let (session_artifacts_deleted, client_artifacts_deleted) = if change.is_changed() {
            let session = ArtifactRepo::delete_for_reference(
                &mut *tx,
                row.id,
                ReferenceType::Session.as_str(),
            )
            .await?;
            let client = ArtifactRepo::delete_for_reference(
                &mut *tx,
                row.client_id,
                ReferenceType::Client.as_str(),
            )
            .await?;
            (session, client)
        } else {
            (0, 0)
        };

        tx.commit().await?;
        Ok(Some(UpdatedSession {
            row,
            change,
            session_artifacts_deleted,
            client_artifacts_deleted,
        }))
    }
}
