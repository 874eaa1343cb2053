//! Repository for the `artifacts` table.

use scribe_core::types::DbId;
use sqlx::{PgExecutor, PgPool};

use crate::models::artifact::ArtifactRow;

const COLUMNS: &str = "\
    id, reference_id, reference_type, type, content, language, created_at, updated_at";

/// Cached generated content, one row per
/// `(reference_id, reference_type, type, language)`.
pub struct ArtifactRepo;

impl ArtifactRepo {
    pub async fn find(
        pool: &PgPool,
        reference_id: DbId,
        reference_type: &str,
        artifact_type: &str,
        language: &str,
    ) -> Result<Option<ArtifactRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM artifacts \
             WHERE reference_id = $1 AND reference_type = $2 AND type = $3 AND language = $4"
        );
        sqlx::query_as::<_, ArtifactRow>(&query)
            .bind(reference_id)
            .bind(reference_type)
            .bind(artifact_type)
            .bind(language)
            .fetch_optional(pool)
            .await
    }

    /// Insert the artifact or replace its content in place.
    ///
    /// A single statement against `uq_artifacts_key`, so concurrent writers
    /// for the same key leave exactly one row (last writer wins).
    pub async fn upsert(
        pool: &PgPool,
        reference_id: DbId,
        reference_type: &str,
        artifact_type: &str,
        language: &str,
        content: &str,
    ) -> Result<ArtifactRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO artifacts (reference_id, reference_type, type, language, content) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (reference_id, reference_type, type, language) \
             DO UPDATE SET content = EXCLUDED.content, updated_at = NOW() \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ArtifactRow>(&query)
            .bind(reference_id)
            .bind(reference_type)
            .bind(artifact_type)
            .bind(language)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// Delete every artifact owned by a reference, in all languages.
    ///
    /// Takes any executor so a session update can run it inside its
    /// transaction.
    pub async fn delete_for_reference<'e>(
        executor: impl PgExecutor<'e>,
        reference_id: DbId,
        reference_type: &str,
    ) -> Result<u64, sqlx::Error> {
        let result =
            sqlx::query("DELETE FROM artifacts WHERE reference_id = $1 AND reference_type = $2")
                .bind(reference_id)
                .bind(reference_type)
                .execute(executor)
                .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_one(
        pool: &PgPool,
        reference_id: DbId,
        reference_type: &str,
        artifact_type: &str,
        language: &str,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM artifacts \
             WHERE reference_id = $1 AND reference_type = $2 AND type = $3 AND language = $4",
        )
        .bind(reference_id)
        .bind(reference_type)
        .bind(artifact_type)
        .bind(language)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
