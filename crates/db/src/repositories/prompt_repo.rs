//! Repository for the `prompts` table. Read-only.

use sqlx::PgPool;

use crate::models::prompt::PromptRow;

const COLUMNS: &str = "\
    id, artifact_type, name, version, template, provider, model, \
    parameters, active, created_at, updated_at";

/// Looks up active prompt templates.
pub struct PromptRepo;

impl PromptRepo {
    /// The active template for an artifact type, if any.
    pub async fn find_active_by_artifact_type(
        pool: &PgPool,
        artifact_type: &str,
    ) -> Result<Option<PromptRow>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM prompts WHERE artifact_type = $1 AND active = true"
        );
        sqlx::query_as::<_, PromptRow>(&query)
            .bind(artifact_type)
            .fetch_optional(pool)
            .await
    }

    /// The active template registered under `name`, if any.
    pub async fn find_active_by_name(
        pool: &PgPool,
        name: &str,
    ) -> Result<Option<PromptRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM prompts WHERE name = $1 AND active = true");
        sqlx::query_as::<_, PromptRow>(&query)
            .bind(name)
            .fetch_optional(pool)
            .await
    }
}
