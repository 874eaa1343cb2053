//! Generated artifact rows.

use scribe_core::artifact::{Artifact, ArtifactKey, ArtifactType, ReferenceType};
use scribe_core::repository::StoreError;
use scribe_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `artifacts` table. The column `type` is the artifact kind.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ArtifactRow {
    pub id: DbId,
    pub reference_id: DbId,
    pub reference_type: String,
    #[sqlx(rename = "type")]
    pub artifact_type: String,
    pub content: String,
    pub language: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<ArtifactRow> for Artifact {
    type Error = StoreError;

    fn try_from(row: ArtifactRow) -> Result<Self, Self::Error> {
        let corrupt = |e: scribe_core::error::CoreError| {
            StoreError::corrupt(format!("artifact {}: {e}", row.id))
        };
        let reference_type = row.reference_type.parse::<ReferenceType>().map_err(corrupt)?;
        let artifact_type = row.artifact_type.parse::<ArtifactType>().map_err(corrupt)?;

        Ok(Artifact {
            key: ArtifactKey {
                reference_id: row.reference_id,
                reference_type,
                artifact_type,
                language: row.language,
            },
            content: row.content,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}
