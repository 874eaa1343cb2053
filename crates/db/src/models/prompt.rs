//! Prompt template rows.

use scribe_core::artifact::ArtifactType;
use scribe_core::prompt::{GenerationParameters, PromptTemplate, Provider};
use scribe_core::repository::StoreError;
use scribe_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `prompts` table.
///
/// `artifact_type` and `provider` are stored as text and parsed into their
/// domain enums by the `TryFrom` conversion below.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PromptRow {
    pub id: DbId,
    pub artifact_type: Option<String>,
    pub name: Option<String>,
    pub version: i32,
    pub template: String,
    pub provider: String,
    pub model: String,
    pub parameters: serde_json::Value,
    pub active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PromptRow> for PromptTemplate {
    type Error = StoreError;

    fn try_from(row: PromptRow) -> Result<Self, Self::Error> {
        let artifact_type = row
            .artifact_type
            .as_deref()
            .map(str::parse::<ArtifactType>)
            .transpose()
            .map_err(|e| StoreError::corrupt(format!("prompt {}: {e}", row.id)))?;
        let provider = row
            .provider
            .parse::<Provider>()
            .map_err(|e| StoreError::corrupt(format!("prompt {}: {e}", row.id)))?;
        if !row.parameters.is_object() && !row.parameters.is_null() {
            return Err(StoreError::corrupt(format!(
                "prompt {}: parameters must be a JSON object",
                row.id
            )));
        }

        Ok(PromptTemplate {
            id: row.id,
            artifact_type,
            name: row.name,
            version: row.version,
            template: row.template,
            provider,
            model: row.model,
            parameters: GenerationParameters::from_value(row.parameters),
            active: row.active,
            updated_at: row.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::Utc;
    use serde_json::json;

    use super::*;

    fn row() -> PromptRow {
        PromptRow {
            id: 3,
            artifact_type: Some("client_bio".to_string()),
            name: None,
            version: 2,
            template: "Bio for {{client_info}}".to_string(),
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            parameters: json!({"temperature": 0.4}),
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn converts_valid_row() {
        let template = PromptTemplate::try_from(row()).unwrap();
        assert_eq!(template.artifact_type, Some(ArtifactType::ClientBio));
        assert_eq!(template.provider, Provider::OpenAi);
        assert_eq!(template.version, 2);
        assert_eq!(template.parameters.temperature(), Some(0.4));
    }

    #[test]
    fn rejects_unknown_provider() {
        let mut r = row();
        r.provider = "cohere".to_string();
        assert_matches!(PromptTemplate::try_from(r), Err(_));
    }

    #[test]
    fn rejects_unknown_artifact_type() {
        let mut r = row();
        r.artifact_type = Some("client_horoscope".to_string());
        let err = PromptTemplate::try_from(r).unwrap_err();
        assert!(err.to_string().contains("prompt 3"));
    }
}
