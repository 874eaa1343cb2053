//! Template variables assembled from the artifact's reference.
//!
//! Session artifacts see `session_title`, `session_date`,
//! `session_transcript`, `session_note` and `client_info`. Client artifacts
//! see `client_info` and `client_sessions`, a digest of every session oldest
//! first. Empty or whitespace-only text is left out, so the renderer reports
//! it as missing.

use std::collections::BTreeMap;

use scribe_core::artifact::{ArtifactKey, ReferenceType};
use scribe_core::content::normalize_content;
use scribe_core::repository::{ClientRecord, ClientRepository, SessionRecord, SessionRepository};
use scribe_core::types::DbId;

use crate::error::PipelineError;

pub const SESSION_TITLE: &str = "session_title";
pub const SESSION_DATE: &str = "session_date";
pub const SESSION_TRANSCRIPT: &str = "session_transcript";
pub const SESSION_NOTE: &str = "session_note";
pub const CLIENT_INFO: &str = "client_info";
pub const CLIENT_SESSIONS: &str = "client_sessions";

/// Load the reference named by `key` (scoped to `account_id`) and build the
/// variables its prompt is rendered with.
pub async fn assemble(
    sessions: &dyn SessionRepository,
    clients: &dyn ClientRepository,
    account_id: DbId,
    key: &ArtifactKey,
) -> Result<BTreeMap<String, String>, PipelineError> {
    match key.reference_type {
        ReferenceType::Session => {
            let session = sessions
                .find(account_id, key.reference_id)
                .await?
                .ok_or(PipelineError::ReferenceNotFound {
                    entity: "Session",
                    id: key.reference_id,
                })?;
            let client = load_client(clients, account_id, session.client_id).await?;
            Ok(session_variables(&session, &client))
        }
        ReferenceType::Client => {
            let client = load_client(clients, account_id, key.reference_id).await?;
            let history = sessions.list_for_client(account_id, client.id).await?;
            Ok(client_variables(&client, &history))
        }
    }
}

async fn load_client(
    clients: &dyn ClientRepository,
    account_id: DbId,
    client_id: DbId,
) -> Result<ClientRecord, PipelineError> {
    clients
        .find(account_id, client_id)
        .await?
        .ok_or(PipelineError::ReferenceNotFound {
            entity: "Client",
            id: client_id,
        })
}

pub fn session_variables(
    session: &SessionRecord,
    client: &ClientRecord,
) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    insert_text(&mut vars, SESSION_TITLE, session.title.as_deref());
    if let Some(date) = session.session_date {
        vars.insert(SESSION_DATE.to_string(), date.format("%Y-%m-%d").to_string());
    }
    insert_text(&mut vars, SESSION_TRANSCRIPT, session.transcript.as_deref());
    insert_text(&mut vars, SESSION_NOTE, session.note.as_deref());
    vars.insert(CLIENT_INFO.to_string(), format_client_info(client));
    vars
}

pub fn client_variables(
    client: &ClientRecord,
    sessions: &[SessionRecord],
) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    vars.insert(CLIENT_INFO.to_string(), format_client_info(client));
    if let Some(digest) = format_client_sessions(sessions) {
        vars.insert(CLIENT_SESSIONS.to_string(), digest);
    }
    vars
}

fn insert_text(vars: &mut BTreeMap<String, String>, name: &str, value: Option<&str>) {
    if let Some(v) = normalize_content(value) {
        vars.insert(name.to_string(), v.to_string());
    }
}

pub fn format_client_info(client: &ClientRecord) -> String {
    match normalize_content(client.description.as_deref()) {
        Some(description) => format!("Name: {}\nDescription: {description}", client.name),
        None => format!("Name: {}", client.name),
    }
}

/// One block per session that has any transcript or note. `None` when no
/// session has content.
pub fn format_client_sessions(sessions: &[SessionRecord]) -> Option<String> {
    let blocks: Vec<String> = sessions
        .iter()
        .filter_map(|s| {
            let transcript = normalize_content(s.transcript.as_deref());
            let note = normalize_content(s.note.as_deref());
            if transcript.is_none() && note.is_none() {
                return None;
            }

            let date = s
                .session_date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "undated".to_string());
            let mut block = match normalize_content(s.title.as_deref()) {
                Some(title) => format!("Session {} ({date}): {title}", s.id),
                None => format!("Session {} ({date})", s.id),
            };
            if let Some(t) = transcript {
                block.push_str("\nTranscript:\n");
                block.push_str(t);
            }
            if let Some(n) = note {
                block.push_str("\nNote:\n");
                block.push_str(n);
            }
            Some(block)
        })
        .collect();

    (!blocks.is_empty()).then(|| blocks.join("\n\n"))
}
