//! Session rows, joined with their transcript.

use scribe_core::content::SessionContent;
use scribe_core::repository::SessionRecord;
use scribe_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A `sessions` row with `transcripts.content` joined in as `transcript`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SessionRow {
    pub id: DbId,
    pub account_id: DbId,
    pub client_id: DbId,
    pub title: Option<String>,
    pub transcript: Option<String>,
    pub note: Option<String>,
    pub session_date: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl SessionRow {
    pub fn content(&self) -> SessionContent {
        SessionContent {
            transcript: self.transcript.clone(),
            note: self.note.clone(),
        }
    }
}

impl From<SessionRow> for SessionRecord {
    fn from(row: SessionRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            client_id: row.client_id,
            title: row.title,
            transcript: row.transcript,
            note: row.note,
            session_date: row.session_date,
        }
    }
}
