//! Client rows.

use scribe_core::repository::ClientRecord;
use scribe_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `clients` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ClientRow {
    pub id: DbId,
    pub account_id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<ClientRow> for ClientRecord {
    fn from(row: ClientRow) -> Self {
        Self {
            id: row.id,
            account_id: row.account_id,
            name: row.name,
            description: row.description,
        }
    }
}
