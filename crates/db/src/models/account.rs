//! Account profile projection.

use scribe_core::repository::AccountProfile;
use scribe_core::types::DbId;
use serde::Serialize;
use sqlx::FromRow;

/// `accounts` joined with the title of the primary therapeutic approach.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AccountProfileRow {
    pub account_id: DbId,
    pub language: Option<String>,
    pub primary_therapeutic_approach: Option<String>,
}

impl From<AccountProfileRow> for AccountProfile {
    fn from(row: AccountProfileRow) -> Self {
        Self {
            account_id: row.account_id,
            language: row.language,
            primary_therapeutic_approach: row.primary_therapeutic_approach,
        }
    }
}
