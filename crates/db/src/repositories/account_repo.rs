//! Repository for account profile settings.

use scribe_core::types::DbId;
use sqlx::PgPool;

use crate::models::account::AccountProfileRow;

pub struct AccountRepo;

impl AccountRepo {
    /// Language and primary therapeutic approach title for an account.
    pub async fn find_profile(
        pool: &PgPool,
        account_id: DbId,
    ) -> Result<Option<AccountProfileRow>, sqlx::Error> {
        sqlx::query_as::<_, AccountProfileRow>(
            "SELECT a.id AS account_id, a.language, ta.title AS primary_therapeutic_approach \
             FROM accounts a \
             LEFT JOIN therapeutic_approaches ta ON ta.id = a.primary_therapeutic_approach_id \
             WHERE a.id = $1",
        )
        .bind(account_id)
        .fetch_optional(pool)
        .await
    }
}
