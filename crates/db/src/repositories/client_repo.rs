//! Repository for the `clients` table.

use scribe_core::types::DbId;
use sqlx::PgPool;

use crate::models::client::ClientRow;

const COLUMNS: &str = "id, account_id, name, description, created_at, updated_at";

pub struct ClientRepo;

impl ClientRepo {
    /// Find a client owned by `account_id`.
    pub async fn find(
        pool: &PgPool,
        account_id: DbId,
        client_id: DbId,
    ) -> Result<Option<ClientRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM clients WHERE id = $1 AND account_id = $2");
        sqlx::query_as::<_, ClientRow>(&query)
            .bind(client_id)
            .bind(account_id)
            .fetch_optional(pool)
            .await
    }
}
