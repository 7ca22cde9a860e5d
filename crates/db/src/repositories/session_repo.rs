//! Repository for the `sessions` table (refresh tokens).

use chrono::Utc;
use srd_core::types::DbId;

use super::NOW_SQL;
use crate::models::session::{CreateSession, Session};
use crate::DbPool;

const COLUMNS: &str = "id, user_id, refresh_token_hash, expires_at, revoked_at, created_at";

pub struct SessionRepo;

impl SessionRepo {
    pub async fn create(pool: &DbPool, input: &CreateSession) -> Result<Session, sqlx::Error> {
        let query = format!(
            "INSERT INTO sessions (user_id, refresh_token_hash, expires_at)
             VALUES (?1, ?2, ?3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Session>(&query)
            .bind(input.user_id)
            .bind(&input.refresh_token_hash)
            .bind(input.expires_at)
            .fetch_one(pool)
            .await
    }

    /// Find a session by token hash, ignoring revoked or expired rows.
    pub async fn find_by_refresh_token_hash(
        pool: &DbPool,
        hash: &str,
    ) -> Result<Option<Session>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sessions WHERE refresh_token_hash = ?1");
        let session = sqlx::query_as::<_, Session>(&query)
            .bind(hash)
            .fetch_optional(pool)
            .await?;

        let now = Utc::now();
        Ok(session.filter(|s| s.is_active_at(now)))
    }

    pub async fn revoke(pool: &DbPool, id: DbId) -> Result<(), sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET revoked_at = {NOW_SQL} WHERE id = ?1 AND revoked_at IS NULL"
        );
        sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(())
    }

    /// Revoke every open session for a user. Returns how many were revoked.
    pub async fn revoke_all_for_user(pool: &DbPool, user_id: DbId) -> Result<u64, sqlx::Error> {
        let query = format!(
            "UPDATE sessions SET revoked_at = {NOW_SQL} WHERE user_id = ?1 AND revoked_at IS NULL"
        );
        let result = sqlx::query(&query).bind(user_id).execute(pool).await?;
        Ok(result.rows_affected())
    }
}
