/// Session token set persistence
///
/// Every login appends one row; a user's live token set is simply their
/// rows in this table. Because issuance is an INSERT and never a
/// read-modify-write of some embedded list, two concurrent logins both
/// land — there is no whole-record overwrite to race on.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE session_tokens (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     token TEXT NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// One live session: a token a user logged in with and has not revoked
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SessionToken {
    /// Row ID
    pub id: Uuid,

    /// User this session belongs to
    pub user_id: Uuid,

    /// The exact signed token string handed to the client
    pub token: String,

    /// When this login happened
    pub created_at: DateTime<Utc>,
}

impl SessionToken {
    /// Appends a freshly issued token to the user's token set
    pub async fn insert(pool: &PgPool, user_id: Uuid, token: &str) -> Result<Self, sqlx::Error> {
        let row = sqlx::query_as::<_, SessionToken>(
            r#"
            INSERT INTO session_tokens (user_id, token)
            VALUES ($1, $2)
            RETURNING id, user_id, token, created_at
            "#,
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(pool)
        .await?;

        Ok(row)
    }

    /// Checks whether the exact token value is in the user's live set
    pub async fn exists(pool: &PgPool, user_id: Uuid, token: &str) -> Result<bool, sqlx::Error> {
        let exists: bool = sqlx::query_scalar(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM session_tokens
                WHERE user_id = $1 AND token = $2
            )
            "#,
        )
        .bind(user_id)
        .bind(token)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Removes the matching token from the set (single logout)
    ///
    /// Idempotent: revoking a token that is already gone deletes zero
    /// rows and is not an error. Returns the number of rows removed.
    pub async fn revoke_one(pool: &PgPool, user_id: Uuid, token: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM session_tokens
            WHERE user_id = $1 AND token = $2
            "#,
        )
        .bind(user_id)
        .bind(token)
        .execute(pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Clears the user's entire token set (logout of all sessions)
    pub async fn revoke_all(pool: &PgPool, user_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM session_tokens WHERE user_id = $1")
            .bind(user_id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected())
    }

    /// Lists a user's live tokens in login order
    pub async fn list_for_user(pool: &PgPool, user_id: Uuid) -> Result<Vec<Self>, sqlx::Error> {
        let rows = sqlx::query_as::<_, SessionToken>(
            r#"
            SELECT id, user_id, token, created_at
            FROM session_tokens
            WHERE user_id = $1
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(pool)
        .await?;

        Ok(rows)
    }

    /// Counts a user's live tokens
    pub async fn count_for_user(pool: &PgPool, user_id: Uuid) -> Result<i64, sqlx::Error> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM session_tokens WHERE user_id = $1")
                .bind(user_id)
                .fetch_one(pool)
                .await?;

        Ok(count)
    }
}
