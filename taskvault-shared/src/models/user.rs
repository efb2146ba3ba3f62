/// User model and store operations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     email VARCHAR(255) NOT NULL UNIQUE,
///     name VARCHAR(255) NOT NULL,
///     age INTEGER NOT NULL DEFAULT 18 CHECK (age >= 0),
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// Emails are normalized to lowercase at the store boundary, on both
/// insert and lookup. The password is stored as an Argon2id hash and the
/// full record never leaves the process: external responses use
/// [`UserView`], which carries no credential material.
///
/// # Example
///
/// ```no_run
/// use taskvault_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(&pool, CreateUser {
///     email: "Ada@Example.com".to_string(),
///     name: "Ada".to_string(),
///     age: 36,
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// // Stored lowercase, found case-insensitively
/// let found = User::find_by_email(&pool, "ada@EXAMPLE.com").await?;
/// assert!(found.is_some());
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// Default age applied when registration omits the field
pub const DEFAULT_AGE: i32 = 18;

/// User record as stored
///
/// Not serializable: handlers convert to [`UserView`] before anything
/// crosses the process boundary.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (UUID v4)
    pub id: Uuid,

    /// Email address, stored lowercase, unique
    pub email: String,

    /// Display name
    pub name: String,

    /// Age in years, non-negative
    pub age: i32,

    /// Argon2id password hash (never the raw password)
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// External representation of a user
///
/// This is the only user shape that serializes: no password hash, no
/// token set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    /// Unique user ID
    pub id: Uuid,

    /// Display name
    pub name: String,

    /// Email address
    pub email: String,

    /// Age in years
    pub age: i32,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

impl From<User> for UserView {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            age: user.age,
            created_at: user.created_at,
            updated_at: user.updated_at,
        }
    }
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Email address (normalized to lowercase on insert)
    pub email: String,

    /// Display name
    pub name: String,

    /// Age in years
    pub age: i32,

    /// Argon2id password hash (hashing happens before this struct exists)
    pub password_hash: String,
}

/// Input for a profile update
///
/// Only non-None fields are written. The allow-list check on the raw
/// request happens in the handler, before this struct is built.
#[derive(Debug, Clone, Default)]
pub struct UpdateUser {
    /// New display name
    pub name: Option<String>,

    /// New email address (normalized to lowercase on write)
    pub email: Option<String>,

    /// New age
    pub age: Option<i32>,

    /// New password hash (the handler re-hashes before setting this)
    pub password_hash: Option<String>,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// Fails on a duplicate email (unique constraint) or a store failure.
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (email, name, age, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, email, name, age, password_hash, created_at, updated_at
            "#,
        )
        .bind(data.email.to_lowercase())
        .bind(data.name)
        .bind(data.age)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, age, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (case-insensitive)
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, name, age, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email.to_lowercase())
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    /// Applies a profile update
    ///
    /// Builds a dynamic UPDATE containing only the fields present in
    /// `data`; `updated_at` always moves. Returns `None` if the user no
    /// longer exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        if data.name.is_some() {
            bind_count += 1;
            query.push_str(&format!(", name = ${}", bind_count));
        }
        if data.email.is_some() {
            bind_count += 1;
            query.push_str(&format!(", email = ${}", bind_count));
        }
        if data.age.is_some() {
            bind_count += 1;
            query.push_str(&format!(", age = ${}", bind_count));
        }
        if data.password_hash.is_some() {
            bind_count += 1;
            query.push_str(&format!(", password_hash = ${}", bind_count));
        }

        query.push_str(
            " WHERE id = $1 RETURNING id, email, name, age, password_hash, created_at, updated_at",
        );

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(name) = data.name {
            q = q.bind(name);
        }
        if let Some(email) = data.email {
            q = q.bind(email.to_lowercase());
        }
        if let Some(age) = data.age {
            q = q.bind(age);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }

        let user = q.fetch_optional(pool).await?;

        Ok(user)
    }

    /// Deletes a user together with everything it owns
    ///
    /// One transaction: owned tasks first, then the session token set,
    /// then the user row. Any failure rolls the whole thing back, so a
    /// half-deleted account cannot exist.
    ///
    /// Returns true if the user row was deleted, false if it was already
    /// gone.
    pub async fn delete_cascade(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("DELETE FROM tasks WHERE owner = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM session_tokens WHERE user_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "sample@example.com".to_string(),
            name: "Sample".to_string(),
            age: DEFAULT_AGE,
            password_hash: "$argon2id$v=19$m=65536,t=3,p=4$salt$hash".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_user_view_carries_no_credentials() {
        let user = sample_user();
        let view = UserView::from(user.clone());

        let json = serde_json::to_value(&view).expect("Should serialize");
        let object = json.as_object().expect("Should be an object");

        assert!(object.get("password_hash").is_none());
        assert!(object.get("password").is_none());
        assert!(object.get("tokens").is_none());
        assert_eq!(object["email"], "sample@example.com");
        assert_eq!(object["age"], i64::from(DEFAULT_AGE));
        assert_eq!(view.id, user.id);
    }

    #[test]
    fn test_update_user_default_is_empty() {
        let update = UpdateUser::default();
        assert!(update.name.is_none());
        assert!(update.email.is_none());
        assert!(update.age.is_none());
        assert!(update.password_hash.is_none());
    }

    // Store-backed behavior (create/find/update/delete_cascade) is covered
    // by tests/user_lifecycle_tests.rs against a real database.
}
