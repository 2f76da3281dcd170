/// User model and database operations
///
/// Users own statuses and tasks. Username and email are each unique across
/// all users; a violation of either surfaces as
/// [`StoreError::DuplicateIdentity`].
///
/// All operations take `&mut PgConnection` so they run inside the
/// request's transaction (`&mut *tx` for a `Transaction<'_, Postgres>`).
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username VARCHAR(150) NOT NULL UNIQUE,
///     email VARCHAR(255) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::user::{User, CreateUser};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
///
/// let user = User::create(&mut tx, CreateUser {
///     username: "alice".to_string(),
///     email: "alice@example.com".to_string(),
///     password_hash: "$argon2id$...".to_string(),
/// }).await?;
///
/// let found = User::find_by_email(&mut tx, "alice@example.com").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use crate::error::{StoreError, StoreResult};

/// User model representing an account
///
/// The password hash is never serialized, so a `User` can be returned from
/// handlers directly.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Display/login name, unique across users
    pub username: String,

    /// Email address, unique across users
    pub email: String,

    /// Argon2id password hash (PHC string)
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct CreateUser {
    /// Username
    pub username: String,

    /// Email address
    pub email: String,

    /// Argon2id password hash (NOT plaintext password!)
    pub password_hash: String,
}

impl User {
    /// Creates a new user
    ///
    /// # Errors
    ///
    /// - `DuplicateIdentity` if the username or email is already registered
    /// - `Database` for any other storage failure
    pub async fn create(conn: &mut PgConnection, data: CreateUser) -> StoreResult<Self> {
        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(conn: &mut PgConnection, id: Uuid) -> StoreResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID and locks the row until the end of the transaction
    ///
    /// A concurrent locker blocks here and then reads the committed row.
    pub async fn find_by_id_for_update(
        conn: &mut PgConnection,
        id: Uuid,
    ) -> StoreResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE id = $1
            FOR NO KEY UPDATE
            "#,
        )
        .bind(id)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Finds a user by email address (exact match)
    pub async fn find_by_email(conn: &mut PgConnection, email: &str) -> StoreResult<Option<Self>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, username, email, password_hash, created_at, updated_at
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(conn)
        .await?;

        Ok(user)
    }

    /// Changes a user's username
    ///
    /// # Errors
    ///
    /// - `DuplicateIdentity` if another user already has the name
    /// - `UserNotFound` if the user does not exist
    pub async fn update_username(
        conn: &mut PgConnection,
        id: Uuid,
        username: &str,
    ) -> StoreResult<Self> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET username = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(username)
        .fetch_optional(conn)
        .await?
        .ok_or(StoreError::UserNotFound)
    }

    /// Replaces a user's password hash
    ///
    /// Any password-reset token issued against the previous hash stops
    /// matching once this commits.
    pub async fn update_password_hash(
        conn: &mut PgConnection,
        id: Uuid,
        password_hash: &str,
    ) -> StoreResult<Self> {
        sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET password_hash = $2, updated_at = NOW()
            WHERE id = $1
            RETURNING id, username, email, password_hash, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(password_hash)
        .fetch_optional(conn)
        .await?
        .ok_or(StoreError::UserNotFound)
    }

    /// Locks the user's row until the end of the transaction
    ///
    /// Status creation, reordering and deletion take this lock first so that
    /// two concurrent requests for the same owner cannot both compute the
    /// same next position. `NO KEY UPDATE` leaves foreign-key checks from
    /// task inserts unblocked.
    pub async fn lock(conn: &mut PgConnection, id: Uuid) -> StoreResult<()> {
        sqlx::query_scalar::<_, Uuid>("SELECT id FROM users WHERE id = $1 FOR NO KEY UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?
            .ok_or(StoreError::UserNotFound)?;

        Ok(())
    }

    /// Deletes a user and, by cascade, everything they own
    ///
    /// Not reachable from the HTTP API; used by test cleanup and
    /// administrative tooling.
    pub async fn delete(conn: &mut PgConnection, id: Uuid) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}
