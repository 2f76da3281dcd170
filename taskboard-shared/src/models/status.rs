/// Status model and database operations
///
/// A status is a user-defined board column ("Todo", "Doing", "Done", ...).
/// Each user's statuses carry a dense 1-based position: after any create,
/// reorder or delete the positions are exactly `1..=N`.
///
/// # Ordering
///
/// - Create appends at `max(position) + 1` (1 for the first status).
/// - Reorder rewrites every position from a full list of the owner's IDs.
/// - Delete shifts every later status down by one.
///
/// Create, reorder and delete lock the owner's `users` row first. The
/// `(user_id, sort_order)` unique constraint is deferred to commit, so a
/// reorder may permute positions in place.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE statuses (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     name VARCHAR(50) NOT NULL,
///     color VARCHAR(7) NOT NULL,
///     sort_order INTEGER NOT NULL CHECK (sort_order > 0),
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     CONSTRAINT statuses_user_order_key UNIQUE (user_id, sort_order)
///         DEFERRABLE INITIALLY DEFERRED
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use taskboard_shared::models::status::{Status, StatusInput};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
///
/// let todo = Status::create(&mut tx, owner, StatusInput {
///     name: "Todo".to_string(),
///     color: "#cccccc".to_string(),
/// }).await?;
/// let done = Status::create(&mut tx, owner, StatusInput {
///     name: "Done".to_string(),
///     color: "#00ff00".to_string(),
/// }).await?;
///
/// let statuses = Status::reorder(&mut tx, owner, &[done.id, todo.id]).await?;
/// assert_eq!(statuses[0].id, done.id);
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgConnection;
use uuid::Uuid;

use super::user::User;
use crate::error::{StoreError, StoreResult};

/// Status model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Status {
    /// Unique status ID
    pub id: Uuid,

    /// Owning user
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    /// Display name
    pub name: String,

    /// Display color (`#RRGGBB`)
    pub color: String,

    /// 1-based position within the owner's board
    #[serde(rename = "order")]
    pub sort_order: i32,

    /// When the status was created
    pub created_at: DateTime<Utc>,

    /// When the status was last updated
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a status, used for both create and update
#[derive(Debug, Clone)]
pub struct StatusInput {
    /// Display name
    pub name: String,

    /// Display color
    pub color: String,
}

impl Status {
    /// Lists the owner's statuses by position
    pub async fn list_by_user(conn: &mut PgConnection, user_id: Uuid) -> StoreResult<Vec<Self>> {
        let statuses = sqlx::query_as::<_, Status>(
            r#"
            SELECT id, user_id, name, color, sort_order, created_at, updated_at
            FROM statuses
            WHERE user_id = $1
            ORDER BY sort_order ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(conn)
        .await?;

        Ok(statuses)
    }

    /// Finds a status by ID, scoped to its owner
    ///
    /// A status owned by someone else is reported as absent.
    pub async fn find_by_id_and_user(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Self>> {
        let status = sqlx::query_as::<_, Status>(
            r#"
            SELECT id, user_id, name, color, sort_order, created_at, updated_at
            FROM statuses
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(status)
    }

    /// Like [`Status::find_by_id_and_user`] but fails with `StatusNotFound`
    pub async fn get(conn: &mut PgConnection, id: Uuid, user_id: Uuid) -> StoreResult<Self> {
        Self::find_by_id_and_user(conn, id, user_id)
            .await?
            .ok_or(StoreError::StatusNotFound)
    }

    /// Like [`Status::get`] but holds a share lock on the row until commit
    ///
    /// Task writes take this lock so a concurrent delete either waits for
    /// them or has already removed the row, which reads as `StatusNotFound`.
    pub async fn get_for_share(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Self> {
        sqlx::query_as::<_, Status>(
            r#"
            SELECT id, user_id, name, color, sort_order, created_at, updated_at
            FROM statuses
            WHERE id = $1 AND user_id = $2
            FOR SHARE
            "#,
        )
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?
        .ok_or(StoreError::StatusNotFound)
    }

    /// Creates a status at the end of the owner's board
    pub async fn create(
        conn: &mut PgConnection,
        user_id: Uuid,
        data: StatusInput,
    ) -> StoreResult<Self> {
        User::lock(&mut *conn, user_id).await?;

        let status = sqlx::query_as::<_, Status>(
            r#"
            INSERT INTO statuses (user_id, name, color, sort_order)
            SELECT $1, $2, $3, COALESCE(MAX(sort_order), 0) + 1
            FROM statuses
            WHERE user_id = $1
            RETURNING id, user_id, name, color, sort_order, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(data.name)
        .bind(data.color)
        .fetch_one(conn)
        .await?;

        Ok(status)
    }

    /// Updates a status's name and color; its position is unchanged
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
        data: StatusInput,
    ) -> StoreResult<Self> {
        sqlx::query_as::<_, Status>(
            r#"
            UPDATE statuses
            SET name = $3, color = $4, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING id, user_id, name, color, sort_order, created_at, updated_at
            "#,
        )
        .bind(id)
        .bind(user_id)
        .bind(data.name)
        .bind(data.color)
        .fetch_optional(conn)
        .await?
        .ok_or(StoreError::StatusNotFound)
    }

    /// Rewrites the owner's positions so `ids[i]` gets position `i + 1`
    ///
    /// # Errors
    ///
    /// - `InvalidReorderSet` unless `ids` lists every one of the owner's
    ///   statuses exactly once (no missing, extra, foreign or repeated IDs)
    pub async fn reorder(
        conn: &mut PgConnection,
        user_id: Uuid,
        ids: &[Uuid],
    ) -> StoreResult<Vec<Self>> {
        User::lock(&mut *conn, user_id).await?;

        let owned: Vec<Uuid> =
            sqlx::query_scalar::<_, Uuid>("SELECT id FROM statuses WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&mut *conn)
                .await?;

        if !is_exact_permutation(&owned, ids) {
            return Err(StoreError::InvalidReorderSet);
        }

        sqlx::query(
            r#"
            UPDATE statuses s
            SET sort_order = v.pos, updated_at = NOW()
            FROM UNNEST($1::uuid[]) WITH ORDINALITY AS v(id, pos)
            WHERE s.id = v.id AND s.user_id = $2
            "#,
        )
        .bind(ids)
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

        Self::list_by_user(conn, user_id).await
    }

    /// Checks whether any task references the status
    pub async fn has_tasks(conn: &mut PgConnection, id: Uuid) -> StoreResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS (SELECT 1 FROM tasks WHERE status_id = $1)",
        )
        .bind(id)
        .fetch_one(conn)
        .await?;

        Ok(exists)
    }

    /// Deletes a status
    ///
    /// # Errors
    ///
    /// - `StatusNotFound` if the owner has no such status
    /// - `StatusInUse` if any task references it
    pub async fn delete(conn: &mut PgConnection, id: Uuid, user_id: Uuid) -> StoreResult<()> {
        User::lock(&mut *conn, user_id).await?;
        let status = Self::get(&mut *conn, id, user_id).await?;

        if Self::has_tasks(&mut *conn, status.id).await? {
            return Err(StoreError::StatusInUse);
        }

        // Task writes hold a share lock on the status, so one committed
        // after the check still trips the RESTRICT foreign key here, which
        // maps to StatusInUse as well.
        sqlx::query("DELETE FROM statuses WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&mut *conn)
            .await?;

        sqlx::query(
            r#"
            UPDATE statuses
            SET sort_order = sort_order - 1, updated_at = NOW()
            WHERE user_id = $1 AND sort_order > $2
            "#,
        )
        .bind(user_id)
        .bind(status.sort_order)
        .execute(conn)
        .await?;

        Ok(())
    }
}

/// True when `requested` is a permutation of `owned`
fn is_exact_permutation(owned: &[Uuid], requested: &[Uuid]) -> bool {
    if owned.len() != requested.len() {
        return false;
    }

    let owned: HashSet<&Uuid> = owned.iter().collect();
    let requested: HashSet<&Uuid> = requested.iter().collect();

    // Equal lengths plus equal sets rules out duplicates
    requested.len() == owned.len() && requested == owned
}
