/// Task model and database operations
///
/// A task is a titled note with a due date, filed under one of its owner's
/// statuses. The status reference is always checked against the owner: a
/// task can never point at a status belonging to another user.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE tasks (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
///     status_id UUID NOT NULL REFERENCES statuses(id) ON DELETE RESTRICT,
///     title VARCHAR(255) NOT NULL,
///     content TEXT NOT NULL,
///     due_date DATE NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use chrono::NaiveDate;
/// use taskboard_shared::models::task::{Task, TaskFilter, TaskInput, SortOrder};
/// use sqlx::PgPool;
/// use uuid::Uuid;
///
/// # async fn example(pool: PgPool, owner: Uuid, status_id: Uuid) -> Result<(), Box<dyn std::error::Error>> {
/// let mut tx = pool.begin().await?;
///
/// Task::create(&mut tx, owner, TaskInput {
///     title: "Write report".to_string(),
///     content: "Quarterly numbers".to_string(),
///     due_date: NaiveDate::from_ymd_opt(2025, 9, 15).unwrap(),
///     status_id,
/// }).await?;
///
/// let upcoming = Task::list(&mut tx, owner, &TaskFilter {
///     order: SortOrder::Asc,
///     due_from: NaiveDate::from_ymd_opt(2025, 9, 1),
///     ..Default::default()
/// }).await?;
///
/// tx.commit().await?;
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, Postgres, QueryBuilder};
use uuid::Uuid;

use super::status::Status;
use crate::error::{StoreError, StoreResult};

const TASK_COLUMNS: &str =
    "id, user_id, status_id, title, content, due_date, created_at, updated_at";

/// Task model
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Task {
    /// Unique task ID
    pub id: Uuid,

    /// Owning user
    #[serde(skip_serializing)]
    pub user_id: Uuid,

    /// Status the task is filed under (owned by the same user)
    pub status_id: Uuid,

    /// Title
    pub title: String,

    /// Free-form body
    pub content: String,

    /// Due date
    pub due_date: NaiveDate,

    /// When the task was created
    pub created_at: DateTime<Utc>,

    /// When the task was last updated
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a task, used for both create and update
#[derive(Debug, Clone)]
pub struct TaskInput {
    pub title: String,
    pub content: String,
    pub due_date: NaiveDate,
    pub status_id: Uuid,
}

/// Sort direction for task listings, applied to `due_date`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    /// Earliest due date first
    Asc,

    /// Latest due date first
    #[default]
    Desc,
}

impl SortOrder {
    /// SQL keyword for this direction
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// Filters for [`Task::list`]
///
/// All bounds are inclusive. An empty keyword is treated as no keyword.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Sort direction on `due_date`
    pub order: SortOrder,

    /// Case-sensitive substring matched against title or content
    pub keyword: Option<String>,

    /// Earliest due date to include
    pub due_from: Option<NaiveDate>,

    /// Latest due date to include
    pub due_to: Option<NaiveDate>,
}

impl Task {
    /// Lists the owner's tasks matching `filter`
    ///
    /// Ties on `due_date` are broken by creation time and then ID, in the
    /// same direction, so pagination-free listings are stable.
    pub async fn list(
        conn: &mut PgConnection,
        user_id: Uuid,
        filter: &TaskFilter,
    ) -> StoreResult<Vec<Self>> {
        let mut query = build_list_query(user_id, filter);
        let tasks = query.build_query_as::<Task>().fetch_all(conn).await?;
        Ok(tasks)
    }

    /// Finds a task by ID, scoped to its owner
    pub async fn find_by_id_and_user(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
    ) -> StoreResult<Option<Self>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            "SELECT {} FROM tasks WHERE id = $1 AND user_id = $2",
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .fetch_optional(conn)
        .await?;

        Ok(task)
    }

    /// Like [`Task::find_by_id_and_user`] but fails with `TaskNotFound`
    pub async fn get(conn: &mut PgConnection, id: Uuid, user_id: Uuid) -> StoreResult<Self> {
        Self::find_by_id_and_user(conn, id, user_id)
            .await?
            .ok_or(StoreError::TaskNotFound)
    }

    /// Creates a task
    ///
    /// # Errors
    ///
    /// - `StatusNotFound` if `data.status_id` is not one of the owner's statuses
    pub async fn create(
        conn: &mut PgConnection,
        user_id: Uuid,
        data: TaskInput,
    ) -> StoreResult<Self> {
        Status::get_for_share(&mut *conn, data.status_id, user_id).await?;

        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, status_id, title, content, due_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(user_id)
        .bind(data.status_id)
        .bind(data.title)
        .bind(data.content)
        .bind(data.due_date)
        .fetch_one(conn)
        .await?;

        Ok(task)
    }

    /// Replaces a task's fields
    ///
    /// # Errors
    ///
    /// - `TaskNotFound` if the owner has no such task
    /// - `StatusNotFound` if `data.status_id` is not one of the owner's statuses
    pub async fn update(
        conn: &mut PgConnection,
        id: Uuid,
        user_id: Uuid,
        data: TaskInput,
    ) -> StoreResult<Self> {
        Self::get(&mut *conn, id, user_id).await?;
        Status::get_for_share(&mut *conn, data.status_id, user_id).await?;

        sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET status_id = $3, title = $4, content = $5, due_date = $6, updated_at = NOW()
            WHERE id = $1 AND user_id = $2
            RETURNING {}
            "#,
            TASK_COLUMNS
        ))
        .bind(id)
        .bind(user_id)
        .bind(data.status_id)
        .bind(data.title)
        .bind(data.content)
        .bind(data.due_date)
        .fetch_optional(conn)
        .await?
        .ok_or(StoreError::TaskNotFound)
    }

    /// Deletes a task
    ///
    /// # Errors
    ///
    /// - `TaskNotFound` if the owner has no such task
    pub async fn delete(conn: &mut PgConnection, id: Uuid, user_id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::TaskNotFound);
        }

        Ok(())
    }
}

fn build_list_query(user_id: Uuid, filter: &TaskFilter) -> QueryBuilder<'static, Postgres> {
    let mut query = QueryBuilder::new(format!("SELECT {} FROM tasks WHERE user_id = ", TASK_COLUMNS));
    query.push_bind(user_id);

    if let Some(keyword) = filter.keyword.as_deref().filter(|k| !k.is_empty()) {
        // strpos avoids LIKE wildcard interpretation of % and _
        query.push(" AND (strpos(title, ");
        query.push_bind(keyword.to_string());
        query.push(") > 0 OR strpos(content, ");
        query.push_bind(keyword.to_string());
        query.push(") > 0)");
    }

    if let Some(from) = filter.due_from {
        query.push(" AND due_date >= ");
        query.push_bind(from);
    }

    if let Some(to) = filter.due_to {
        query.push(" AND due_date <= ");
        query.push_bind(to);
    }

    let dir = filter.order.as_sql();
    query.push(format!(
        " ORDER BY due_date {dir}, created_at {dir}, id {dir}"
    ));

    query
}
