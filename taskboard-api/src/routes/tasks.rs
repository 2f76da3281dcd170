/// Task endpoints (bearer authentication required)
///
/// # Endpoints
///
/// - `GET /tasks?order=asc|desc&q=&due_date_from=&due_date_to=` - Filtered list
/// - `GET /tasks/:id` - Get one task
/// - `POST /tasks` - Create a task
/// - `PUT /tasks/:id` - Replace a task's fields
/// - `DELETE /tasks/:id` - Delete a task
///
/// A `status_id` that is not one of the caller's statuses answers 404 on
/// create and update.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    routes::validate_request,
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::task::{SortOrder, Task, TaskFilter, TaskInput},
};
use uuid::Uuid;
use validator::Validate;

/// Query parameters for the task list
#[derive(Debug, Default, Deserialize)]
pub struct TaskListQuery {
    /// Sort direction on due date (default: desc)
    pub order: Option<SortOrder>,

    /// Keyword matched in title or content
    pub q: Option<String>,

    /// Earliest due date, inclusive
    pub due_date_from: Option<NaiveDate>,

    /// Latest due date, inclusive
    pub due_date_to: Option<NaiveDate>,
}

impl From<TaskListQuery> for TaskFilter {
    fn from(query: TaskListQuery) -> Self {
        TaskFilter {
            order: query.order.unwrap_or_default(),
            keyword: query.q,
            due_from: query.due_date_from,
            due_to: query.due_date_to,
        }
    }
}

/// Create/update request
#[derive(Debug, Deserialize, Validate)]
pub struct TaskRequest {
    /// Title
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,

    /// Body
    pub content: String,

    /// Due date (`YYYY-MM-DD`)
    pub due_date: NaiveDate,

    /// Status to file the task under
    pub status_id: Uuid,
}

impl From<TaskRequest> for TaskInput {
    fn from(req: TaskRequest) -> Self {
        TaskInput {
            title: req.title,
            content: req.content,
            due_date: req.due_date,
            status_id: req.status_id,
        }
    }
}

/// Task list response
#[derive(Debug, Serialize)]
pub struct TaskListResponse {
    pub tasks: Vec<Task>,
}

/// List the caller's tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiQuery(query): ApiQuery<TaskListQuery>,
) -> ApiResult<Json<TaskListResponse>> {
    let filter = TaskFilter::from(query);

    let mut tx = state.db.begin().await?;
    let tasks = Task::list(&mut tx, auth.user_id, &filter).await?;
    tx.commit().await?;

    Ok(Json(TaskListResponse { tasks }))
}

/// Get one task
pub async fn get_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Task>> {
    let mut tx = state.db.begin().await?;
    let task = Task::get(&mut tx, id, auth.user_id).await?;
    tx.commit().await?;

    Ok(Json(task))
}

/// Create a task
///
/// # Errors
///
/// - `404 Not Found`: `status_id` is not one of the caller's statuses
/// - `422 Unprocessable Entity`: Validation failed
pub async fn create_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<(StatusCode, Json<Task>)> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;
    let task = Task::create(&mut tx, auth.user_id, req.into()).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(task)))
}

/// Replace a task's fields
///
/// # Errors
///
/// - `404 Not Found`: No such task, or `status_id` is not one of the caller's statuses
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<TaskRequest>,
) -> ApiResult<Json<Task>> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;
    let task = Task::update(&mut tx, id, auth.user_id, req.into()).await?;
    tx.commit().await?;

    Ok(Json(task))
}

/// Delete a task
pub async fn delete_task(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;
    Task::delete(&mut tx, id, auth.user_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
