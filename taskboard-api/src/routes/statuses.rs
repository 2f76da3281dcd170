/// Status endpoints (bearer authentication required)
///
/// # Endpoints
///
/// - `GET /statuses` - List statuses by position
/// - `GET /statuses/:id` - Get one status
/// - `POST /statuses` - Create a status at the end of the board
/// - `PUT /statuses/reorder` - Reorder the whole board
/// - `PUT /statuses/:id` - Rename/recolor a status
/// - `DELETE /statuses/:id` - Delete a status (409 while tasks reference it)
///
/// Statuses owned by other users answer 404, exactly like missing ones.

use crate::{
    app::AppState,
    error::ApiResult,
    extract::{ApiJson, ApiPath},
    routes::validate_request,
};
use axum::{
    extract::State,
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::middleware::AuthContext,
    models::status::{Status, StatusInput},
};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Create/update request
#[derive(Debug, Deserialize, Validate)]
pub struct StatusRequest {
    /// Display name
    #[validate(length(min = 1, max = 50, message = "Name must be 1-50 characters"))]
    pub name: String,

    /// Display color, `#RRGGBB`
    #[validate(custom(function = "validate_color"))]
    pub color: String,
}

impl From<StatusRequest> for StatusInput {
    fn from(req: StatusRequest) -> Self {
        StatusInput {
            name: req.name,
            color: req.color,
        }
    }
}

/// Reorder request: every status ID, in the new order
#[derive(Debug, Deserialize)]
pub struct ReorderRequest {
    pub order: Vec<Uuid>,
}

/// Status list response
#[derive(Debug, Serialize)]
pub struct StatusListResponse {
    pub statuses: Vec<Status>,
}

fn validate_color(color: &str) -> Result<(), ValidationError> {
    let bytes = color.as_bytes();
    let valid = bytes.len() == 7
        && bytes[0] == b'#'
        && bytes[1..].iter().all(|b| b.is_ascii_hexdigit());

    if valid {
        Ok(())
    } else {
        let mut err = ValidationError::new("color");
        err.message = Some("Color must be #RRGGBB".into());
        Err(err)
    }
}

/// List the caller's statuses by position
pub async fn list_statuses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<StatusListResponse>> {
    let mut tx = state.db.begin().await?;
    let statuses = Status::list_by_user(&mut tx, auth.user_id).await?;
    tx.commit().await?;

    Ok(Json(StatusListResponse { statuses }))
}

/// Get one status
pub async fn get_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<Json<Status>> {
    let mut tx = state.db.begin().await?;
    let status = Status::get(&mut tx, id, auth.user_id).await?;
    tx.commit().await?;

    Ok(Json(status))
}

/// Create a status at the end of the board
pub async fn create_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<(StatusCode, Json<Status>)> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;
    let status = Status::create(&mut tx, auth.user_id, req.into()).await?;
    tx.commit().await?;

    tracing::debug!(status_id = %status.id, order = status.sort_order, "Status created");
    Ok((StatusCode::CREATED, Json(status)))
}

/// Rename or recolor a status
pub async fn update_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(req): ApiJson<StatusRequest>,
) -> ApiResult<Json<Status>> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;
    let status = Status::update(&mut tx, id, auth.user_id, req.into()).await?;
    tx.commit().await?;

    Ok(Json(status))
}

/// Reorder the whole board
///
/// # Errors
///
/// - `400 Bad Request`: `order` is not exactly the caller's status IDs
pub async fn reorder_statuses(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<ReorderRequest>,
) -> ApiResult<Json<StatusListResponse>> {
    let mut tx = state.db.begin().await?;
    let statuses = Status::reorder(&mut tx, auth.user_id, &req.order).await?;
    tx.commit().await?;

    Ok(Json(StatusListResponse { statuses }))
}

/// Delete a status
///
/// # Errors
///
/// - `404 Not Found`: No such status for the caller
/// - `409 Conflict`: Tasks still reference the status
pub async fn delete_status(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiPath(id): ApiPath<Uuid>,
) -> ApiResult<StatusCode> {
    let mut tx = state.db.begin().await?;
    Status::delete(&mut tx, id, auth.user_id).await?;
    tx.commit().await?;

    Ok(StatusCode::NO_CONTENT)
}
