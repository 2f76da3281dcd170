/// Request extractors that reject with [`ApiError`]
///
/// axum's stock `Json`, `Form`, `Query` and `Path` extractors answer
/// malformed input with a plain-text 400. These wrappers run the same
/// extraction and turn the rejection into a 422 `validation_error` body, so
/// every client error keeps the `ErrorResponse` shape.
///
/// # Example
///
/// ```
/// use axum::Json;
/// use taskboard_api::error::ApiResult;
/// use taskboard_api::extract::{ApiJson, ApiPath};
/// use uuid::Uuid;
///
/// async fn handler(
///     ApiPath(id): ApiPath<Uuid>,
///     ApiJson(body): ApiJson<serde_json::Value>,
/// ) -> ApiResult<Json<serde_json::Value>> {
///     Ok(Json(serde_json::json!({ "id": id, "body": body })))
/// }
/// ```

use crate::error::ApiError;
use axum::extract::{FromRequest, FromRequestParts};

/// JSON request body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// URL-encoded form body
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Form), rejection(ApiError))]
pub struct ApiForm<T>(pub T);

/// Query string
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

/// Path parameters
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Path), rejection(ApiError))]
pub struct ApiPath<T>(pub T);
