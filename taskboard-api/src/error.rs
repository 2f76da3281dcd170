/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>`; domain errors from the shared
/// crate are translated here and nowhere else.
///
/// # Mapping
///
/// | Domain error | Status |
/// |---|---|
/// | request validation, malformed body, query or path | 422 |
/// | bad credentials, bad/missing bearer or refresh token | 401 |
/// | duplicate username/email, status in use, lost race | 409 |
/// | status/task not found (or owned by someone else) | 404 |
/// | reorder list is not the owner's exact status set | 400 |
/// | invalid, expired or consumed password-reset token | 400 |
///
/// # Example
///
/// ```
/// use taskboard_api::error::{ApiError, ApiResult};
/// use axum::Json;
/// use serde_json::json;
///
/// async fn handler(found: bool) -> ApiResult<Json<serde_json::Value>> {
///     if !found {
///         return Err(ApiError::NotFound("Task not found".to_string()));
///     }
///     Ok(Json(json!({ "ok": true })))
/// }
/// ```

use axum::{
    extract::rejection::{FormRejection, JsonRejection, PathRejection, QueryRejection},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::auth::{
    middleware::AuthError, password::PasswordError, session::SessionError,
};
use taskboard_shared::error::StoreError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400)
    BadRequest(String),

    /// Unauthorized (401)
    Unauthorized(String),

    /// Not found (404)
    NotFound(String),

    /// Conflict (409)
    Conflict(String),

    /// Unprocessable entity (422) - validation errors
    ValidationError(Vec<ValidationErrorDetail>),

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "unauthorized")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Optional validation errors
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl ApiError {
    /// HTTP status for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::ValidationError(errors) => {
                write!(f, "Validation failed: {} errors", errors.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let (error_code, message, details) = match self {
            ApiError::BadRequest(msg) => ("bad_request", msg, None),
            ApiError::Unauthorized(msg) => ("unauthorized", msg, None),
            ApiError::NotFound(msg) => ("not_found", msg, None),
            ApiError::Conflict(msg) => ("conflict", msg, None),
            ApiError::ValidationError(errors) => (
                "validation_error",
                "Request validation failed".to_string(),
                Some(errors),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

/// Convert storage errors to API errors
impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateIdentity => {
                ApiError::Conflict("Username or email already registered".to_string())
            }
            StoreError::UserNotFound => ApiError::Unauthorized("Invalid token".to_string()),
            StoreError::StatusNotFound => ApiError::NotFound("Status not found".to_string()),
            StoreError::TaskNotFound => ApiError::NotFound("Task not found".to_string()),
            StoreError::StatusInUse => ApiError::Conflict(
                "Status cannot be deleted while tasks reference it".to_string(),
            ),
            StoreError::InvalidReorderSet => ApiError::BadRequest(
                "Reorder must list every status ID exactly once".to_string(),
            ),
            StoreError::Conflict(msg) => ApiError::Conflict(msg),
            StoreError::Database(e) => ApiError::InternalError(format!("Database error: {}", e)),
        }
    }
}

/// Convert sqlx errors (transaction begin/commit) to API errors
impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::from(err).into()
    }
}

/// Convert session errors to API errors
impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::InvalidCredentials => {
                ApiError::Unauthorized("Incorrect email or password".to_string())
            }
            SessionError::InvalidRefreshToken => {
                ApiError::Unauthorized("Invalid or expired refresh token".to_string())
            }
            SessionError::InvalidResetToken => {
                ApiError::BadRequest("Invalid or expired token".to_string())
            }
            SessionError::Store(e) => e.into(),
            SessionError::Password(e) => e.into(),
            SessionError::Token(e) => {
                ApiError::InternalError(format!("Token issuance failed: {}", e))
            }
        }
    }
}

/// Convert bearer authentication errors to API errors
///
/// The response never says which check failed.
impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        tracing::warn!(error = %err, "Bearer authentication failed");
        ApiError::Unauthorized("Could not validate credentials".to_string())
    }
}

/// A single 422 detail for input that could not be parsed at all
fn malformed(field: &str, message: String) -> ApiError {
    tracing::debug!(field, %message, "Malformed request input");
    ApiError::ValidationError(vec![ValidationErrorDetail {
        field: field.to_string(),
        message,
    }])
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        malformed("body", rejection.body_text())
    }
}

impl From<FormRejection> for ApiError {
    fn from(rejection: FormRejection) -> Self {
        malformed("body", rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        malformed("query", rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        malformed("path", rejection.body_text())
    }
}

/// Convert password errors to API errors
impl From<PasswordError> for ApiError {
    fn from(err: PasswordError) -> Self {
        ApiError::InternalError(format!("Password operation failed: {}", err))
    }
}
