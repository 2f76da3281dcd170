/// Bearer authentication for Axum
///
/// Extracts the access token from the `Authorization: Bearer <token>`
/// header, verifies it with the [`TokenService`], and produces an
/// [`AuthContext`] that the router inserts into request extensions.
///
/// Only access tokens authenticate API requests. Refresh and
/// password-reset tokens presented as bearer tokens are rejected.
///
/// # Example
///
/// ```
/// use axum::http::{header, HeaderMap, HeaderValue};
/// use taskboard_shared::auth::jwt::{TokenService, TokenType};
/// use taskboard_shared::auth::middleware::authenticate_bearer;
/// use uuid::Uuid;
///
/// let tokens = TokenService::with_defaults("test-secret-key-at-least-32-bytes-long");
/// let user_id = Uuid::new_v4();
/// let token = tokens.issue(user_id, TokenType::Access).unwrap();
///
/// let mut headers = HeaderMap::new();
/// headers.insert(
///     header::AUTHORIZATION,
///     HeaderValue::from_str(&format!("Bearer {}", token)).unwrap(),
/// );
///
/// let auth = authenticate_bearer(&headers, &tokens).unwrap();
/// assert_eq!(auth.user_id, user_id);
/// ```

use axum::http::{header, HeaderMap};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::jwt::{JwtError, TokenService, TokenType};

/// Authentication context added to request extensions
///
/// Handlers extract it with `Extension<AuthContext>`; every store operation
/// is scoped by `user_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthContext {
    /// Authenticated user ID
    pub user_id: Uuid,
}

impl AuthContext {
    /// Creates auth context for a verified subject
    pub fn new(user_id: Uuid) -> Self {
        Self { user_id }
    }
}

/// Error type for bearer authentication
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// Missing authorization header
    #[error("Missing credentials")]
    MissingCredentials,

    /// Authorization header is not a bearer token
    #[error("Expected Bearer token")]
    InvalidFormat,

    /// Token verification failed
    #[error("Invalid token: {0}")]
    InvalidToken(#[from] JwtError),
}

/// Authenticates a request from its headers
///
/// # Errors
///
/// - `MissingCredentials` if there is no `Authorization` header
/// - `InvalidFormat` if the header is not `Bearer <token>`
/// - `InvalidToken` if the token is invalid, expired, or not an access token
pub fn authenticate_bearer(
    headers: &HeaderMap,
    tokens: &TokenService,
) -> Result<AuthContext, AuthError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or(AuthError::MissingCredentials)?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidFormat)?;

    let claims = tokens.verify(token.trim(), TokenType::Access)?;

    Ok(AuthContext::new(claims.sub))
}
