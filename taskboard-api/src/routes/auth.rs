/// Authentication endpoints
///
/// # Endpoints
///
/// - `POST /auth/signup` - Register a new account
/// - `POST /auth/login` - Form login (`username` carries the email); sets the refresh cookie
/// - `POST /auth/refresh` - Exchange the refresh cookie for a new access token (rotates the cookie)
/// - `POST /auth/logout` - Clear the refresh cookie
/// - `GET /auth/me` - Current user (bearer)
/// - `PUT /auth/me` - Change username (bearer)
/// - `POST /auth/password-reset/request` - Mail a reset link if the email is registered
/// - `POST /auth/password-reset/confirm` - Set a new password with a reset token
///
/// Responses never reveal whether an email is registered: login failures are
/// a generic 401 and reset requests are always 202.

use crate::{
    app::AppState,
    cookies::{clear_refresh_cookie, read_cookie, refresh_cookie, REFRESH_COOKIE},
    error::{ApiError, ApiResult},
    extract::{ApiForm, ApiJson},
    mailer::{dispatch_password_reset, reset_link},
    routes::validate_request,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use taskboard_shared::{
    auth::{jwt::TokenType, middleware::AuthContext, session},
    models::user::User,
};
use validator::Validate;

/// Token type reported to clients
pub const BEARER: &str = "bearer";

/// Signup request
#[derive(Debug, Deserialize, Validate)]
pub struct SignupRequest {
    /// Username
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,

    /// Email address
    #[validate(
        email(message = "Invalid email format"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    pub email: String,

    /// Password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Login form (OAuth2 password-grant shape: `username` is the email)
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    /// Email address
    pub username: String,

    /// Password
    pub password: String,
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    /// Access token for the `Authorization: Bearer` header
    pub access_token: String,

    /// Always "bearer"
    pub token_type: &'static str,

    /// The logged-in user
    pub user: User,
}

/// Refresh response
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    /// New access token
    pub access_token: String,

    /// Always "bearer"
    pub token_type: &'static str,
}

/// Username change request
#[derive(Debug, Deserialize, Validate)]
pub struct UsernameUpdate {
    /// New username
    #[validate(length(min = 3, max = 150, message = "Username must be 3-150 characters"))]
    pub username: String,
}

/// Password reset request
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetRequest {
    /// Account email
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Password reset confirmation
#[derive(Debug, Deserialize, Validate)]
pub struct PasswordResetConfirm {
    /// Token from the reset link
    pub token: String,

    /// New password
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Generic message response
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Register a new account
///
/// # Errors
///
/// - `409 Conflict`: Username or email already registered
/// - `422 Unprocessable Entity`: Validation failed
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<SignupRequest>,
) -> ApiResult<(StatusCode, Json<User>)> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;
    let user = session::signup(&mut tx, &req.username, &req.email, &req.password).await?;
    tx.commit().await?;

    Ok((StatusCode::CREATED, Json(user)))
}

/// Log in with email and password
///
/// # Errors
///
/// - `401 Unauthorized`: Unknown email or wrong password (indistinguishable)
pub async fn login(
    State(state): State<AppState>,
    ApiForm(form): ApiForm<LoginForm>,
) -> ApiResult<impl IntoResponse> {
    let mut tx = state.db.begin().await?;
    let outcome = session::login(&mut tx, &state.tokens, &form.username, &form.password).await?;
    tx.commit().await?;

    let cookie = refresh_cookie(
        &outcome.tokens.refresh_token,
        state.tokens.ttl(TokenType::Refresh),
        state.config.cookie.secure,
    )?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(LoginResponse {
            access_token: outcome.tokens.access_token,
            token_type: BEARER,
            user: outcome.user,
        }),
    ))
}

/// Issue a new access token from the refresh cookie and rotate the cookie
///
/// # Errors
///
/// - `401 Unauthorized`: Cookie missing, invalid, expired, or not a refresh token
pub async fn refresh(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> ApiResult<impl IntoResponse> {
    let token = read_cookie(&headers, REFRESH_COOKIE)
        .ok_or_else(|| ApiError::Unauthorized("Refresh token missing".to_string()))?;

    let pair = session::refresh(&state.tokens, &token)?;

    let cookie = refresh_cookie(
        &pair.refresh_token,
        state.tokens.ttl(TokenType::Refresh),
        state.config.cookie.secure,
    )?;

    Ok((
        [(header::SET_COOKIE, cookie)],
        Json(TokenResponse {
            access_token: pair.access_token,
            token_type: BEARER,
        }),
    ))
}

/// Clear the refresh cookie
///
/// Always succeeds. Access tokens already issued stay valid until they expire.
pub async fn logout(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, clear_refresh_cookie(state.config.cookie.secure))],
    )
}

/// Current user
pub async fn get_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> ApiResult<Json<User>> {
    let mut tx = state.db.begin().await?;
    let user = User::find_by_id(&mut tx, auth.user_id)
        .await?
        .ok_or_else(|| ApiError::Unauthorized("Invalid token".to_string()))?;
    tx.commit().await?;

    Ok(Json(user))
}

/// Change the current user's username
///
/// # Errors
///
/// - `409 Conflict`: Username taken
/// - `422 Unprocessable Entity`: Validation failed
pub async fn update_me(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    ApiJson(req): ApiJson<UsernameUpdate>,
) -> ApiResult<Json<User>> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;
    let user = User::update_username(&mut tx, auth.user_id, &req.username).await?;
    tx.commit().await?;

    Ok(Json(user))
}

/// Start a password reset
///
/// Responds 202 whether or not the email is registered. When it is, the
/// reset link is handed to the notifier after the response is decided.
pub async fn request_password_reset(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PasswordResetRequest>,
) -> ApiResult<StatusCode> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;
    let ticket = session::request_password_reset(&mut tx, &state.tokens, &req.email).await?;
    tx.commit().await?;

    if let Some(ticket) = ticket {
        let link = reset_link(&state.config.mail.frontend_url, &ticket.token);
        dispatch_password_reset(state.notifier.clone(), ticket.user.email, link);
    }

    Ok(StatusCode::ACCEPTED)
}

/// Finish a password reset
///
/// # Errors
///
/// - `400 Bad Request`: Token invalid, expired, or already used
/// - `422 Unprocessable Entity`: New password too short
pub async fn confirm_password_reset(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<PasswordResetConfirm>,
) -> ApiResult<Json<MessageResponse>> {
    validate_request(&req)?;

    let mut tx = state.db.begin().await?;
    session::confirm_password_reset(&mut tx, &state.tokens, &req.token, &req.new_password).await?;
    tx.commit().await?;

    Ok(Json(MessageResponse {
        message: "Password reset successful".to_string(),
    }))
}
