/// Session and account flows
///
/// Glues the identity store, password hashing and the token service into the
/// operations the HTTP layer exposes: signup, login, token refresh and the
/// two halves of password reset.
///
/// Every function that touches storage takes `&mut PgConnection`; the caller
/// owns the transaction and commits it.
///
/// # Failure reporting
///
/// - Login failures are always [`SessionError::InvalidCredentials`], whether
///   the email is unknown or the password is wrong.
/// - Refresh failures are always [`SessionError::InvalidRefreshToken`].
/// - Reset confirmation failures (bad signature, expiry, wrong type, unknown
///   user, stale fingerprint) are always [`SessionError::InvalidResetToken`].

use sqlx::PgConnection;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::jwt::{JwtError, TokenPair, TokenService, TokenType};
use super::password::{hash_password, password_fingerprint, verify_password, PasswordError};
use crate::error::StoreError;
use crate::models::user::{CreateUser, User};

/// Well-formed hash checked against on logins for unknown emails
///
/// Uses the same parameters as [`hash_password`], so verifying against it
/// costs the same as verifying a real account's hash.
const DUMMY_PASSWORD_HASH: &str =
    "$argon2id$v=19$m=19456,t=2,p=1$dGFza2JvYXJkLWR1bW15$1LO1Eb5TWsJ25ALz7h6EMXzyt3Be9AU3gs7X8cVkHoY";

/// Error type for session flows
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Unknown email or wrong password
    #[error("Incorrect email or password")]
    InvalidCredentials,

    /// Refresh token missing, invalid, expired or of the wrong type
    #[error("Invalid or expired refresh token")]
    InvalidRefreshToken,

    /// Reset token invalid, expired, or already consumed
    #[error("Invalid or expired token")]
    InvalidResetToken,

    /// Storage failure (including duplicate identity on signup)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Password hashing failure
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Token issuance failure
    #[error(transparent)]
    Token(#[from] JwtError),
}

/// Result of a successful login
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    /// The authenticated user
    pub user: User,

    /// Fresh access/refresh pair
    pub tokens: TokenPair,
}

/// A minted password-reset token and the account it belongs to
#[derive(Debug, Clone)]
pub struct PasswordResetTicket {
    /// Account owner; the notifier sends to `user.email`
    pub user: User,

    /// Signed reset token
    pub token: String,
}

/// Registers a new account
///
/// # Errors
///
/// - `Store(DuplicateIdentity)` if the username or email is taken
pub async fn signup(
    conn: &mut PgConnection,
    username: &str,
    email: &str,
    password: &str,
) -> Result<User, SessionError> {
    let password_hash = hash_password(password)?;

    let user = User::create(
        conn,
        CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        },
    )
    .await?;

    info!(user_id = %user.id, "User registered");
    Ok(user)
}

/// Authenticates by email and password and issues a token pair
pub async fn login(
    conn: &mut PgConnection,
    tokens: &TokenService,
    email: &str,
    password: &str,
) -> Result<LoginOutcome, SessionError> {
    let Some(user) = User::find_by_email(conn, email).await? else {
        // Spend the same Argon2 work as a real check so timing does not
        // reveal whether the account exists.
        let _ = verify_password(password, DUMMY_PASSWORD_HASH);
        warn!("Login failed: unknown email");
        return Err(SessionError::InvalidCredentials);
    };

    if !verify_password(password, &user.password_hash)? {
        warn!(user_id = %user.id, "Login failed: wrong password");
        return Err(SessionError::InvalidCredentials);
    }

    let pair = tokens.issue_pair(user.id)?;
    info!(user_id = %user.id, "User logged in");

    Ok(LoginOutcome { user, tokens: pair })
}

/// Exchanges a refresh token for a new access/refresh pair
///
/// The presented refresh token is not revoked; it stays valid until its own
/// expiry.
pub fn refresh(tokens: &TokenService, refresh_token: &str) -> Result<TokenPair, SessionError> {
    let claims = tokens
        .verify(refresh_token, TokenType::Refresh)
        .map_err(|e| {
            warn!(error = %e, "Refresh rejected");
            SessionError::InvalidRefreshToken
        })?;

    debug!(user_id = %claims.sub, "Refreshing session");
    Ok(tokens.issue_pair(claims.sub)?)
}

/// Mints a password-reset token if the email belongs to an account
///
/// Returns `None` for unknown emails; callers must respond identically in
/// both cases.
pub async fn request_password_reset(
    conn: &mut PgConnection,
    tokens: &TokenService,
    email: &str,
) -> Result<Option<PasswordResetTicket>, SessionError> {
    let Some(user) = User::find_by_email(conn, email).await? else {
        debug!("Password reset requested for unknown email");
        return Ok(None);
    };

    let token = tokens.issue_password_reset(user.id, &user.password_hash)?;
    info!(user_id = %user.id, "Password reset token issued");

    Ok(Some(PasswordResetTicket { user, token }))
}

/// Sets a new password using a reset token
///
/// The token is accepted only while the user's stored hash still matches the
/// fingerprint embedded at issuance, so a token works at most once. The user
/// row stays locked until the caller's transaction ends.
pub async fn confirm_password_reset(
    conn: &mut PgConnection,
    tokens: &TokenService,
    token: &str,
    new_password: &str,
) -> Result<User, SessionError> {
    let (user_id, fingerprint) = tokens.verify_password_reset(token).map_err(|e| {
        warn!(error = %e, "Password reset token rejected");
        SessionError::InvalidResetToken
    })?;

    // Two confirms with the same token serialize here; the second one reads
    // the new hash and fails the fingerprint check.
    let user = User::find_by_id_for_update(&mut *conn, user_id)
        .await?
        .ok_or(SessionError::InvalidResetToken)?;

    if !fingerprint_matches(&fingerprint, &user.password_hash) {
        warn!(user_id = %user.id, "Password reset token already used or superseded");
        return Err(SessionError::InvalidResetToken);
    }

    let user = change_password(conn, user.id, new_password).await?;
    info!(user_id = %user.id, "Password reset completed");

    Ok(user)
}

/// Rehashes and stores a new password
///
/// Outstanding reset tokens stop matching once this commits.
pub async fn change_password(
    conn: &mut PgConnection,
    user_id: Uuid,
    new_password: &str,
) -> Result<User, SessionError> {
    let password_hash = hash_password(new_password)?;
    Ok(User::update_password_hash(conn, user_id, &password_hash).await?)
}

fn fingerprint_matches(fingerprint: &str, password_hash: &str) -> bool {
    password_fingerprint(password_hash) == fingerprint
}
