/// JWT token generation and validation module
///
/// Tokens are signed with HS256 (HMAC-SHA256) and carry the subject user,
/// the token type and the expiry. Verification is stateless: there is no
/// server-side token table, so a token stays valid until it expires.
///
/// # Token Types
///
/// - **Access Token**: Short-lived (default 30 minutes), sent as a bearer token
/// - **Refresh Token**: Long-lived (default 7 days), delivered only in a cookie
/// - **Password Reset Token**: Default 60 minutes, mailed to the account owner
///
/// A password-reset token also embeds a fingerprint of the password hash
/// that was current when it was issued (the `pwh` claim). Once the password
/// changes the fingerprint no longer matches, which makes the token single
/// use without any revocation store.
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::jwt::{TokenService, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::with_defaults("test-secret-key-at-least-32-bytes-long");
/// let user_id = Uuid::new_v4();
///
/// let access = tokens.issue(user_id, TokenType::Access)?;
/// let claims = tokens.verify(&access, TokenType::Access)?;
/// assert_eq!(claims.sub, user_id);
///
/// // A refresh token is never accepted where an access token is expected
/// let refresh = tokens.issue(user_id, TokenType::Refresh)?;
/// assert!(tokens.verify(&refresh, TokenType::Access).is_err());
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::password::password_fingerprint;

/// Issuer claim stamped on every token
pub const ISSUER: &str = "taskboard";

/// Error type for JWT operations
#[derive(Debug, thiserror::Error)]
pub enum JwtError {
    /// Failed to create token
    #[error("Failed to create token: {0}")]
    CreateError(String),

    /// Failed to validate token
    #[error("Failed to validate token: {0}")]
    ValidationError(String),

    /// Token has expired
    #[error("Token has expired")]
    Expired,

    /// Invalid issuer
    #[error("Invalid token issuer")]
    InvalidIssuer,

    /// Token is valid but of the wrong type
    #[error("Expected {expected} token, got {actual} token")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },

    /// Password-reset token without a fingerprint claim
    #[error("Password reset token is missing its fingerprint")]
    MissingFingerprint,
}

/// Token type identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Access token (bearer)
    Access,

    /// Refresh token (cookie)
    Refresh,

    /// Password reset token (email)
    PasswordReset,
}

impl TokenType {
    /// Gets token type as string
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenType::Access => "access",
            TokenType::Refresh => "refresh",
            TokenType::PasswordReset => "password_reset",
        }
    }
}

impl std::fmt::Display for TokenType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// JWT claims structure
///
/// # Standard Claims
///
/// - `sub`: Subject (user ID)
/// - `iss`: Issuer (always "taskboard")
/// - `iat`: Issued at timestamp
/// - `exp`: Expiration timestamp
/// - `nbf`: Not before timestamp
///
/// # Custom Claims
///
/// - `token_type`: Access, refresh or password reset
/// - `pwh`: Password-hash fingerprint (password reset only)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject - User ID
    pub sub: Uuid,

    /// Issuer - Always "taskboard"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,

    /// Not before (Unix timestamp)
    pub nbf: i64,

    /// Token type (custom claim)
    pub token_type: TokenType,

    /// Password-hash fingerprint (custom claim, password reset only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pwh: Option<String>,
}

impl Claims {
    /// Creates claims expiring `expires_in` from now
    ///
    /// # Example
    ///
    /// ```
    /// use taskboard_shared::auth::jwt::{Claims, TokenType};
    /// use chrono::Duration;
    /// use uuid::Uuid;
    ///
    /// let claims = Claims::with_expiration(Uuid::new_v4(), TokenType::Access, Duration::hours(1));
    /// assert_eq!(claims.exp - claims.iat, 3600);
    /// ```
    pub fn with_expiration(user_id: Uuid, token_type: TokenType, expires_in: Duration) -> Self {
        let now = Utc::now();
        let expiration = now + expires_in;

        Self {
            sub: user_id,
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: expiration.timestamp(),
            nbf: now.timestamp(),
            token_type,
            pwh: None,
        }
    }

    /// Creates password-reset claims bound to the current password hash
    pub fn password_reset(user_id: Uuid, password_hash: &str, expires_in: Duration) -> Self {
        Self {
            pwh: Some(password_fingerprint(password_hash)),
            ..Self::with_expiration(user_id, TokenType::PasswordReset, expires_in)
        }
    }
}

/// Creates a JWT token from claims
///
/// # Errors
///
/// Returns `JwtError::CreateError` if token creation fails
pub fn create_token(claims: &Claims, secret: &str) -> Result<String, JwtError> {
    let header = Header::new(Algorithm::HS256);
    let key = EncodingKey::from_secret(secret.as_bytes());

    encode(&header, claims, &key)
        .map_err(|e| JwtError::CreateError(format!("Token encoding failed: {}", e)))
}

/// Validates a JWT token and extracts claims
///
/// Verifies signature, expiration, not-before and issuer. The token type is
/// not checked here; use [`TokenService::verify`] for that.
pub fn validate_token(token: &str, secret: &str) -> Result<Claims, JwtError> {
    let key = DecodingKey::from_secret(secret.as_bytes());

    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[ISSUER]);
    validation.validate_exp = true;
    validation.validate_nbf = true;

    let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => JwtError::Expired,
        jsonwebtoken::errors::ErrorKind::InvalidIssuer => JwtError::InvalidIssuer,
        _ => JwtError::ValidationError(format!("Token validation failed: {}", e)),
    })?;

    Ok(token_data.claims)
}

/// Access and refresh tokens issued together at login and on refresh
#[derive(Debug, Clone)]
pub struct TokenPair {
    /// Bearer token for API requests
    pub access_token: String,

    /// Token for the refresh cookie
    pub refresh_token: String,
}

/// Issues and verifies typed tokens
///
/// Built once at startup from configuration and shared read-only. Cloning
/// is cheap enough for per-request use (one secret string, three durations).
#[derive(Debug, Clone)]
pub struct TokenService {
    secret: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
    password_reset_ttl: Duration,
}

impl TokenService {
    /// Creates a token service with explicit lifetimes
    pub fn new(
        secret: impl Into<String>,
        access_ttl: Duration,
        refresh_ttl: Duration,
        password_reset_ttl: Duration,
    ) -> Self {
        Self {
            secret: secret.into(),
            access_ttl,
            refresh_ttl,
            password_reset_ttl,
        }
    }

    /// Creates a token service with default lifetimes
    /// (access 30 minutes, refresh 7 days, password reset 60 minutes)
    pub fn with_defaults(secret: impl Into<String>) -> Self {
        Self::new(
            secret,
            Duration::minutes(30),
            Duration::days(7),
            Duration::minutes(60),
        )
    }

    /// Configured lifetime for a token type
    pub fn ttl(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => self.access_ttl,
            TokenType::Refresh => self.refresh_ttl,
            TokenType::PasswordReset => self.password_reset_ttl,
        }
    }

    /// Issues a token of the given type with its configured lifetime
    pub fn issue(&self, user_id: Uuid, token_type: TokenType) -> Result<String, JwtError> {
        self.issue_with_ttl(user_id, token_type, self.ttl(token_type))
    }

    /// Issues a token with an explicit lifetime
    pub fn issue_with_ttl(
        &self,
        user_id: Uuid,
        token_type: TokenType,
        ttl: Duration,
    ) -> Result<String, JwtError> {
        let claims = Claims::with_expiration(user_id, token_type, ttl);
        create_token(&claims, &self.secret)
    }

    /// Issues a password-reset token bound to the user's current hash
    pub fn issue_password_reset(
        &self,
        user_id: Uuid,
        password_hash: &str,
    ) -> Result<String, JwtError> {
        let claims = Claims::password_reset(user_id, password_hash, self.password_reset_ttl);
        create_token(&claims, &self.secret)
    }

    /// Issues a fresh access/refresh pair
    pub fn issue_pair(&self, user_id: Uuid) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            access_token: self.issue(user_id, TokenType::Access)?,
            refresh_token: self.issue(user_id, TokenType::Refresh)?,
        })
    }

    /// Verifies a token and checks that it has the expected type
    ///
    /// # Errors
    ///
    /// Returns an error if the signature is invalid, the token has expired,
    /// or its type differs from `expected`.
    pub fn verify(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = validate_token(token, &self.secret)?;

        if claims.token_type != expected {
            return Err(JwtError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }

        Ok(claims)
    }

    /// Verifies a password-reset token
    ///
    /// Returns the subject and the embedded fingerprint; the caller compares
    /// the fingerprint with the user's current password hash.
    pub fn verify_password_reset(&self, token: &str) -> Result<(Uuid, String), JwtError> {
        let claims = self.verify(token, TokenType::PasswordReset)?;
        let fingerprint = claims.pwh.ok_or(JwtError::MissingFingerprint)?;
        Ok((claims.sub, fingerprint))
    }
}
