/// Authentication utilities
///
/// This module provides the authentication primitives for Taskboard:
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and hash fingerprints
/// - [`jwt`]: Typed token issuance and verification (access, refresh, password reset)
/// - [`middleware`]: Bearer-token authentication for protected routes
/// - [`session`]: Signup, login, refresh and password-reset flows
///
/// # Security Features
///
/// - **Password Hashing**: Argon2id with 19 MiB memory, 2 iterations
/// - **Typed Tokens**: every token carries a `token_type` claim and is only
///   accepted where that type is expected
/// - **Single-use Reset Tokens**: reset tokens embed a fingerprint of the
///   password hash and stop matching once the password changes
///
/// # Example
///
/// ```
/// use taskboard_shared::auth::password::{hash_password, verify_password};
/// use taskboard_shared::auth::jwt::{TokenService, TokenType};
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let hash = hash_password("user_password")?;
/// assert!(verify_password("user_password", &hash)?);
///
/// let tokens = TokenService::with_defaults("secret-key-that-is-at-least-32-bytes");
/// let access = tokens.issue(Uuid::new_v4(), TokenType::Access)?;
/// assert!(tokens.verify(&access, TokenType::Refresh).is_err());
/// # Ok(())
/// # }
/// # example().unwrap();
/// ```

pub mod jwt;
pub mod middleware;
pub mod password;
pub mod session;
