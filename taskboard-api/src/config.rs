/// Configuration management for the API server
///
/// This module loads configuration from environment variables (and a `.env`
/// file when present) into an immutable [`Config`] that is built once at
/// startup and shared through the application state.
///
/// # Environment Variables
///
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated allowed origins, `*` for any (default: http://localhost:5173)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `JWT_SECRET`: Secret key for token signing, at least 32 characters (required)
/// - `ACCESS_TOKEN_EXPIRE_MINUTES`: Access token lifetime (default: 30)
/// - `REFRESH_TOKEN_EXPIRE_DAYS`: Refresh token lifetime (default: 7)
/// - `PASSWORD_RESET_TOKEN_EXPIRE_MINUTES`: Reset token lifetime (default: 60)
/// - `COOKIE_SECURE`: Adds `Secure` to the refresh cookie (default: false)
/// - `SMTP_HOST`: Mail relay; unset means reset links are only logged
/// - `SMTP_PORT`: Mail relay port (default: 1025)
/// - `SMTP_FROM`: Sender address (default: noreply@taskboard.local)
/// - `FRONTEND_URL`: Base URL for reset links (default: http://localhost:5173)
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use taskboard_shared::auth::jwt::TokenService;

/// Minimum accepted length of `JWT_SECRET`
pub const MIN_JWT_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Token configuration
    pub jwt: JwtConfig,

    /// Refresh cookie configuration
    pub cookie: CookieConfig,

    /// Outbound mail configuration
    pub mail: MailConfig,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any origin without credentials)
    pub cors_origins: Vec<String>,

    /// Production mode (adds HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// Token configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    /// Secret key for token signing
    ///
    /// Generate with: `openssl rand -hex 32`
    #[serde(skip_serializing)]
    pub secret: String,

    /// Access token lifetime in minutes
    pub access_token_expire_minutes: i64,

    /// Refresh token lifetime in days
    pub refresh_token_expire_days: i64,

    /// Password reset token lifetime in minutes
    pub password_reset_token_expire_minutes: i64,
}

/// Refresh cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CookieConfig {
    /// Whether the cookie carries the `Secure` attribute
    pub secure: bool,
}

/// Outbound mail configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    /// SMTP relay host; `None` selects the logging notifier
    pub smtp_host: Option<String>,

    /// SMTP relay port
    pub smtp_port: u16,

    /// Sender address
    pub from: String,

    /// Frontend base URL used to build reset links
    pub frontend_url: String,
}

impl JwtConfig {
    /// Builds the token service for these settings
    pub fn token_service(&self) -> TokenService {
        TokenService::new(
            self.secret.clone(),
            Duration::minutes(self.access_token_expire_minutes),
            Duration::days(self.refresh_token_expire_days),
            Duration::minutes(self.password_reset_token_expire_minutes),
        )
    }
}

impl Config {
    /// Loads configuration from environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `DATABASE_URL` or `JWT_SECRET` is missing
    /// - `JWT_SECRET` is shorter than 32 characters
    /// - A numeric or boolean variable cannot be parsed
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;

        if jwt_secret.len() < MIN_JWT_SECRET_LEN {
            anyhow::bail!(
                "JWT_SECRET must be at least {} characters long",
                MIN_JWT_SECRET_LEN
            );
        }

        let cors_origins = parse_origins(
            &env::var("CORS_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string()),
        );

        Ok(Self {
            api: ApiConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: env_or("API_PORT", 8080)?,
                cors_origins,
                production: env_flag("PRODUCTION")?,
            },
            database: DatabaseConfig {
                url: database_url,
                max_connections: env_or("DATABASE_MAX_CONNECTIONS", 10)?,
            },
            jwt: JwtConfig {
                secret: jwt_secret,
                access_token_expire_minutes: env_or("ACCESS_TOKEN_EXPIRE_MINUTES", 30)?,
                refresh_token_expire_days: env_or("REFRESH_TOKEN_EXPIRE_DAYS", 7)?,
                password_reset_token_expire_minutes: env_or(
                    "PASSWORD_RESET_TOKEN_EXPIRE_MINUTES",
                    60,
                )?,
            },
            cookie: CookieConfig {
                secure: env_flag("COOKIE_SECURE")?,
            },
            mail: MailConfig {
                smtp_host: env::var("SMTP_HOST").ok().filter(|h| !h.trim().is_empty()),
                smtp_port: env_or("SMTP_PORT", 1025)?,
                from: env::var("SMTP_FROM")
                    .unwrap_or_else(|_| "noreply@taskboard.local".to_string()),
                frontend_url: env::var("FRONTEND_URL")
                    .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

/// Reads and parses a variable, falling back to `default` when unset
fn env_or<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{} has an invalid value: {:?}", key, raw)),
        Err(_) => Ok(default),
    }
}

/// Reads a boolean flag; accepts true/false, 1/0, yes/no
fn env_flag(key: &str) -> anyhow::Result<bool> {
    match env::var(key) {
        Ok(raw) => parse_flag(&raw)
            .with_context(|| format!("{} must be a boolean, got {:?}", key, raw)),
        Err(_) => Ok(false),
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" | "" => Some(false),
        _ => None,
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|origin| origin.trim().trim_end_matches('/').to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}

#[cfg(test)]
pub(crate) fn test_config(database_url: &str) -> Config {
    Config {
        api: ApiConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            cors_origins: vec!["http://localhost:5173".to_string()],
            production: false,
        },
        database: DatabaseConfig {
            url: database_url.to_string(),
            max_connections: 5,
        },
        jwt: JwtConfig {
            secret: "test-secret-key-at-least-32-bytes-long".to_string(),
            access_token_expire_minutes: 30,
            refresh_token_expire_days: 7,
            password_reset_token_expire_minutes: 60,
        },
        cookie: CookieConfig { secure: false },
        mail: MailConfig {
            smtp_host: None,
            smtp_port: 1025,
            from: "noreply@taskboard.local".to_string(),
            frontend_url: "http://localhost:5173".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = test_config("postgresql://localhost/test");
        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }

    #[test]
    fn test_parse_origins() {
        assert_eq!(
            parse_origins("http://a.test, http://b.test/ ,"),
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(parse_origins("*"), vec!["*".to_string()]);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("true"), Some(true));
        assert_eq!(parse_flag(" YES "), Some(true));
        assert_eq!(parse_flag("0"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_token_service_uses_configured_lifetimes() {
        let mut config = test_config("postgresql://localhost/test");
        config.jwt.access_token_expire_minutes = 5;

        let tokens = config.jwt.token_service();
        assert_eq!(
            tokens.ttl(taskboard_shared::auth::jwt::TokenType::Access),
            Duration::minutes(5)
        );
    }

    #[test]
    fn test_secret_is_not_serialized() {
        let config = test_config("postgresql://localhost/test");
        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("test-secret-key"));
    }
}
