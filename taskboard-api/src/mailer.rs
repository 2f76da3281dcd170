/// Password-reset notification delivery
///
/// The API hands a freshly minted reset link to a [`Notifier`] and returns
/// immediately; delivery runs on a spawned task and its failure is only
/// logged. The response to a reset request is the same whether or not the
/// email was known and whether or not delivery succeeded.
///
/// # Implementations
///
/// - [`SmtpNotifier`]: plain-text mail through an SMTP relay (Mailpit in
///   development) via `lettre`
/// - [`LogNotifier`]: logs the link instead of sending it; selected when
///   `SMTP_HOST` is unset
///
/// # Example
///
/// ```no_run
/// use std::sync::Arc;
/// use taskboard_api::mailer::{dispatch_password_reset, LogNotifier, Notifier};
///
/// # async fn example() {
/// let notifier: Arc<dyn Notifier> = Arc::new(LogNotifier);
/// dispatch_password_reset(
///     notifier,
///     "alice@example.com".to_string(),
///     "http://localhost:5173/reset-password?token=eyJ...".to_string(),
/// );
/// # }
/// ```

use async_trait::async_trait;
use lettre::{
    message::header::ContentType, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
};
use std::sync::Arc;
use tracing::{error, info};

use crate::config::MailConfig;

/// Subject line of the reset email
pub const RESET_SUBJECT: &str = "Reset your Taskboard password";

/// Notification error types
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    /// Sender or recipient address could not be parsed
    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    /// Message could not be assembled
    #[error("Failed to build message: {0}")]
    Build(String),

    /// Relay rejected or could not be reached
    #[error("Failed to deliver message: {0}")]
    Transport(String),
}

/// Delivers password-reset links to users
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name for logs
    fn name(&self) -> &str;

    /// Sends a reset link to `to`
    async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<(), NotifyError>;
}

/// Builds the frontend link a user follows to choose a new password
pub fn reset_link(frontend_url: &str, token: &str) -> String {
    format!(
        "{}/reset-password?token={}",
        frontend_url.trim_end_matches('/'),
        token
    )
}

/// Body of the reset email
pub fn reset_body(reset_url: &str, ttl_minutes: i64) -> String {
    format!(
        "Follow the link below to reset your password (valid for {} minutes):\n\n{}\n\n\
         If you did not request a password reset, you can ignore this email.\n",
        ttl_minutes, reset_url
    )
}

/// Sends reset links through an SMTP relay
///
/// Connects without TLS or authentication, which suits a local relay such as
/// Mailpit.
pub struct SmtpNotifier {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: String,
    ttl_minutes: i64,
}

impl SmtpNotifier {
    /// Creates a notifier for the relay at `host:port`
    pub fn new(host: &str, port: u16, from: impl Into<String>, ttl_minutes: i64) -> Self {
        let transport = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host)
            .port(port)
            .timeout(Some(std::time::Duration::from_secs(10)))
            .build();

        Self {
            transport,
            from: from.into(),
            ttl_minutes,
        }
    }
}

#[async_trait]
impl Notifier for SmtpNotifier {
    fn name(&self) -> &str {
        "smtp"
    }

    async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<(), NotifyError> {
        let email = Message::builder()
            .from(
                format!("Taskboard <{}>", self.from)
                    .parse()
                    .map_err(|e| NotifyError::InvalidAddress(format!("from: {}", e)))?,
            )
            .to(to
                .parse()
                .map_err(|e| NotifyError::InvalidAddress(format!("to: {}", e)))?)
            .subject(RESET_SUBJECT)
            .header(ContentType::TEXT_PLAIN)
            .body(reset_body(reset_url, self.ttl_minutes))
            .map_err(|e| NotifyError::Build(e.to_string()))?;

        self.transport
            .send(email)
            .await
            .map_err(|e| NotifyError::Transport(e.to_string()))?;

        Ok(())
    }
}

/// Logs reset links instead of mailing them
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        "log"
    }

    async fn send_password_reset(&self, to: &str, reset_url: &str) -> Result<(), NotifyError> {
        info!(recipient = %to, reset_url = %reset_url, "Password reset link (SMTP disabled)");
        Ok(())
    }
}

/// Chooses the notifier for the given mail settings
pub fn notifier_from_config(mail: &MailConfig, ttl_minutes: i64) -> Arc<dyn Notifier> {
    match &mail.smtp_host {
        Some(host) => {
            info!(host = %host, port = mail.smtp_port, "Password reset mail via SMTP");
            Arc::new(SmtpNotifier::new(host, mail.smtp_port, mail.from.clone(), ttl_minutes))
        }
        None => {
            info!("SMTP_HOST not set, password reset links will be logged");
            Arc::new(LogNotifier)
        }
    }
}

/// Sends a reset link in the background
///
/// Returns immediately. Delivery errors are logged and never reach the
/// caller.
pub fn dispatch_password_reset(notifier: Arc<dyn Notifier>, to: String, reset_url: String) {
    tokio::spawn(async move {
        match notifier.send_password_reset(&to, &reset_url).await {
            Ok(()) => info!(notifier = notifier.name(), "Password reset notification sent"),
            Err(e) => error!(notifier = notifier.name(), error = %e, "Password reset notification failed"),
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reset_link() {
        assert_eq!(
            reset_link("http://localhost:5173/", "abc.def.ghi"),
            "http://localhost:5173/reset-password?token=abc.def.ghi"
        );
    }

    #[test]
    fn test_reset_body_mentions_link_and_lifetime() {
        let body = reset_body("http://x/reset-password?token=t", 60);
        assert!(body.contains("http://x/reset-password?token=t"));
        assert!(body.contains("60 minutes"));
    }

    #[test]
    fn test_notifier_selection() {
        let mut mail = crate::config::test_config("postgresql://localhost/test").mail;
        assert_eq!(notifier_from_config(&mail, 60).name(), "log");

        mail.smtp_host = Some("localhost".to_string());
        assert_eq!(notifier_from_config(&mail, 60).name(), "smtp");
    }

    #[tokio::test]
    async fn test_smtp_rejects_bad_recipient() {
        let notifier = SmtpNotifier::new("localhost", 1025, "noreply@taskboard.local", 60);
        let result = notifier.send_password_reset("not an address", "http://x").await;
        assert!(matches!(result, Err(NotifyError::InvalidAddress(_))));
    }

    #[tokio::test]
    async fn test_log_notifier_always_succeeds() {
        assert!(LogNotifier
            .send_password_reset("alice@example.com", "http://x")
            .await
            .is_ok());
    }
}
