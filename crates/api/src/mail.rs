//! Outbound account email via SMTP.
//!
//! [`Mailer`] wraps the `lettre` async SMTP transport to send the plain-text
//! activation and password-reset emails. Configuration is loaded from
//! environment variables; if `SMTP_HOST` is not set, [`MailConfig::from_env`]
//! returns `None` and the mailer runs in disabled mode where every send
//! succeeds silently (useful for tests and local development).

// ---------------------------------------------------------------------------
// Error
// ---------------------------------------------------------------------------

/// Error type for email delivery failures.
#[derive(Debug, thiserror::Error)]
pub enum MailError {
    /// SMTP transport-level failure (authentication, connection, etc.).
    #[error("SMTP transport error: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),

    /// The recipient or sender address could not be parsed.
    #[error("Email address parse error: {0}")]
    Address(#[from] lettre::address::AddressError),

    /// The MIME message could not be assembled.
    #[error("Email build error: {0}")]
    Build(String),
}

// ---------------------------------------------------------------------------
// MailConfig
// ---------------------------------------------------------------------------

/// Default SMTP port (STARTTLS).
const DEFAULT_SMTP_PORT: u16 = 587;

/// Default sender address when `SMTP_FROM` is not set.
const DEFAULT_FROM_ADDRESS: &str = "noreply@warden.local";

/// Configuration for the SMTP mailer.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port (defaults to 587).
    pub smtp_port: u16,
    /// RFC 5322 "From" address.
    pub from_address: String,
    /// Optional SMTP username.
    pub smtp_user: Option<String>,
    /// Optional SMTP password.
    pub smtp_password: Option<String>,
}

impl MailConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `SMTP_HOST` is not set, signalling that email
    /// delivery is not configured and the mailer should run disabled.
    ///
    /// | Variable        | Required | Default                 |
    /// |-----------------|----------|-------------------------|
    /// | `SMTP_HOST`     | yes      | --                      |
    /// | `SMTP_PORT`     | no       | `587`                   |
    /// | `SMTP_FROM`     | no       | `noreply@warden.local`  |
    /// | `SMTP_USER`     | no       | --                      |
    /// | `SMTP_PASSWORD` | no       | --                      |
    pub fn from_env() -> Option<Self> {
        let smtp_host = std::env::var("SMTP_HOST").ok()?;
        Some(Self {
            smtp_host,
            smtp_port: std::env::var("SMTP_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(DEFAULT_SMTP_PORT),
            from_address: std::env::var("SMTP_FROM")
                .unwrap_or_else(|_| DEFAULT_FROM_ADDRESS.to_string()),
            smtp_user: std::env::var("SMTP_USER").ok(),
            smtp_password: std::env::var("SMTP_PASSWORD").ok(),
        })
    }
}

// ---------------------------------------------------------------------------
// Mailer
// ---------------------------------------------------------------------------

/// Sends account lifecycle emails (activation, password reset) via SMTP.
pub struct Mailer {
    config: Option<MailConfig>,
}

impl Mailer {
    /// Create a mailer. `None` configuration selects disabled mode.
    pub fn new(config: Option<MailConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("SMTP_HOST not set, outbound email is disabled");
        }
        Self { config }
    }

    /// Whether a transport is configured.
    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Send a plain-text email. A no-op success in disabled mode.
    pub async fn send(&self, to: &str, subject: &str, body: &str) -> Result<(), MailError> {
        use lettre::{
            message::header::ContentType, transport::smtp::authentication::Credentials,
            AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor,
        };

        let Some(config) = &self.config else {
            tracing::debug!(to, subject, "Email delivery disabled, dropping message");
            return Ok(());
        };

        let email = Message::builder()
            .from(config.from_address.parse()?)
            .to(to.parse()?)
            .subject(subject)
            .header(ContentType::TEXT_PLAIN)
            .body(body.to_string())
            .map_err(|e| MailError::Build(e.to_string()))?;

        let mut transport_builder =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
                .port(config.smtp_port);

        if let (Some(user), Some(pass)) = (&config.smtp_user, &config.smtp_password) {
            transport_builder =
                transport_builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }

        let mailer = transport_builder.build();
        mailer.send(email).await?;

        tracing::info!(to, subject, "Account email sent");
        Ok(())
    }

    /// Send the activation email with the link embedding key + username.
    pub async fn send_activation(
        &self,
        to: &str,
        username: &str,
        key: &str,
        origin: &str,
    ) -> Result<(), MailError> {
        let body = format!(
            "Hello {username},\n\n\
             Thank you for registering. Please activate your account by \
             visiting the link below:\n\n\
             {origin}/activate?username={username}&key={key}\n\n\
             If you did not create this account, you can ignore this email.\n"
        );
        self.send(to, "Activate your account", &body).await
    }

    /// Send the password-reset email with the single-use reset link.
    pub async fn send_password_reset(
        &self,
        to: &str,
        username: &str,
        key: &str,
        origin: &str,
    ) -> Result<(), MailError> {
        let body = format!(
            "Hello {username},\n\n\
             A password reset was requested for your account. Use the link \
             below to choose a new password:\n\n\
             {origin}/reset-password?username={username}&key={key}\n\n\
             If you did not request this, you can ignore this email and your \
             password will remain unchanged.\n"
        );
        self.send(to, "Reset your password", &body).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_smtp_host() {
        // Ensure SMTP_HOST is not set in the test environment.
        std::env::remove_var("SMTP_HOST");
        assert!(MailConfig::from_env().is_none());
    }

    #[tokio::test]
    async fn disabled_mailer_send_succeeds() {
        let mailer = Mailer::new(None);
        assert!(!mailer.is_enabled());
        mailer
            .send("someone@example.com", "subject", "body")
            .await
            .expect("disabled mailer must always succeed");
    }
}
