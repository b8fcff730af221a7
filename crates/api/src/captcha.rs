//! Captcha verification against a third-party service.
//!
//! [`CaptchaVerifier`] posts the caller-supplied challenge/answer pair to the
//! external verify endpoint. The service replies in plain text with `true` on
//! the first line for a valid answer. If `CAPTCHA_PRIVATE_KEY` is not set the
//! verifier runs disabled and every answer is accepted, which keeps local
//! development and tests free of network calls.

/// Default verify endpoint, overridable for self-hosted verifiers and tests.
const DEFAULT_VERIFY_URL: &str = "http://www.google.com/recaptcha/api/verify";

// ---------------------------------------------------------------------------
// CaptchaConfig
// ---------------------------------------------------------------------------

/// Configuration for the captcha verification call.
#[derive(Debug, Clone)]
pub struct CaptchaConfig {
    /// Shared secret identifying this deployment to the verifier.
    pub private_key: String,
    /// Verify endpoint URL.
    pub verify_url: String,
}

impl CaptchaConfig {
    /// Load configuration from environment variables.
    ///
    /// Returns `None` if `CAPTCHA_PRIVATE_KEY` is not set, signalling that
    /// captcha verification is disabled.
    ///
    /// | Variable              | Required | Default                                        |
    /// |-----------------------|----------|------------------------------------------------|
    /// | `CAPTCHA_PRIVATE_KEY` | yes      | --                                             |
    /// | `CAPTCHA_VERIFY_URL`  | no       | `http://www.google.com/recaptcha/api/verify`   |
    pub fn from_env() -> Option<Self> {
        let private_key = std::env::var("CAPTCHA_PRIVATE_KEY").ok()?;
        Some(Self {
            private_key,
            verify_url: std::env::var("CAPTCHA_VERIFY_URL")
                .unwrap_or_else(|_| DEFAULT_VERIFY_URL.to_string()),
        })
    }
}

// ---------------------------------------------------------------------------
// CaptchaVerifier
// ---------------------------------------------------------------------------

/// Verifies captcha answers during registration.
pub struct CaptchaVerifier {
    config: Option<CaptchaConfig>,
    client: reqwest::Client,
}

impl CaptchaVerifier {
    /// Create a verifier. `None` configuration selects disabled mode.
    pub fn new(config: Option<CaptchaConfig>) -> Self {
        if config.is_none() {
            tracing::warn!("CAPTCHA_PRIVATE_KEY not set, captcha verification is disabled");
        }
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Whether a verify endpoint is configured.
    pub fn is_enabled(&self) -> bool {
        self.config.is_some()
    }

    /// Check a challenge/answer pair against the external verifier.
    ///
    /// Returns `Ok(true)` when the answer is valid. Always `Ok(true)` in
    /// disabled mode. Transport failures propagate so the caller can reject
    /// the surrounding operation rather than let an unverified registration
    /// through.
    pub async fn verify(
        &self,
        remote_ip: &str,
        challenge: &str,
        response: &str,
    ) -> Result<bool, reqwest::Error> {
        let Some(config) = &self.config else {
            return Ok(true);
        };

        let params = [
            ("privatekey", config.private_key.as_str()),
            ("remoteip", remote_ip),
            ("challenge", challenge),
            ("response", response),
        ];

        let body = self
            .client
            .post(&config.verify_url)
            .form(&params)
            .send()
            .await?
            .text()
            .await?;

        // The verifier answers in plain text, first line "true" or "false".
        let valid = body.lines().next() == Some("true");
        if !valid {
            tracing::debug!(reply = %body, "Captcha verification rejected");
        }
        Ok(valid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_env_returns_none_without_private_key() {
        std::env::remove_var("CAPTCHA_PRIVATE_KEY");
        assert!(CaptchaConfig::from_env().is_none());
    }

    #[tokio::test]
    async fn disabled_verifier_accepts_everything() {
        let verifier = CaptchaVerifier::new(None);
        assert!(!verifier.is_enabled());
        let valid = verifier
            .verify("127.0.0.1", "challenge", "answer")
            .await
            .expect("disabled verifier must not error");
        assert!(valid);
    }
}
