//! Account lifecycle orchestration.
//!
//! [`UserManager`] owns every account workflow: registration (validation →
//! duplicate check → captcha → persist → activation email), login (credential
//! check → session issuance → event emission), logout, activation, password
//! reset, and removal. It registers itself as the session-removal observer so
//! that passive expiry in the reaper surfaces as the same logout event an
//! explicit logout produces.

use std::sync::Arc;

use warden_core::error::CoreError;
use warden_core::privilege::Privilege;
use warden_core::tokens::{generate_key, DEFAULT_KEY_LENGTH};
use warden_core::validation::{
    validate_email, validate_new_password, validate_password, validate_username,
};
use warden_db::models::user::{CreateUser, User};
use warden_db::repositories::{SessionRepo, StatsRepo, UserRepo};
use warden_db::DbPool;
use warden_events::bus::types;
use warden_events::{AuthEvent, EventBus};

use crate::auth::password::{hash_password, verify_password};
use crate::captcha::CaptchaVerifier;
use crate::config::AdminConfig;
use crate::error::{AppError, AppResult};
use crate::mail::Mailer;
use crate::session::{SessionManager, SessionRemovedListener};
use crate::storage::QuotaGate;

/// Length of the generated bootstrap admin password when `ADMIN_PASSWORD`
/// is not configured.
const GENERATED_ADMIN_PASSWORD_LENGTH: usize = 24;

// ---------------------------------------------------------------------------
// Inputs / outcomes
// ---------------------------------------------------------------------------

/// Self-service registration input.
#[derive(Debug)]
pub struct RegisterInput {
    pub username: String,
    pub password: String,
    pub email: String,
    pub captcha_challenge: Option<String>,
    pub captcha_answer: Option<String>,
    pub meta: serde_json::Value,
}

/// A successful login: the user plus the `Set-Cookie` directives to emit,
/// in order. The first entry is always the tombstone clearing whatever
/// session the request carried; a fresh session cookie follows when
/// `remember_me` was requested.
#[derive(Debug)]
pub struct LoginOutcome {
    pub user: User,
    pub cookies: Vec<String>,
}

// ---------------------------------------------------------------------------
// UserManager
// ---------------------------------------------------------------------------

/// Orchestrates account workflows over the repositories and collaborators.
pub struct UserManager {
    pool: DbPool,
    sessions: Arc<SessionManager>,
    mailer: Arc<Mailer>,
    captcha: Arc<CaptchaVerifier>,
    gate: Arc<QuotaGate>,
    event_bus: Arc<EventBus>,
}

impl UserManager {
    /// Wire the manager and register it as the session-removal observer so
    /// every removed session (explicit or reaped) unbinds its user row and
    /// publishes a logout event.
    pub fn new(
        pool: DbPool,
        sessions: Arc<SessionManager>,
        mailer: Arc<Mailer>,
        captcha: Arc<CaptchaVerifier>,
        gate: Arc<QuotaGate>,
        event_bus: Arc<EventBus>,
    ) -> Arc<Self> {
        let manager = Arc::new(Self {
            pool,
            sessions: sessions.clone(),
            mailer,
            captcha,
            gate,
            event_bus,
        });
        sessions.register_removal_listener(manager.clone());
        manager
    }

    // -----------------------------------------------------------------------
    // Bootstrap
    // -----------------------------------------------------------------------

    /// Ensure exactly one SuperAdmin exists, creating the bootstrap account
    /// from configuration when none does.
    ///
    /// When `ADMIN_PASSWORD` is unset a random password is generated and
    /// logged once at WARN so the operator can capture it.
    pub async fn bootstrap_super_admin(&self, config: &AdminConfig) -> AppResult<()> {
        if UserRepo::count_super_admins(&self.pool).await? > 0 {
            return Ok(());
        }

        let password = match &config.password {
            Some(password) => password.clone(),
            None => {
                let generated = generate_key(GENERATED_ADMIN_PASSWORD_LENGTH);
                tracing::warn!(
                    username = %config.username,
                    password = %generated,
                    "ADMIN_PASSWORD not set, generated a bootstrap admin password"
                );
                generated
            }
        };

        let user = self
            .create_user(
                &config.username,
                &config.email,
                &password,
                "",
                Privilege::SuperAdmin,
                serde_json::json!({}),
                true,
            )
            .await?;
        tracing::info!(username = %user.username, "Bootstrap super admin created");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Registration & creation
    // -----------------------------------------------------------------------

    /// Self-service registration: duplicate check, basic field validation,
    /// captcha, then delegate to [`UserManager::create_user`] with Regular
    /// privilege.
    pub async fn register(
        &self,
        input: RegisterInput,
        remote_ip: &str,
        origin: &str,
    ) -> AppResult<User> {
        // 1. Reject if a user already exists matching username OR email.
        if UserRepo::find_conflicting(&self.pool, &input.username, &input.email)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(
                "That username or email is already in use; please choose another".to_string(),
            )
            .into());
        }

        // 2. Reject empty password / bad email before the captcha round-trip.
        validate_password(&input.password)?;
        validate_email(&input.email)?;

        // 3. Captcha, only when a verifier is configured.
        if self.captcha.is_enabled() {
            let (Some(challenge), Some(answer)) =
                (&input.captcha_challenge, &input.captcha_answer)
            else {
                return Err(
                    CoreError::Validation("Captcha cannot be null or empty".to_string()).into(),
                );
            };
            if challenge.is_empty() || answer.is_empty() {
                return Err(
                    CoreError::Validation("Captcha cannot be null or empty".to_string()).into(),
                );
            }

            let valid = self
                .captcha
                .verify(remote_ip, challenge, answer)
                .await
                .map_err(|e| AppError::InternalError(format!("Captcha service error: {e}")))?;
            if !valid {
                return Err(CoreError::Validation(
                    "The captcha response was not valid".to_string(),
                )
                .into());
            }
        }

        // 4. Create as a Regular user; never a super user through this path.
        self.create_user(
            &input.username,
            &input.email,
            &input.password,
            origin,
            Privilege::Regular,
            input.meta,
            false,
        )
        .await
    }

    /// Create a user at an explicit privilege level.
    ///
    /// SuperAdmin creation requires `allow_admin` (the bootstrap path);
    /// everyone else receives a fresh registration key and an activation
    /// email. The row is inserted before the email is attempted, so a mail
    /// failure leaves an unconfirmed-but-persisted user behind.
    #[allow(clippy::too_many_arguments)]
    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password: &str,
        origin: &str,
        privilege: Privilege,
        meta: serde_json::Value,
        allow_admin: bool,
    ) -> AppResult<User> {
        validate_username(username)?;
        validate_email(email)?;
        validate_password(password)?;

        if privilege == Privilege::SuperAdmin && !allow_admin {
            return Err(
                CoreError::Forbidden("You cannot create a super user".to_string()).into(),
            );
        }

        let password_hash = hash_password(password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

        if UserRepo::find_conflicting(&self.pool, username, email)
            .await?
            .is_some()
        {
            return Err(CoreError::Conflict(
                "That username or email is already in use; please choose another".to_string(),
            )
            .into());
        }

        // Bootstrap super admins are active immediately; everyone else must
        // follow the emailed activation link.
        let registration_key = if privilege == Privilege::SuperAdmin {
            String::new()
        } else {
            generate_key(DEFAULT_KEY_LENGTH)
        };

        let user = UserRepo::create(
            &self.pool,
            &CreateUser {
                username: username.to_string(),
                email: email.to_string(),
                password_hash,
                privilege,
                registration_key,
                meta,
            },
        )
        .await?;

        StatsRepo::create(&self.pool, &user.username).await?;

        if !user.registration_key.is_empty() {
            self.mailer
                .send_activation(&user.email, &user.username, &user.registration_key, origin)
                .await
                .map_err(|e| AppError::InternalError(format!("Email delivery error: {e}")))?;
        }

        tracing::info!(username = %user.username, privilege = %user.privilege, "User created");
        Ok(user)
    }

    // -----------------------------------------------------------------------
    // Login / logout
    // -----------------------------------------------------------------------

    /// Authenticate and (optionally) open a session.
    ///
    /// Any session the request carried is cleared first, so a remember-me
    /// login leaves exactly one session bound to the user.
    pub async fn log_in(
        &self,
        identity: &str,
        password: &str,
        remember_me: bool,
        cookie_header: Option<&str>,
    ) -> AppResult<LoginOutcome> {
        // 1. Log out whatever session this request carried (idempotent).
        let tombstone = self.log_out(cookie_header).await?;
        let mut cookies = vec![tombstone];

        // 2. Username-or-email lookup; a miss gets the same generic error as
        //    a bad password so the response never reveals which was wrong.
        let Some(user) = UserRepo::find_by_identity(&self.pool, identity).await? else {
            return Err(incorrect_credentials());
        };

        // 3. Activation gate, checked before the password on purpose.
        if !user.is_activated() {
            return Err(CoreError::Unauthorized(
                "Please authorise your account. Check your email for the activation link"
                    .to_string(),
            )
            .into());
        }

        // 4. Constant-cost hash verification.
        let password_valid = verify_password(password, &user.password_hash)
            .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
        if !password_valid {
            return Err(incorrect_credentials());
        }

        // 5. Record the login.
        UserRepo::touch_last_logged_in(&self.pool, user.id).await?;

        // 6. Without remember-me the caller stays cookie-less.
        if !remember_me {
            return Ok(LoginOutcome { user, cookies });
        }

        // 7. Open the session, bind it, and publish before returning.
        let handle = self.sessions.create_session(serde_json::json!({})).await?;
        UserRepo::bind_session(&self.pool, user.id, &handle.session.session_id).await?;
        self.event_bus.publish(
            AuthEvent::new(types::USER_LOGIN)
                .with_username(&user.username)
                .with_session(&handle.session.session_id),
        );
        cookies.push(handle.set_cookie);

        tracing::info!(username = %user.username, "User logged in");
        Ok(LoginOutcome { user, cookies })
    }

    /// Clear the session carried by the request, if any.
    ///
    /// Always returns the tombstone directive; emitting it even when nothing
    /// was stored keeps the client-visible outcome "logged out" and makes the
    /// operation idempotent. The logout event is published by the removal
    /// observer while the session is cleared, before this returns.
    pub async fn log_out(&self, cookie_header: Option<&str>) -> AppResult<String> {
        self.sessions.clear_session(None, cookie_header).await?;
        Ok(self.sessions.tombstone())
    }

    // -----------------------------------------------------------------------
    // Activation
    // -----------------------------------------------------------------------

    /// Clear the registration key when `code` matches it.
    ///
    /// An already-activated account succeeds trivially. A mismatching code is
    /// an explicit error with no state change.
    pub async fn check_activation(&self, username: &str, code: &str) -> AppResult<()> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| CoreError::not_found("User", username))?;

        if user.is_activated() {
            return Ok(());
        }

        if !UserRepo::activate(&self.pool, username, code).await? {
            return Err(CoreError::Validation(
                "The activation key is not valid. Please try resend the activation email"
                    .to_string(),
            )
            .into());
        }

        self.event_bus
            .publish(AuthEvent::new(types::USER_ACTIVATED).with_username(username));
        tracing::info!(username, "Account activated");
        Ok(())
    }

    /// Admin approval: clear the registration key regardless of its value.
    pub async fn approve_activation(&self, username: &str) -> AppResult<()> {
        if !UserRepo::force_activate(&self.pool, username).await? {
            return Err(CoreError::not_found("User", username).into());
        }
        self.event_bus
            .publish(AuthEvent::new(types::USER_ACTIVATED).with_username(username));
        tracing::info!(username, "Account activation approved");
        Ok(())
    }

    /// Replace the registration key and send a fresh activation link.
    ///
    /// A no-op for accounts that are already active.
    pub async fn resend_activation(&self, username: &str, origin: &str) -> AppResult<()> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| CoreError::not_found("User", username))?;

        if user.is_activated() {
            return Ok(());
        }

        let key = generate_key(DEFAULT_KEY_LENGTH);
        UserRepo::set_registration_key(&self.pool, &user.username, &key).await?;
        self.mailer
            .send_activation(&user.email, &user.username, &key, origin)
            .await
            .map_err(|e| AppError::InternalError(format!("Email delivery error: {e}")))?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Password reset
    // -----------------------------------------------------------------------

    /// Generate and persist a reset tag, then email the reset link.
    pub async fn request_password_reset(&self, username: &str, origin: &str) -> AppResult<()> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| CoreError::not_found("User", username))?;

        let tag = generate_key(DEFAULT_KEY_LENGTH);
        UserRepo::set_reset_tag(&self.pool, &user.username, &tag).await?;
        self.mailer
            .send_password_reset(&user.email, &user.username, &tag, origin)
            .await
            .map_err(|e| AppError::InternalError(format!("Email delivery error: {e}")))?;
        Ok(())
    }

    /// Consume a pending reset tag, replacing the password when `code`
    /// matches. Hash replacement and tag clearing are one statement.
    pub async fn reset_password(
        &self,
        username: &str,
        code: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| CoreError::not_found("User", username))?;

        if user.password_reset_tag.is_empty() {
            return Err(CoreError::Validation(
                "No reset password request has been made for this user".to_string(),
            )
            .into());
        }

        validate_new_password(new_password)?;

        let password_hash = hash_password(new_password)
            .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

        if !UserRepo::consume_reset_tag(&self.pool, &user.username, code, &password_hash).await? {
            return Err(CoreError::Validation(
                "The reset password key is not valid".to_string(),
            )
            .into());
        }

        tracing::info!(username, "Password reset");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Removal
    // -----------------------------------------------------------------------

    /// Remove an account and everything attributed to it.
    ///
    /// Storage state goes first (buckets, files, counters), then the bound
    /// session row, then the user. Session teardown here bypasses the removal
    /// observer: the account is disappearing, so no logout event is owed.
    pub async fn remove_user(&self, username: &str) -> AppResult<()> {
        let user = UserRepo::find_by_username(&self.pool, username)
            .await?
            .ok_or_else(|| CoreError::not_found("User", username))?;

        if user.privilege == Privilege::SuperAdmin {
            return Err(
                CoreError::Forbidden("You cannot remove a super user".to_string()).into(),
            );
        }

        self.gate.remove_all_for_user(&user.username).await?;

        if !user.session_id.is_empty() {
            SessionRepo::delete(&self.pool, &user.session_id).await?;
        }

        UserRepo::delete(&self.pool, &user.username).await?;
        self.event_bus
            .publish(AuthEvent::new(types::USER_REMOVED).with_username(&user.username));
        tracing::info!(username, "User removed");
        Ok(())
    }
}

#[async_trait::async_trait]
impl SessionRemovedListener for UserManager {
    /// Unbind whichever user held the removed session and surface the
    /// removal as a logout event. Runs for explicit logouts and for
    /// reaper evictions alike.
    async fn on_session_removed(&self, session_id: &str) {
        match UserRepo::clear_session_binding(&self.pool, session_id).await {
            Ok(Some(username)) => {
                self.event_bus.publish(
                    AuthEvent::new(types::USER_LOGOUT)
                        .with_username(&username)
                        .with_session(session_id),
                );
                tracing::info!(username = %username, "User logged out");
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!(error = %e, session_id, "Failed to unbind removed session");
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Permission check
// ---------------------------------------------------------------------------

/// Allow iff the caller's privilege grants `level`, or `target` names the
/// caller (username or email, exact match). Self-access bypasses the level
/// check entirely.
pub fn ensure_permission(
    caller: &User,
    level: Privilege,
    target: Option<&str>,
) -> Result<(), CoreError> {
    if let Some(target) = target {
        if caller.matches_identity(target) {
            return Ok(());
        }
    }
    if caller.privilege.grants(level) {
        return Ok(());
    }
    Err(CoreError::Forbidden(
        "You do not have permission to make this request".to_string(),
    ))
}

fn incorrect_credentials() -> AppError {
    CoreError::Unauthorized("The username or password is incorrect".to_string()).into()
}
