//! Input validation rules for account fields.
//!
//! Messages here are user-facing and returned verbatim by the API layer, so
//! changes are wire-visible.

use std::sync::LazyLock;

use regex::Regex;
use validator::ValidateEmail;

use crate::error::CoreError;

static USERNAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").expect("valid regex"));

/// Characters rejected outright in new passwords. These have leaked into
/// templated emails and logs unescaped before.
pub const PASSWORD_BLACKLIST: &[char] = &['<', '>', '"', '\'', '`', '\\'];

/// Usernames are non-empty and strictly alphanumeric.
pub fn validate_username(username: &str) -> Result<(), CoreError> {
    if username.is_empty() || !USERNAME_RE.is_match(username) {
        return Err(CoreError::Validation(
            "Username must be alphanumeric".to_string(),
        ));
    }
    Ok(())
}

/// Emails are non-empty and well-formed.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if email.is_empty() || !email.validate_email() {
        return Err(CoreError::Validation(
            "Please use a valid email address".to_string(),
        ));
    }
    Ok(())
}

/// Passwords need only be non-empty at login/creation time.
pub fn validate_password(password: &str) -> Result<(), CoreError> {
    if password.is_empty() {
        return Err(CoreError::Validation("Password cannot be empty".to_string()));
    }
    Ok(())
}

/// Replacement passwords additionally pass the character blacklist.
pub fn validate_new_password(password: &str) -> Result<(), CoreError> {
    validate_password(password)?;
    if password.chars().any(|c| PASSWORD_BLACKLIST.contains(&c)) {
        return Err(CoreError::Validation(
            "Your password contains illegal characters".to_string(),
        ));
    }
    Ok(())
}
