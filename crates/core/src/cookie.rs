//! SID cookie construction and parsing.
//!
//! Building a `Set-Cookie` directive is pure string assembly given a session
//! id, an expiration and the cookie options; nothing here touches the store.
//! Wire format:
//!
//! ```text
//! Set-Cookie: SID=<token>[; path=<p>][; domain=<d>][; expires=<RFC1123 GMT>][; secure]
//! ```

use crate::types::Timestamp;

/// Cookie attribute name carrying the session identifier.
pub const SESSION_COOKIE: &str = "SID";

/// Expiration placed on tombstone cookies so clients drop them immediately.
const EPOCH_EXPIRES: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Client-facing cookie attributes, fixed per deployment.
#[derive(Debug, Clone, Default)]
pub struct CookieOptions {
    /// `path` attribute; omitted when `None`.
    pub path: Option<String>,
    /// `domain` attribute; omitted when `None`.
    pub domain: Option<String>,
    /// Persistent cookies carry an `expires` attribute; session cookies
    /// (browser-lifetime) omit it.
    pub persistent: bool,
    /// Adds the `secure` flag (HTTPS-only transport).
    pub secure: bool,
}

/// Build the `Set-Cookie` value for a live session.
pub fn build_set_cookie(
    session_id: &str,
    expires_at: Timestamp,
    options: &CookieOptions,
) -> String {
    let mut cookie = format!("{SESSION_COOKIE}={session_id}");
    append_scope(&mut cookie, options);
    if options.persistent {
        cookie.push_str("; expires=");
        cookie.push_str(&format_expires(expires_at));
    }
    if options.secure {
        cookie.push_str("; secure");
    }
    cookie
}

/// Build an already-expired `Set-Cookie` value that forces the client to
/// drop its session cookie. Emitted on every logout, even when the store
/// deletion failed, so the client-visible outcome is always "logged out".
pub fn build_tombstone(options: &CookieOptions) -> String {
    let mut cookie = format!("{SESSION_COOKIE}=");
    append_scope(&mut cookie, options);
    cookie.push_str("; expires=");
    cookie.push_str(EPOCH_EXPIRES);
    if options.secure {
        cookie.push_str("; secure");
    }
    cookie
}

fn append_scope(cookie: &mut String, options: &CookieOptions) {
    if let Some(path) = &options.path {
        cookie.push_str("; path=");
        cookie.push_str(path);
    }
    if let Some(domain) = &options.domain {
        cookie.push_str("; domain=");
        cookie.push_str(domain);
    }
}

/// RFC-1123-style GMT date used by the `expires` attribute.
fn format_expires(expires_at: Timestamp) -> String {
    expires_at.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Extract the session id from a `Cookie` header value.
///
/// Locates a `SID=` attribute terminated by `;`, `,` or space. Returns
/// `None` for anonymous requests (no header, no attribute, or an empty
/// value).
pub fn extract_session_id(cookie_header: &str) -> Option<&str> {
    for part in cookie_header.split([';', ',']) {
        if let Some(value) = part.trim().strip_prefix("SID=") {
            let value = value.split(' ').next().unwrap_or("");
            if !value.is_empty() {
                return Some(value);
            }
        }
    }
    None
}
