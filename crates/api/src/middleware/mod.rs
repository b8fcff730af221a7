//! Session and permission middleware.
//!
//! - [`session::refresh_session`] -- resolves the SID cookie into a
//!   [`session::CurrentSession`] extension and re-emits the refreshed cookie.
//! - [`auth::AuthUser`] -- extracts the authenticated user from the session.
//! - [`auth::RequireAdmin`] / [`auth::RequireSuperAdmin`] -- minimum
//!   privilege gates.

pub mod auth;
pub mod session;
