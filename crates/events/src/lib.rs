//! Event bus for the account and session service.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`AuthEvent`] -- the canonical event envelope for account activity
//!   (logins, logouts, activation, removal, storage operations).
//!
//! Publishing is fire-and-forget from the caller's point of view, but it is
//! synchronous: for login/logout the event is on the bus before the HTTP
//! response is finalized.

pub mod bus;

pub use bus::{AuthEvent, EventBus};
