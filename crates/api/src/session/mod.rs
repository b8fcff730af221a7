//! Session lifecycle: issuance, sliding refresh, teardown, and reaping.
//!
//! - [`manager::SessionManager`] -- store frontend used by middleware and handlers.
//! - [`reaper::SessionReaper`] -- background task evicting expired sessions.

pub mod manager;
pub mod reaper;

pub use manager::{CleanupOutcome, SessionHandle, SessionManager, SessionRemovedListener};
pub use reaper::SessionReaper;
