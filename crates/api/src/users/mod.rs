//! Account lifecycle orchestration.
//!
//! - [`manager::UserManager`] -- registration, login, activation, password
//!   reset, removal, and the privilege/self-match permission check.

pub mod manager;

pub use manager::{ensure_permission, LoginOutcome, RegisterInput, UserManager};
