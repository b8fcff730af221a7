//! Pure domain logic for the account and session service.
//!
//! This crate has no I/O: token generation, cookie construction, privilege
//! ordering, validation rules, and the metadata path helpers all live here so
//! they can be unit tested without a database and reused by the repository
//! and API layers.

pub mod cookie;
pub mod error;
pub mod meta;
pub mod privilege;
pub mod quota;
pub mod search;
pub mod tokens;
pub mod types;
pub mod validation;
