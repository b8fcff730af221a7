//! Request handlers.
//!
//! Each submodule provides async handler functions for one resource. Handlers
//! delegate to the managers and repositories and map errors via [`AppError`].
//!
//! [`AppError`]: crate::error::AppError

pub mod auth;
pub mod sessions;
pub mod storage;
pub mod users;
