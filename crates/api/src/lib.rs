//! Warden API server library.
//!
//! Exposes the building blocks (config, state, error handling, session
//! machinery, routes) so integration tests and the binary entrypoint can
//! both access them.

pub mod auth;
pub mod captcha;
pub mod config;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod users;
