//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` entity struct matching the database row
//! - A create DTO for inserts
//! - Response structs safe for external serialization

pub mod bucket;
pub mod file;
pub mod session;
pub mod stats;
pub mod user;
