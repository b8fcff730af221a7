//! Storage quota enforcement.
//!
//! - [`gate::QuotaGate`] -- per-user counter checks gating bucket/file writes.

pub mod gate;

pub use gate::QuotaGate;
