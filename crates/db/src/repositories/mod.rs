//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. No business rules live
//! here; orchestration and authorization stay in the API layer.

pub mod bucket_repo;
pub mod file_repo;
pub mod session_repo;
pub mod stats_repo;
pub mod user_repo;

pub use bucket_repo::BucketRepo;
pub use file_repo::FileRepo;
pub use session_repo::SessionRepo;
pub use stats_repo::StatsRepo;
pub use user_repo::UserRepo;
