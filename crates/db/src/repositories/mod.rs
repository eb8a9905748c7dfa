//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument and return typed domain records.

pub mod feedback_repo;
pub mod stats_repo;
pub mod template_repo;

pub use feedback_repo::FeedbackRepo;
pub use stats_repo::StatsRepo;
pub use template_repo::TemplateRepo;
