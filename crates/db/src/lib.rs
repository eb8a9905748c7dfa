//! PostgreSQL persistence for the Feedo feedback core.
//!
//! - [`models`] — `FromRow` row structs and their validated conversion into
//!   the typed records from `feedo_core`.
//! - [`repositories`] — zero-sized repository structs with async methods
//!   taking `&PgPool` as the first argument.
//! - [`DbError`] — `sqlx` failures plus row-decode failures from the typed
//!   boundary.
//!
//! Every query that touches user data is owner-scoped with an explicit
//! `owner_id` predicate; there is no ambient row filtering.

pub mod error;
pub mod models;
pub mod repositories;

pub use error::DbError;

use sqlx::postgres::PgPoolOptions;

pub type DbPool = sqlx::PgPool;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(20)
        .connect(database_url)
        .await
}

/// Apply all pending migrations from the workspace `migrations/` directory.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../migrations").run(pool).await
}
