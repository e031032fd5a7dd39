//! WordPress store access.
//!
//! Read-mostly collaborator: posts, their metadata, options and user
//! metadata out of a stock WordPress schema. The only writes are option
//! updates (managed form fields) and the campaign-id post meta.

pub mod repositories;

pub use repositories::{MetaRepo, OptionRepo, PostRepo, UserMetaRepo};
pub use repositories::post_repo::PostQuery;

/// Convenience alias for the MySQL connection pool.
pub type DbPool = sqlx::MySqlPool;

/// Create a connection pool. Connections are established lazily and
/// re-established by the pool when found dead; no retry logic lives here.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    sqlx::mysql::MySqlPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
}

/// Verify the database is reachable by running a trivial query.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}
