//! Repository for the `wp_options` table.

use sqlx::MySqlPool;

/// Provides access to WordPress configuration options.
pub struct OptionRepo;

impl OptionRepo {
    /// Fetch a single option value by name.
    pub async fn get(pool: &MySqlPool, name: &str) -> Result<Option<String>, sqlx::Error> {
        sqlx::query_scalar("SELECT option_value FROM wp_options WHERE option_name = ?")
            .bind(name)
            .fetch_optional(pool)
            .await
    }

    /// Overwrite an option value, returning the number of rows affected
    /// (0 when the option does not exist or already holds the value).
    pub async fn set(pool: &MySqlPool, name: &str, value: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("UPDATE wp_options SET option_value = ? WHERE option_name = ?")
            .bind(value)
            .bind(name)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
