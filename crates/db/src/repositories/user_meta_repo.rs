//! Repository for the `wp_usermeta` table.

use sqlx::{MySqlPool, Row};

use hareline_core::store::RawMetaRow;

/// Provides read access to user metadata (session tokens live here).
pub struct UserMetaRepo;

impl UserMetaRepo {
    /// Fetch all metadata rows for one user.
    pub async fn for_user(pool: &MySqlPool, user_id: i64) -> Result<Vec<RawMetaRow>, sqlx::Error> {
        let rows =
            sqlx::query("SELECT user_id, meta_key, meta_value FROM wp_usermeta WHERE user_id = ?")
                .bind(user_id)
                .fetch_all(pool)
                .await?;

        rows.into_iter()
            .map(|row| {
                Ok(RawMetaRow {
                    post_id: row.try_get::<u64, _>("user_id")? as i64,
                    key: row.try_get("meta_key")?,
                    value: row
                        .try_get::<Option<String>, _>("meta_value")?
                        .unwrap_or_default(),
                })
            })
            .collect()
    }
}
