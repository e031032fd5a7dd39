//! Repository for the `wp_postmeta` table.

use sqlx::{MySqlPool, Row};

use hareline_core::store::RawMetaRow;

/// Provides read and single-row write operations for post metadata.
pub struct MetaRepo;

impl MetaRepo {
    /// Fetch all metadata rows for the given posts. An empty id list
    /// returns no rows.
    pub async fn for_posts(
        pool: &MySqlPool,
        post_ids: &[i64],
    ) -> Result<Vec<RawMetaRow>, sqlx::Error> {
        if post_ids.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; post_ids.len()].join(", ");
        let query = format!(
            "SELECT post_id, meta_key, meta_value FROM wp_postmeta \
             WHERE post_id IN ({placeholders})"
        );

        let mut statement = sqlx::query(&query);
        for id in post_ids {
            statement = statement.bind(id);
        }

        let rows = statement.fetch_all(pool).await?;
        rows.into_iter()
            .map(|row| {
                Ok(RawMetaRow {
                    post_id: row.try_get::<u64, _>("post_id")? as i64,
                    key: row.try_get("meta_key")?,
                    // meta_value is nullable in stock WordPress
                    value: row
                        .try_get::<Option<String>, _>("meta_value")?
                        .unwrap_or_default(),
                })
            })
            .collect()
    }

    /// Insert a new metadata row for a post.
    pub async fn add(
        pool: &MySqlPool,
        post_id: i64,
        key: &str,
        value: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "INSERT INTO wp_postmeta (post_id, meta_key, meta_value) VALUES (?, ?, ?)",
        )
        .bind(post_id)
        .bind(key)
        .bind(value)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Update an existing metadata row, returning the number of rows
    /// affected (0 when the key does not exist for the post).
    pub async fn update(
        pool: &MySqlPool,
        post_id: i64,
        key: &str,
        value: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE wp_postmeta SET meta_value = ? WHERE post_id = ? AND meta_key = ?",
        )
        .bind(value)
        .bind(post_id)
        .bind(key)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
