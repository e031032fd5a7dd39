//! Repository for the `wp_posts` table (event listings only).

use chrono::NaiveDateTime;
use sqlx::{MySqlPool, Row};

use hareline_core::filter::Compare;
use hareline_core::store::RawPost;

/// Column list for event listing queries. The taxonomy join supplies the
/// event type term as `post_category`.
const POST_COLUMNS: &str = "p.ID, p.post_title, p.post_content, p.post_modified_gmt, \
     p.post_status, p.guid, wp_t.name AS post_category";

/// Parameters for an event listing fetch. Everything is optional; the
/// default query returns all event listings newest-first.
#[derive(Debug, Clone, Default)]
pub struct PostQuery {
    /// Restrict to a single post.
    pub id: Option<i64>,
    /// Bound on `post_modified_gmt`, pushed into the query.
    pub modified: Option<(NaiveDateTime, Compare)>,
}

/// Provides read operations for event listing posts.
pub struct PostRepo;

impl PostRepo {
    /// Fetch event listings matching the query, ordered by descending id.
    pub async fn fetch(pool: &MySqlPool, params: &PostQuery) -> Result<Vec<RawPost>, sqlx::Error> {
        let mut query = format!(
            "SELECT {POST_COLUMNS} \
             FROM wp_posts AS p \
             LEFT JOIN wp_term_relationships AS t ON p.ID = t.object_id \
             LEFT JOIN wp_terms AS wp_t ON t.term_taxonomy_id = wp_t.term_id \
             WHERE p.post_type = 'event_listing'"
        );

        if params.id.is_some() {
            query.push_str(" AND p.ID = ?");
        }
        if let Some((_, compare)) = params.modified {
            let op = match compare {
                Compare::Eq => "=",
                Compare::Lt => "<",
                Compare::Gt => ">",
            };
            query.push_str(&format!(" AND p.post_modified_gmt {op} ?"));
        }
        query.push_str(" ORDER BY p.ID DESC");

        let mut statement = sqlx::query(&query);
        if let Some(id) = params.id {
            statement = statement.bind(id);
        }
        if let Some((modified, _)) = params.modified {
            statement = statement.bind(modified);
        }

        let rows = statement.fetch_all(pool).await?;
        tracing::debug!(count = rows.len(), "Fetched event listing posts");

        rows.into_iter()
            .map(|row| {
                Ok(RawPost {
                    id: row.try_get::<u64, _>("ID")? as i64,
                    title: row.try_get("post_title")?,
                    content: row.try_get("post_content")?,
                    modified: row.try_get("post_modified_gmt")?,
                    status: row.try_get("post_status")?,
                    guid: row.try_get("guid")?,
                    category: row.try_get("post_category")?,
                })
            })
            .collect()
    }
}
