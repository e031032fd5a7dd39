//! Raw row shapes as fetched from the WordPress store.
//!
//! These are the assembler's inputs. The `hareline-db` repositories map
//! MySQL rows into these structs; nothing here knows about SQL.

use chrono::NaiveDateTime;

/// One `wp_posts` row joined with its taxonomy term, as returned by the
/// event listing query (descending-id order).
#[derive(Debug, Clone)]
pub struct RawPost {
    pub id: i64,
    pub title: String,
    /// Post body. `None` or empty excludes the post from assembly.
    pub content: Option<String>,
    /// `post_modified` column (naive, server-local time).
    pub modified: NaiveDateTime,
    pub status: String,
    /// Canonical URL column; may carry HTML-escaped entities.
    pub guid: Option<String>,
    /// Taxonomy term name, used as the event type label.
    pub category: Option<String>,
}

/// One `wp_postmeta` (or `wp_usermeta`) key/value row.
///
/// Values are always strings; some are themselves PHP-serialized blobs.
#[derive(Debug, Clone)]
pub struct RawMetaRow {
    pub post_id: i64,
    pub key: String,
    pub value: String,
}
