use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

/// Optional foreign keys stay optional: an authorless or uncategorized post
/// round-trips as NULL, never as a sentinel id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: i64,
    pub user_id: Option<i64>,
    pub category_id: Option<i64>,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub published: i64,
    pub published_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn row_to_post(row: &Row) -> rusqlite::Result<PostRecord> {
    Ok(PostRecord {
        id: row.get("id")?,
        user_id: row.get("user_id")?,
        category_id: row.get("category_id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        content: row.get("content")?,
        excerpt: row.get("excerpt")?,
        published: row.get("published")?,
        published_at: row.get("published_at")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<PostRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM posts ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| row_to_post(row))?;
    rows.collect()
}

pub fn insert_all(conn: &Connection, posts: &[PostRecord]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO posts (id, user_id, category_id, title, slug, content, excerpt, published, published_at, created_at, updated_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
    )?;
    for post in posts {
        stmt.execute(params![
            post.id,
            post.user_id,
            post.category_id,
            post.title,
            post.slug,
            post.content,
            post.excerpt,
            post.published,
            post.published_at,
            post.created_at,
            post.updated_at,
            post.deleted_at,
        ])?;
    }
    Ok(posts.len())
}
