use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: i64,
    pub post_id: i64,
    pub author_name: String,
    pub author_email: String,
    pub content: String,
    pub approved: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn row_to_comment(row: &Row) -> rusqlite::Result<CommentRecord> {
    Ok(CommentRecord {
        id: row.get("id")?,
        post_id: row.get("post_id")?,
        author_name: row.get("author_name")?,
        author_email: row.get("author_email")?,
        content: row.get("content")?,
        approved: row.get("approved")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<CommentRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM comments ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| row_to_comment(row))?;
    rows.collect()
}

pub fn insert_all(conn: &Connection, comments: &[CommentRecord]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO comments (id, post_id, author_name, author_email, content, approved, created_at, updated_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for comment in comments {
        stmt.execute(params![
            comment.id,
            comment.post_id,
            comment.author_name,
            comment.author_email,
            comment.content,
            comment.approved,
            comment.created_at,
            comment.updated_at,
            comment.deleted_at,
        ])?;
    }
    Ok(comments.len())
}
