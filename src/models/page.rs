use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub content: String,
    pub sort_order: i64,
    pub published: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn row_to_page(row: &Row) -> rusqlite::Result<PageRecord> {
    Ok(PageRecord {
        id: row.get("id")?,
        title: row.get("title")?,
        slug: row.get("slug")?,
        content: row.get("content")?,
        sort_order: row.get("sort_order")?,
        published: row.get("published")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<PageRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM pages ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| row_to_page(row))?;
    rows.collect()
}

pub fn insert_all(conn: &Connection, pages: &[PageRecord]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO pages (id, title, slug, content, sort_order, published, created_at, updated_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for page in pages {
        stmt.execute(params![
            page.id,
            page.title,
            page.slug,
            page.content,
            page.sort_order,
            page.published,
            page.created_at,
            page.updated_at,
            page.deleted_at,
        ])?;
    }
    Ok(pages.len())
}
