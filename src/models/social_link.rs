use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialLinkRecord {
    pub id: i64,
    pub platform: String,
    pub url: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn row_to_social_link(row: &Row) -> rusqlite::Result<SocialLinkRecord> {
    Ok(SocialLinkRecord {
        id: row.get("id")?,
        platform: row.get("platform")?,
        url: row.get("url")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<SocialLinkRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM social_links ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| row_to_social_link(row))?;
    rows.collect()
}

pub fn insert_all(conn: &Connection, links: &[SocialLinkRecord]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO social_links (id, platform, url, sort_order, created_at, updated_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for link in links {
        stmt.execute(params![
            link.id,
            link.platform,
            link.url,
            link.sort_order,
            link.created_at,
            link.updated_at,
            link.deleted_at,
        ])?;
    }
    Ok(links.len())
}
