use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

/// Join row between posts and tags. No independent identity, no timestamps;
/// the composite key is the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostTagRecord {
    pub post_id: i64,
    pub tag_id: i64,
}

fn row_to_post_tag(row: &Row) -> rusqlite::Result<PostTagRecord> {
    Ok(PostTagRecord {
        post_id: row.get("post_id")?,
        tag_id: row.get("tag_id")?,
    })
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<PostTagRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM post_tags ORDER BY post_id ASC, tag_id ASC")?;
    let rows = stmt.query_map([], |row| row_to_post_tag(row))?;
    rows.collect()
}

pub fn insert_all(conn: &Connection, rows: &[PostTagRecord]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare("INSERT INTO post_tags (post_id, tag_id) VALUES (?1, ?2)")?;
    for row in rows {
        stmt.execute(params![row.post_id, row.tag_id])?;
    }
    Ok(rows.len())
}
