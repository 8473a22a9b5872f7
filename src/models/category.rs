use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryRecord {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn row_to_category(row: &Row) -> rusqlite::Result<CategoryRecord> {
    Ok(CategoryRecord {
        id: row.get("id")?,
        name: row.get("name")?,
        slug: row.get("slug")?,
        description: row.get("description")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<CategoryRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM categories ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| row_to_category(row))?;
    rows.collect()
}

pub fn insert_all(conn: &Connection, categories: &[CategoryRecord]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO categories (id, name, slug, description, created_at, updated_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for category in categories {
        stmt.execute(params![
            category.id,
            category.name,
            category.slug,
            category.description,
            category.created_at,
            category.updated_at,
            category.deleted_at,
        ])?;
    }
    Ok(categories.len())
}
