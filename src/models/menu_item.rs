use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MenuItemRecord {
    pub id: i64,
    pub label: String,
    pub url: String,
    pub sort_order: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

fn row_to_menu_item(row: &Row) -> rusqlite::Result<MenuItemRecord> {
    Ok(MenuItemRecord {
        id: row.get("id")?,
        label: row.get("label")?,
        url: row.get("url")?,
        sort_order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
        deleted_at: row.get("deleted_at")?,
    })
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<MenuItemRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM menu_items ORDER BY id ASC")?;
    let rows = stmt.query_map([], |row| row_to_menu_item(row))?;
    rows.collect()
}

pub fn insert_all(conn: &Connection, items: &[MenuItemRecord]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO menu_items (id, label, url, sort_order, created_at, updated_at, deleted_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
    )?;
    for item in items {
        stmt.execute(params![
            item.id,
            item.label,
            item.url,
            item.sort_order,
            item.created_at,
            item.updated_at,
            item.deleted_at,
        ])?;
    }
    Ok(items.len())
}
