use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

/// Settings have no surrogate id; the key is the natural primary key and
/// there is no soft delete.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingRecord {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

fn row_to_setting(row: &Row) -> rusqlite::Result<SettingRecord> {
    Ok(SettingRecord {
        key: row.get("key")?,
        value: row.get("value")?,
        updated_at: row.get("updated_at")?,
    })
}

pub fn find_all(conn: &Connection) -> rusqlite::Result<Vec<SettingRecord>> {
    let mut stmt = conn.prepare("SELECT * FROM settings ORDER BY key ASC")?;
    let rows = stmt.query_map([], |row| row_to_setting(row))?;
    rows.collect()
}

pub fn insert_all(conn: &Connection, settings: &[SettingRecord]) -> rusqlite::Result<usize> {
    let mut stmt = conn.prepare(
        "INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
    )?;
    for setting in settings {
        stmt.execute(params![setting.key, setting.value, setting.updated_at])?;
    }
    Ok(settings.len())
}
