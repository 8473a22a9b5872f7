//! Shared fixtures for the engine's tests.

use crate::config::BackupConfig;
use crate::db::connection::{create_pool, DbPool};
use crate::db::migrate::migrate;
use crate::models::category::CategoryRecord;
use crate::models::comment::CommentRecord;
use crate::models::menu_item::MenuItemRecord;
use crate::models::page::PageRecord;
use crate::models::post::PostRecord;
use crate::models::post_tag::PostTagRecord;
use crate::models::settings::SettingRecord;
use crate::models::social_link::SocialLinkRecord;
use crate::models::tag::TagRecord;
use crate::models::user::UserRecord;
use crate::models::{
    category, comment, menu_item, page, post, post_tag, settings, social_link, tag, user,
};
use chrono::{TimeZone, Utc};
use rusqlite::Connection;
use std::path::Path;

pub(crate) fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_test_writer()
        .try_init();
}

pub(crate) fn test_pool(dir: &Path) -> anyhow::Result<DbPool> {
    let pool = create_pool(&dir.join("site.db"))?;
    migrate(&pool)?;
    Ok(pool)
}

pub(crate) fn test_config(dir: &Path) -> BackupConfig {
    BackupConfig {
        db_path: dir.join("site.db"),
        uploads_dir: dir.join("uploads"),
        scratch_dir: dir.join("scratch"),
    }
}

pub(crate) fn row_counts(conn: &Connection) -> anyhow::Result<Vec<(String, i64)>> {
    let tables = [
        "users",
        "categories",
        "tags",
        "posts",
        "pages",
        "comments",
        "settings",
        "menu_items",
        "social_links",
        "post_tags",
    ];
    let mut counts = Vec::with_capacity(tables.len());
    for table in tables {
        let count: i64 =
            conn.query_row(&format!("SELECT COUNT(*) FROM {}", table), [], |row| {
                row.get(0)
            })?;
        counts.push((table.to_string(), count));
    }
    Ok(counts)
}

/// Populates every entity table with a small, fully cross-referenced site.
pub(crate) fn seed_store(conn: &Connection) -> anyhow::Result<()> {
    let t0 = Utc.with_ymd_and_hms(2025, 1, 15, 9, 30, 0).unwrap();
    let t1 = Utc.with_ymd_and_hms(2025, 2, 1, 18, 0, 0).unwrap();

    user::insert_all(
        conn,
        &[
            UserRecord {
                id: 1,
                username: "admin".into(),
                email: "admin@example.com".into(),
                password_hash: "$2b$12$adminhash".into(),
                display_name: "Site Admin".into(),
                role: "admin".into(),
                created_at: t0,
                updated_at: t0,
                deleted_at: None,
            },
            UserRecord {
                id: 2,
                username: "writer".into(),
                email: "writer@example.com".into(),
                password_hash: "$2b$12$writerhash".into(),
                display_name: "Staff Writer".into(),
                role: "author".into(),
                created_at: t0,
                updated_at: t1,
                deleted_at: Some(t1),
            },
        ],
    )?;

    category::insert_all(
        conn,
        &[CategoryRecord {
            id: 1,
            name: "News".into(),
            slug: "news".into(),
            description: Some("Site news".into()),
            created_at: t0,
            updated_at: t0,
            deleted_at: None,
        }],
    )?;

    tag::insert_all(
        conn,
        &[
            TagRecord {
                id: 1,
                name: "Release".into(),
                slug: "release".into(),
                created_at: t0,
                updated_at: t0,
                deleted_at: None,
            },
            TagRecord {
                id: 2,
                name: "Howto".into(),
                slug: "howto".into(),
                created_at: t0,
                updated_at: t0,
                deleted_at: None,
            },
        ],
    )?;

    post::insert_all(
        conn,
        &[
            PostRecord {
                id: 1,
                user_id: Some(1),
                category_id: Some(1),
                title: "Hello World".into(),
                slug: "hello-world".into(),
                content: "First post.".into(),
                excerpt: Some("First".into()),
                published: 1,
                published_at: Some(t0),
                created_at: t0,
                updated_at: t0,
                deleted_at: None,
            },
            PostRecord {
                id: 2,
                user_id: None,
                category_id: None,
                title: "Draft".into(),
                slug: "draft".into(),
                content: "Unfinished.".into(),
                excerpt: None,
                published: 0,
                published_at: None,
                created_at: t1,
                updated_at: t1,
                deleted_at: Some(t1),
            },
        ],
    )?;

    page::insert_all(
        conn,
        &[PageRecord {
            id: 1,
            title: "About".into(),
            slug: "about".into(),
            content: "About this site.".into(),
            sort_order: 1,
            published: 1,
            created_at: t0,
            updated_at: t0,
            deleted_at: None,
        }],
    )?;

    comment::insert_all(
        conn,
        &[CommentRecord {
            id: 1,
            post_id: 1,
            author_name: "Reader".into(),
            author_email: "reader@example.com".into(),
            content: "Nice post!".into(),
            approved: 1,
            created_at: t1,
            updated_at: t1,
            deleted_at: None,
        }],
    )?;

    settings::insert_all(
        conn,
        &[
            SettingRecord {
                key: "site_title".into(),
                value: "Example Site".into(),
                updated_at: t0,
            },
            SettingRecord {
                key: "theme".into(),
                value: "default".into(),
                updated_at: t1,
            },
        ],
    )?;

    menu_item::insert_all(
        conn,
        &[MenuItemRecord {
            id: 1,
            label: "Home".into(),
            url: "/".into(),
            sort_order: 1,
            created_at: t0,
            updated_at: t0,
            deleted_at: None,
        }],
    )?;

    social_link::insert_all(
        conn,
        &[SocialLinkRecord {
            id: 1,
            platform: "mastodon".into(),
            url: "https://example.social/@site".into(),
            sort_order: 1,
            created_at: t0,
            updated_at: t0,
            deleted_at: None,
        }],
    )?;

    post_tag::insert_all(
        conn,
        &[
            PostTagRecord {
                post_id: 1,
                tag_id: 1,
            },
            PostTagRecord {
                post_id: 1,
                tag_id: 2,
            },
        ],
    )?;

    Ok(())
}
