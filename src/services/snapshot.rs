//! Builds the denormalized manifest for an export.

use crate::error::Result;
use crate::manifest::{Manifest, ManifestData, APPLICATION, SCHEMA_VERSION};
use crate::models::{
    category, comment, menu_item, page, post, post_tag, settings, social_link, tag, user,
};
use crate::services::uploads;
use chrono::Utc;
use rusqlite::Connection;
use std::path::Path;

/// Reads every entity table in a fixed dependency-free order and attaches
/// the upload listing. Each read is ordered by primary key (settings by
/// key) so the manifest is deterministic for a given store state. Any read
/// failure aborts the snapshot; partial manifests are never returned.
pub fn build_manifest(conn: &Connection, uploads_root: &Path) -> Result<Manifest> {
    let data = ManifestData {
        users: user::find_all(conn)?,
        categories: category::find_all(conn)?,
        tags: tag::find_all(conn)?,
        posts: post::find_all(conn)?,
        pages: page::find_all(conn)?,
        comments: comment::find_all(conn)?,
        settings: settings::find_all(conn)?,
        menu_items: menu_item::find_all(conn)?,
        social_links: social_link::find_all(conn)?,
        post_tags: post_tag::find_all(conn)?,
    };
    let uploads = uploads::list_uploads(uploads_root)?;

    Ok(Manifest {
        schema_version: SCHEMA_VERSION.to_string(),
        generated_at: Utc::now(),
        application: APPLICATION.to_string(),
        uploads,
        data,
    })
}
