//! Manifest types for whole-site backup archives.
//!
//! A manifest is the canonical snapshot written into every backup archive:
//! schema version, generation time, the full denormalized record lists for
//! every entity table, and the relative paths of the upload files bundled
//! alongside it. It is built fresh for each export and parsed once per
//! restore; it is never cached or reused across calls.

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
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Manifest format revision. Restore refuses any archive whose manifest
/// carries a different value.
pub const SCHEMA_VERSION: &str = "1.0";

/// Tag identifying the producing system inside the manifest.
pub const APPLICATION: &str = "site-server";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manifest {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub application: String,
    pub uploads: Vec<String>,
    pub data: ManifestData,
}

/// One ordered record list per entity table. Array order is list order;
/// every record carries its original primary key and soft-delete marker so
/// a restore reproduces identity, not just content.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ManifestData {
    pub users: Vec<UserRecord>,
    pub categories: Vec<CategoryRecord>,
    pub tags: Vec<TagRecord>,
    pub posts: Vec<PostRecord>,
    pub pages: Vec<PageRecord>,
    pub comments: Vec<CommentRecord>,
    pub settings: Vec<SettingRecord>,
    pub menu_items: Vec<MenuItemRecord>,
    pub social_links: Vec<SocialLinkRecord>,
    pub post_tags: Vec<PostTagRecord>,
}

impl Manifest {
    /// Download filename for the archive this manifest describes,
    /// derived from `generated_at` in UTC.
    pub fn file_name(&self) -> String {
        format!("backup-{}.zip", self.generated_at.format("%Y%m%d-%H%M%S"))
    }
}

/// Read-only projection of a manifest: per-entity record counts plus the
/// generation (and, after a restore, restoration) timestamps.
#[derive(Debug, Clone, Serialize)]
pub struct BackupSummary {
    pub schema_version: String,
    pub generated_at: DateTime<Utc>,
    pub restored_at: Option<DateTime<Utc>>,
    pub users: usize,
    pub categories: usize,
    pub tags: usize,
    pub posts: usize,
    pub pages: usize,
    pub comments: usize,
    pub settings: usize,
    pub menu_items: usize,
    pub social_links: usize,
    pub post_tags: usize,
    pub uploads: usize,
}

impl BackupSummary {
    pub fn from_manifest(manifest: &Manifest, restored_at: Option<DateTime<Utc>>) -> Self {
        let data = &manifest.data;
        Self {
            schema_version: manifest.schema_version.clone(),
            generated_at: manifest.generated_at,
            restored_at,
            users: data.users.len(),
            categories: data.categories.len(),
            tags: data.tags.len(),
            posts: data.posts.len(),
            pages: data.pages.len(),
            comments: data.comments.len(),
            settings: data.settings.len(),
            menu_items: data.menu_items.len(),
            social_links: data.social_links.len(),
            post_tags: data.post_tags.len(),
            uploads: manifest.uploads.len(),
        }
    }
}
