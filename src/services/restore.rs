//! Whole-site restore: stage, extract, reload, promote.
//!
//! The four phases run strictly in order and each must complete before the
//! next begins. Failures in Stage and Extract leave the live store and
//! upload tree untouched. Reload happens inside one transaction, so a
//! failed reload rolls back to the pre-restore state. Promote swaps the
//! upload directory with a single rename after the reload has committed;
//! a failed promote restores the previous directory but the store keeps
//! the reloaded data — that bounded inconsistency window is deliberate and
//! surfaced as a distinct error, not masked.

use crate::archive::codec;
use crate::config::BackupConfig;
use crate::db::connection::DbPool;
use crate::error::{BackupError, CleanupWarning, Phase, Result};
use crate::manifest::{BackupSummary, Manifest, ManifestData, SCHEMA_VERSION};
use crate::models::{
    category, comment, menu_item, page, post, post_tag, settings, social_link, tag, user,
};
use crate::services::uploads;
use chrono::Utc;
use std::fs;
use std::io::{self, Read};
use std::path::Path;
use tempfile::NamedTempFile;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;
use zip::ZipArchive;

/// Outcome of a successful restore: the summary of what was loaded plus
/// any best-effort cleanup steps that failed without failing the restore.
#[derive(Debug)]
pub struct RestoreReport {
    pub summary: BackupSummary,
    pub warnings: Vec<CleanupWarning>,
}

/// Clears every covered table. Children go first so the foreign-key
/// constraints hold at each statement.
const TRUNCATE_ALL: &str = "
DELETE FROM post_tags;
DELETE FROM comments;
DELETE FROM posts;
DELETE FROM pages;
DELETE FROM tags;
DELETE FROM categories;
DELETE FROM users;
DELETE FROM menu_items;
DELETE FROM social_links;
DELETE FROM settings;
";

const RESET_SEQUENCES: &str = "DELETE FROM sqlite_sequence WHERE name IN \
    ('users','categories','tags','posts','pages','comments','menu_items','social_links')";

/// Restores the whole site from an inbound archive stream.
///
/// `size_hint` is an optimistic transport-level hint (Content-Length
/// style); a mismatch with the spooled byte count is logged, not fatal.
/// Cancellation is cooperative: the token is checked at phase boundaries
/// and between insert batches, and cancelling mid-reload rolls the
/// transaction back.
///
/// The engine does not guard against concurrent restores; the caller owns
/// a single-flight gate and must reject a second restore while one runs.
pub fn restore_archive<R: Read>(
    pool: &DbPool,
    config: &BackupConfig,
    mut source: R,
    size_hint: Option<u64>,
    cancel: &CancellationToken,
) -> Result<RestoreReport> {
    // ── Stage ──
    fs::create_dir_all(&config.scratch_dir).map_err(|e| BackupError::io(Phase::Stage, e))?;
    let mut spool =
        NamedTempFile::new_in(&config.scratch_dir).map_err(|e| BackupError::io(Phase::Stage, e))?;
    let spooled =
        io::copy(&mut source, spool.as_file_mut()).map_err(|e| BackupError::io(Phase::Stage, e))?;
    if let Some(expected) = size_hint {
        if expected != spooled {
            tracing::warn!(
                "[Restore] Inbound size hint {} does not match spooled {} bytes",
                expected,
                spooled
            );
        }
    }

    let reader = spool.reopen().map_err(|e| BackupError::io(Phase::Stage, e))?;
    let mut container = ZipArchive::new(reader)
        .map_err(|e| BackupError::InvalidArchive(format!("not a readable zip archive: {}", e)))?;
    let manifest = codec::read_manifest(&mut container)?;
    if manifest.schema_version != SCHEMA_VERSION {
        return Err(BackupError::UnsupportedVersion {
            found: manifest.schema_version,
            expected: SCHEMA_VERSION.to_string(),
        });
    }
    tracing::info!(
        "[Restore] Staged archive: schema {}, generated {}, {} uploads declared",
        manifest.schema_version,
        manifest.generated_at,
        manifest.uploads.len()
    );
    if cancel.is_cancelled() {
        return Err(BackupError::Cancelled);
    }

    // ── Extract / Reload / Promote ──
    // The staging directory survives only a fully successful restore; any
    // failure from here on removes it before the error surfaces.
    let staging = config.scratch_dir.join(format!("restore-{}", Uuid::new_v4()));
    let outcome = run_from_extract(pool, config, &mut container, &manifest, &staging, cancel);
    if outcome.is_err() {
        let _ = fs::remove_dir_all(&staging);
    }
    outcome
}

fn run_from_extract<R: Read + io::Seek>(
    pool: &DbPool,
    config: &BackupConfig,
    container: &mut ZipArchive<R>,
    manifest: &Manifest,
    staging: &Path,
    cancel: &CancellationToken,
) -> Result<RestoreReport> {
    // ── Extract ──
    fs::create_dir_all(staging).map_err(|e| BackupError::io(Phase::Extract, e))?;
    let extracted = codec::extract_assets(container, staging)?;
    tracing::info!("[Restore] Extracted {} upload files to staging", extracted);
    if cancel.is_cancelled() {
        return Err(BackupError::Cancelled);
    }

    // ── Reload ──
    reload(pool, &manifest.data, cancel)?;

    // ── Promote ──
    let stamp = Utc::now().format("%Y%m%d-%H%M%S").to_string();
    let aside = uploads::promote_dir(staging, &config.uploads_dir, &stamp)?;

    let mut warnings = Vec::new();
    if let Some(aside) = aside {
        // The reloaded data is already durable; a leftover backup
        // directory is an operator note, not a failure.
        if let Err(e) = fs::remove_dir_all(&aside) {
            tracing::warn!(
                "[Restore] Could not remove aside directory {}: {}",
                aside.display(),
                e
            );
            warnings.push(CleanupWarning {
                path: aside,
                detail: e.to_string(),
            });
        }
    }

    let summary = BackupSummary::from_manifest(manifest, Some(Utc::now()));
    tracing::info!(
        "[Restore] Restore complete: {} users, {} posts, {} uploads",
        summary.users,
        summary.posts,
        summary.uploads
    );
    Ok(RestoreReport { summary, warnings })
}

/// Truncates every covered table and re-inserts the manifest's record
/// lists inside one transaction, in dependency order so foreign keys are
/// always satisfied. Returning early — on error or cancellation — drops
/// the transaction and rolls everything back.
fn reload(pool: &DbPool, data: &ManifestData, cancel: &CancellationToken) -> Result<()> {
    let mut conn = pool.get()?;
    let tx = conn.transaction()?;

    tx.execute_batch(TRUNCATE_ALL)?;
    // sqlite_sequence only exists once an AUTOINCREMENT insert has happened.
    let has_sequences: bool = tx.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'sqlite_sequence')",
        [],
        |row| row.get(0),
    )?;
    if has_sequences {
        tx.execute(RESET_SEQUENCES, [])?;
    }

    let mut inserted = 0usize;
    inserted += batch(cancel, || user::insert_all(&tx, &data.users))?;
    inserted += batch(cancel, || category::insert_all(&tx, &data.categories))?;
    inserted += batch(cancel, || tag::insert_all(&tx, &data.tags))?;
    inserted += batch(cancel, || page::insert_all(&tx, &data.pages))?;
    inserted += batch(cancel, || post::insert_all(&tx, &data.posts))?;
    inserted += batch(cancel, || comment::insert_all(&tx, &data.comments))?;
    inserted += batch(cancel, || menu_item::insert_all(&tx, &data.menu_items))?;
    inserted += batch(cancel, || social_link::insert_all(&tx, &data.social_links))?;
    inserted += batch(cancel, || settings::insert_all(&tx, &data.settings))?;
    inserted += batch(cancel, || post_tag::insert_all(&tx, &data.post_tags))?;

    tx.commit()?;
    tracing::info!("[Restore] Reloaded {} records", inserted);
    Ok(())
}

fn batch(
    cancel: &CancellationToken,
    insert: impl FnOnce() -> rusqlite::Result<usize>,
) -> Result<usize> {
    if cancel.is_cancelled() {
        return Err(BackupError::Cancelled);
    }
    insert().map_err(Into::into)
}
