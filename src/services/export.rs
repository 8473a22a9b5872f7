//! Whole-site export: snapshot the store and package it with the uploads.

use crate::archive::codec;
use crate::archive::handle::ArchiveHandle;
use crate::config::BackupConfig;
use crate::db::connection::DbPool;
use crate::error::{BackupError, Phase, Result};
use crate::manifest::BackupSummary;
use crate::services::snapshot;
use std::fs;
use tempfile::NamedTempFile;
use zip::ZipWriter;

/// Builds a fresh manifest, writes it and every referenced upload into a
/// new temporary zip container, and returns a handle positioned at the
/// start of the file together with the summary. The handle owns the file:
/// the caller streams it out and closes it.
pub fn create_archive(pool: &DbPool, config: &BackupConfig) -> Result<(ArchiveHandle, BackupSummary)> {
    let conn = pool.get()?;
    let manifest = snapshot::build_manifest(&conn, &config.uploads_dir)?;
    let summary = BackupSummary::from_manifest(&manifest, None);

    fs::create_dir_all(&config.scratch_dir).map_err(|e| BackupError::io(Phase::Export, e))?;
    let mut spool =
        NamedTempFile::new_in(&config.scratch_dir).map_err(|e| BackupError::io(Phase::Export, e))?;

    {
        let mut zip = ZipWriter::new(spool.as_file_mut());
        codec::write_manifest(&mut zip, &manifest)?;
        let written = codec::write_assets(&mut zip, &config.uploads_dir, &manifest.uploads)?;
        zip.finish()?;
        if written < manifest.uploads.len() {
            tracing::warn!(
                "[Backup] {} of {} uploads vanished between enumeration and archiving",
                manifest.uploads.len() - written,
                manifest.uploads.len()
            );
        }
    }

    let handle = ArchiveHandle::new(spool, manifest.file_name())
        .map_err(|e| BackupError::io(Phase::Export, e))?;
    tracing::info!(
        "[Backup] Created archive {} ({} bytes, {} uploads)",
        handle.file_name(),
        handle.size(),
        summary.uploads
    );
    Ok((handle, summary))
}
