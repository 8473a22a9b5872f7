//! Zip container read/write for backup archives.
//!
//! An archive holds exactly one `manifest.json` entry at the container root
//! and zero or more asset entries under `uploads/`, each named by the
//! relative path declared in the manifest. The codec knows nothing about
//! business entities; it moves manifests and upload bytes in and out of the
//! container and enforces that no entry path escapes the uploads namespace.

use crate::error::{BackupError, Phase, Result};
use crate::manifest::Manifest;
use std::fs::{self, File};
use std::io::{self, Read, Seek, Write};
use std::path::{Component, Path, PathBuf};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub const MANIFEST_ENTRY: &str = "manifest.json";
pub const UPLOADS_PREFIX: &str = "uploads/";

/// Mode bits applied to extracted files when the archive stored none.
const DEFAULT_FILE_MODE: u32 = 0o644;

/// Serializes the manifest as the archive's sole manifest entry. Struct
/// field order fixes the JSON field order, so a written manifest reads back
/// bit-for-bit identical on the next pass.
pub fn write_manifest<W: Write + Seek>(zip: &mut ZipWriter<W>, manifest: &Manifest) -> Result<()> {
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
    zip.start_file(MANIFEST_ENTRY, options)?;
    let bytes = serde_json::to_vec_pretty(manifest)?;
    zip.write_all(&bytes)
        .map_err(|e| BackupError::io(Phase::Export, e))?;
    Ok(())
}

/// Streams each listed upload file into the archive under `uploads/`.
/// A path that no longer resolves to a regular file is skipped with a
/// warning; enumeration happened earlier and files may vanish in between.
/// Returns the number of entries actually written.
pub fn write_assets<W: Write + Seek>(
    zip: &mut ZipWriter<W>,
    base_dir: &Path,
    relative_paths: &[String],
) -> Result<usize> {
    let mut written = 0;
    for rel in relative_paths {
        let src = base_dir.join(rel);
        let meta = match fs::metadata(&src) {
            Ok(m) if m.is_file() => m,
            _ => {
                tracing::warn!("[Backup] Skipping vanished upload: {}", rel);
                continue;
            }
        };

        let mut options = FileOptions::default().compression_method(CompressionMethod::Deflated);
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            options = options.unix_permissions(meta.permissions().mode());
        }
        #[cfg(not(unix))]
        let _ = &meta;

        zip.start_file(format!("{}{}", UPLOADS_PREFIX, rel), options)?;
        let mut file = File::open(&src).map_err(|e| BackupError::io(Phase::Export, e))?;
        io::copy(&mut file, zip).map_err(|e| BackupError::io(Phase::Export, e))?;
        written += 1;
    }
    Ok(written)
}

/// Locates and decodes the manifest entry. A missing entry, undecodable
/// content, or an empty schema version all classify as an invalid archive.
pub fn read_manifest<R: Read + Seek>(archive: &mut ZipArchive<R>) -> Result<Manifest> {
    let mut entry = archive
        .by_name(MANIFEST_ENTRY)
        .map_err(|_| BackupError::InvalidArchive(format!("no {} entry", MANIFEST_ENTRY)))?;

    let mut raw = String::new();
    entry
        .read_to_string(&mut raw)
        .map_err(|e| BackupError::InvalidArchive(format!("unreadable manifest: {}", e)))?;

    let manifest: Manifest = serde_json::from_str(&raw)
        .map_err(|e| BackupError::InvalidArchive(format!("manifest does not decode: {}", e)))?;

    if manifest.schema_version.is_empty() {
        return Err(BackupError::InvalidArchive(
            "manifest schema_version is empty".into(),
        ));
    }
    Ok(manifest)
}

/// Extracts every entry under `uploads/` into `scratch_dir`, preserving the
/// stored permission bits. Directory-only entries become empty directories.
/// The first path-validation or I/O failure aborts extraction; the caller
/// owns cleanup of the partially populated scratch directory. Returns the
/// count of asset files materialized.
pub fn extract_assets<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    scratch_dir: &Path,
) -> Result<usize> {
    let mut extracted = 0;
    for index in 0..archive.len() {
        let mut entry = archive
            .by_index(index)
            .map_err(|e| BackupError::InvalidArchive(format!("unreadable entry {}: {}", index, e)))?;

        let name = entry.name().to_string();
        let Some(rel) = name.strip_prefix(UPLOADS_PREFIX) else {
            continue;
        };
        let rel_path = sanitize_entry_path(&name, rel)?;
        let dest = scratch_dir.join(&rel_path);

        if entry.is_dir() {
            fs::create_dir_all(&dest).map_err(|e| BackupError::io(Phase::Extract, e))?;
            continue;
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).map_err(|e| BackupError::io(Phase::Extract, e))?;
        }
        let mut out = File::create(&dest).map_err(|e| BackupError::io(Phase::Extract, e))?;
        io::copy(&mut entry, &mut out).map_err(|e| BackupError::io(Phase::Extract, e))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = entry
                .unix_mode()
                .map(|m| m & 0o777)
                .filter(|m| *m != 0)
                .unwrap_or(DEFAULT_FILE_MODE);
            fs::set_permissions(&dest, fs::Permissions::from_mode(mode))
                .map_err(|e| BackupError::io(Phase::Extract, e))?;
        }

        extracted += 1;
    }
    Ok(extracted)
}

/// Normalizes an entry path relative to the uploads namespace. Parent-dir
/// segments, absolute components, and paths that resolve to nothing are
/// hard validation failures, not skipped entries.
fn sanitize_entry_path(entry_name: &str, rel: &str) -> Result<PathBuf> {
    // Directory entries carry a trailing slash.
    let rel = rel.trim_end_matches('/');
    let mut clean = PathBuf::new();
    for component in Path::new(rel).components() {
        match component {
            Component::Normal(part) => clean.push(part),
            Component::CurDir => {}
            _ => {
                return Err(BackupError::InvalidArchive(format!(
                    "entry '{}' escapes the uploads namespace",
                    entry_name
                )))
            }
        }
    }
    if clean.as_os_str().is_empty() {
        return Err(BackupError::InvalidArchive(format!(
            "entry '{}' resolves to an empty path",
            entry_name
        )));
    }
    Ok(clean)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::{ManifestData, APPLICATION, SCHEMA_VERSION};
    use chrono::Utc;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn empty_manifest() -> Manifest {
        Manifest {
            schema_version: SCHEMA_VERSION.to_string(),
            generated_at: Utc::now(),
            application: APPLICATION.to_string(),
            uploads: Vec::new(),
            data: ManifestData::default(),
        }
    }

    fn archive_with_entries(entries: &[(&str, &[u8])]) -> Cursor<Vec<u8>> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            let options = FileOptions::default().compression_method(CompressionMethod::Deflated);
            for (name, body) in entries {
                zip.start_file(*name, options).unwrap();
                zip.write_all(body).unwrap();
            }
            zip.finish().unwrap();
        }
        cursor.set_position(0);
        cursor
    }

    #[test]
    fn test_manifest_round_trips() -> Result<()> {
        let manifest = empty_manifest();
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            write_manifest(&mut zip, &manifest)?;
            zip.finish()?;
        }
        cursor.set_position(0);

        let mut archive = ZipArchive::new(cursor)?;
        let decoded = read_manifest(&mut archive)?;
        assert_eq!(decoded, manifest);
        Ok(())
    }

    #[test]
    fn test_missing_manifest_is_invalid_archive() {
        let cursor = archive_with_entries(&[("uploads/a.png", b"png".as_slice())]);
        let mut archive = ZipArchive::new(cursor).unwrap();
        let err = read_manifest(&mut archive).unwrap_err();
        assert!(matches!(err, BackupError::InvalidArchive(_)));
    }

    #[test]
    fn test_empty_schema_version_is_invalid_archive() {
        let body = br#"{"schema_version":"","generated_at":"2025-01-01T00:00:00Z","application":"site-server","uploads":[],"data":{"users":[],"categories":[],"tags":[],"posts":[],"pages":[],"comments":[],"settings":[],"menu_items":[],"social_links":[],"post_tags":[]}}"#;
        let cursor = archive_with_entries(&[(MANIFEST_ENTRY, body.as_slice())]);
        let mut archive = ZipArchive::new(cursor).unwrap();
        let err = read_manifest(&mut archive).unwrap_err();
        assert!(matches!(err, BackupError::InvalidArchive(_)));
    }

    #[test]
    fn test_traversal_entry_rejected_and_nothing_escapes() {
        let cursor = archive_with_entries(&[
            ("uploads/ok.txt", b"fine".as_slice()),
            ("uploads/../../etc/passwd", b"root".as_slice()),
        ]);
        let mut archive = ZipArchive::new(cursor).unwrap();

        let scratch = TempDir::new().unwrap();
        let err = extract_assets(&mut archive, scratch.path()).unwrap_err();
        assert!(matches!(err, BackupError::InvalidArchive(_)));

        // Nothing may land outside the scratch directory.
        assert!(!scratch.path().parent().unwrap().join("etc/passwd").exists());
    }

    #[test]
    fn test_absolute_entry_rejected() {
        let cursor = archive_with_entries(&[("uploads//etc/passwd", b"root".as_slice())]);
        let mut archive = ZipArchive::new(cursor).unwrap();
        let scratch = TempDir::new().unwrap();
        let err = extract_assets(&mut archive, scratch.path()).unwrap_err();
        assert!(matches!(err, BackupError::InvalidArchive(_)));
    }

    #[test]
    fn test_extract_materializes_files_and_counts_them() -> Result<()> {
        let cursor = archive_with_entries(&[
            (MANIFEST_ENTRY, b"{}".as_slice()),
            ("uploads/a.png", b"aaa".as_slice()),
            ("uploads/sub/b.png", b"bbb".as_slice()),
        ]);
        let mut archive = ZipArchive::new(cursor)?;

        let scratch = TempDir::new().unwrap();
        let count = extract_assets(&mut archive, scratch.path())?;
        assert_eq!(count, 2);
        assert_eq!(std::fs::read(scratch.path().join("a.png")).unwrap(), b"aaa");
        assert_eq!(std::fs::read(scratch.path().join("sub/b.png")).unwrap(), b"bbb");
        Ok(())
    }

    #[test]
    fn test_directory_entries_become_empty_directories() -> Result<()> {
        let mut cursor = Cursor::new(Vec::new());
        {
            let mut zip = ZipWriter::new(&mut cursor);
            let options = FileOptions::default().compression_method(CompressionMethod::Stored);
            zip.add_directory("uploads/empty", options).unwrap();
            zip.finish().unwrap();
        }
        cursor.set_position(0);

        let mut archive = ZipArchive::new(cursor)?;
        let scratch = TempDir::new().unwrap();
        let count = extract_assets(&mut archive, scratch.path())?;
        assert_eq!(count, 0);
        assert!(scratch.path().join("empty").is_dir());
        Ok(())
    }

    #[test]
    fn test_write_assets_skips_vanished_files() -> Result<()> {
        let base = TempDir::new().unwrap();
        std::fs::write(base.path().join("kept.txt"), b"kept").unwrap();

        let mut cursor = Cursor::new(Vec::new());
        let written = {
            let mut zip = ZipWriter::new(&mut cursor);
            let written = write_assets(
                &mut zip,
                base.path(),
                &["kept.txt".to_string(), "gone.txt".to_string()],
            )?;
            zip.finish()?;
            written
        };
        assert_eq!(written, 1);

        cursor.set_position(0);
        let mut archive = ZipArchive::new(cursor)?;
        assert!(archive.by_name("uploads/kept.txt").is_ok());
        assert!(archive.by_name("uploads/gone.txt").is_err());
        Ok(())
    }
}
