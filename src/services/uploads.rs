//! Upload tree enumeration and directory promotion.

use crate::error::{BackupError, Phase, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Lists every file under `root` as a forward-slash relative path, sorted
/// lexicographically. A missing root is an empty site, not an error; a root
/// that exists but is not a directory is.
pub fn list_uploads(root: &Path) -> Result<Vec<String>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let meta = fs::metadata(root).map_err(|e| BackupError::io(Phase::Export, e))?;
    if !meta.is_dir() {
        return Err(BackupError::io(
            Phase::Export,
            io::Error::other(format!("upload root {} is not a directory", root.display())),
        ));
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).follow_links(false) {
        let entry = entry.map_err(|e| BackupError::io(Phase::Export, e.into()))?;
        if entry.file_type().is_dir() {
            continue;
        }
        let rel = entry.path().strip_prefix(root).unwrap_or(entry.path());
        let rel = rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        files.push(rel);
    }
    files.sort();
    Ok(files)
}

/// Swaps `staged` into place at `live`: the existing live directory is
/// renamed aside to `<live>.bak-<stamp>`, then the staged directory is
/// renamed (or, across devices, copied) into the live path. If the swap
/// fails after the live directory moved aside, the aside copy is renamed
/// back before the error surfaces.
///
/// Returns the aside path when a previous live directory existed; its
/// removal is the caller's best-effort cleanup step.
pub(crate) fn promote_dir(staged: &Path, live: &Path, stamp: &str) -> Result<Option<PathBuf>> {
    let aside = match live.file_name() {
        Some(name) => live.with_file_name(format!("{}.bak-{}", name.to_string_lossy(), stamp)),
        None => {
            return Err(BackupError::Promotion(format!(
                "live path {} has no directory name",
                live.display()
            )))
        }
    };

    let had_live = live.exists();
    if had_live {
        fs::rename(live, &aside).map_err(|e| {
            BackupError::Promotion(format!(
                "could not move live directory {} aside: {}",
                live.display(),
                e
            ))
        })?;
    } else if let Some(parent) = live.parent() {
        fs::create_dir_all(parent).map_err(|e| BackupError::io(Phase::Promote, e))?;
    }

    match move_dir(staged, live) {
        Ok(()) => Ok(had_live.then_some(aside)),
        Err(e) => {
            if had_live {
                // A partial cross-device copy may occupy the live path.
                let _ = fs::remove_dir_all(live);
                if let Err(restore_err) = fs::rename(&aside, live) {
                    return Err(BackupError::Promotion(format!(
                        "swap failed ({}) and the previous directory could not be restored from {}: {}",
                        e,
                        aside.display(),
                        restore_err
                    )));
                }
            }
            Err(BackupError::Promotion(format!(
                "could not swap staged directory into {}: {}",
                live.display(),
                e
            )))
        }
    }
}

/// Renames `from` to `to`, falling back to copy-then-delete when a direct
/// rename is not possible (cross-device moves).
fn move_dir(from: &Path, to: &Path) -> io::Result<()> {
    if !from.is_dir() {
        return Err(io::Error::other(format!(
            "staged directory {} is missing",
            from.display()
        )));
    }
    if fs::rename(from, to).is_ok() {
        return Ok(());
    }
    copy_dir_recursive(from, to)?;
    if let Err(e) = fs::remove_dir_all(from) {
        tracing::warn!(
            "[Restore] Staged directory {} left behind after copy: {}",
            from.display(),
            e
        );
    }
    Ok(())
}

fn copy_dir_recursive(from: &Path, to: &Path) -> io::Result<()> {
    fs::create_dir_all(to)?;
    for entry in fs::read_dir(from)? {
        let entry = entry?;
        let target = to.join(entry.file_name());
        if entry.file_type()?.is_dir() {
            copy_dir_recursive(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_list_uploads_is_sorted_and_relative() -> Result<()> {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("b.png"), b"b").unwrap();
        fs::write(root.path().join("a.png"), b"a").unwrap();
        fs::create_dir(root.path().join("sub")).unwrap();
        fs::write(root.path().join("sub/c.png"), b"c").unwrap();

        let files = list_uploads(root.path())?;
        assert_eq!(files, vec!["a.png", "b.png", "sub/c.png"]);
        Ok(())
    }

    #[test]
    fn test_list_uploads_missing_root_is_empty() -> Result<()> {
        let dir = TempDir::new().unwrap();
        let files = list_uploads(&dir.path().join("nope"))?;
        assert!(files.is_empty());
        Ok(())
    }

    #[test]
    fn test_list_uploads_non_directory_root_fails() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("uploads");
        fs::write(&file, b"not a dir").unwrap();
        let err = list_uploads(&file).unwrap_err();
        assert!(matches!(err, BackupError::Io { phase: Phase::Export, .. }));
    }

    #[test]
    fn test_promote_replaces_live_and_returns_aside() -> Result<()> {
        let base = TempDir::new().unwrap();
        let live = base.path().join("uploads");
        let staged = base.path().join("staged");
        fs::create_dir_all(&live).unwrap();
        fs::write(live.join("old.txt"), b"old").unwrap();
        fs::create_dir_all(&staged).unwrap();
        fs::write(staged.join("new.txt"), b"new").unwrap();

        let aside = promote_dir(&staged, &live, "20250101-000000")?.expect("aside expected");
        assert!(live.join("new.txt").exists());
        assert!(!live.join("old.txt").exists());
        assert!(aside.join("old.txt").exists());
        Ok(())
    }

    #[test]
    fn test_promote_without_previous_live_dir() -> Result<()> {
        let base = TempDir::new().unwrap();
        let live = base.path().join("data/uploads");
        let staged = base.path().join("staged");
        fs::create_dir_all(&staged).unwrap();
        fs::write(staged.join("new.txt"), b"new").unwrap();

        let aside = promote_dir(&staged, &live, "20250101-000000")?;
        assert!(aside.is_none());
        assert!(live.join("new.txt").exists());
        Ok(())
    }

    #[test]
    fn test_failed_promotion_restores_previous_live_dir() {
        let base = TempDir::new().unwrap();
        let live = base.path().join("uploads");
        fs::create_dir_all(&live).unwrap();
        fs::write(live.join("keep.txt"), b"keep").unwrap();

        // Staged directory does not exist, so the swap must fail.
        let staged = base.path().join("missing-staged");
        let err = promote_dir(&staged, &live, "20250101-000000").unwrap_err();
        assert!(matches!(err, BackupError::Promotion(_)));

        // Original live directory is back, intact.
        assert!(live.join("keep.txt").exists());
        let aside = base.path().join("uploads.bak-20250101-000000");
        assert!(!aside.exists());
    }
}
