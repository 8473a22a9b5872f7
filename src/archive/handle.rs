//! Resource wrapper for freshly written export archives.

use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use tempfile::NamedTempFile;

/// Handle to the temporary file backing a created backup archive.
///
/// The handle is a scoped resource: the caller streams the archive out and
/// then calls [`close`](ArchiveHandle::close). The backing file is removed
/// on close and, as a backstop, when the handle is dropped.
pub struct ArchiveHandle {
    file: NamedTempFile,
    file_name: String,
    size: u64,
}

impl ArchiveHandle {
    /// Wraps a finished temp file, recording its size and rewinding it so
    /// the first read starts at the beginning of the archive.
    pub(crate) fn new(mut file: NamedTempFile, file_name: String) -> io::Result<Self> {
        let size = file.as_file().metadata()?.len();
        file.as_file_mut().seek(SeekFrom::Start(0))?;
        Ok(Self {
            file,
            file_name,
            size,
        })
    }

    /// Download filename for the archive (`backup-<YYYYMMDD-HHMMSS>.zip`).
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Size of the archive in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// Path of the backing temporary file.
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Resets the read position to the start of the archive.
    pub fn rewind(&mut self) -> io::Result<()> {
        self.file.as_file_mut().seek(SeekFrom::Start(0)).map(|_| ())
    }

    /// Borrows the backing file, e.g. to hand to a streaming response body.
    pub fn as_file(&self) -> &File {
        self.file.as_file()
    }

    /// Deletes the backing file, reporting any removal error. Dropping the
    /// handle also deletes the file, silently.
    pub fn close(self) -> io::Result<()> {
        self.file.close()
    }
}

impl Read for ArchiveHandle {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.file.read(buf)
    }
}
