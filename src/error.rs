use std::fmt;
use std::path::PathBuf;

/// Phase of a backup or restore operation, attached to I/O errors so that
/// "archive unreadable" is distinguishable from "disk full during extraction"
/// or "could not swap the uploads directory".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Export,
    Stage,
    Extract,
    Reload,
    Promote,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::Export => "export",
            Phase::Stage => "stage",
            Phase::Extract => "extract",
            Phase::Reload => "reload",
            Phase::Promote => "promote",
        };
        f.write_str(name)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum BackupError {
    /// The inbound file is not a usable backup archive: unreadable container,
    /// missing or undecodable manifest, or an asset entry whose path escapes
    /// the uploads namespace. Raised before any store or filesystem mutation.
    #[error("invalid backup archive: {0}")]
    InvalidArchive(String),

    /// The manifest decoded but its schema version is not the one this engine
    /// writes. Also raised before any mutation.
    #[error("unsupported backup version '{found}', expected '{expected}'")]
    UnsupportedVersion { found: String, expected: String },

    #[error("I/O error during {phase}: {source}")]
    Io {
        phase: Phase,
        #[source]
        source: std::io::Error,
    },

    #[error("database error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("database connection error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("archive codec error: {0}")]
    Archive(#[from] zip::result::ZipError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The uploads directory swap failed after the database reload already
    /// committed. The previous directory has been restored where possible,
    /// but store and filesystem may be out of sync: operator attention
    /// required, not a silent retry.
    #[error("upload promotion failed: {0}")]
    Promotion(String),

    #[error("operation cancelled")]
    Cancelled,
}

impl BackupError {
    pub(crate) fn io(phase: Phase, source: std::io::Error) -> Self {
        BackupError::Io { phase, source }
    }
}

/// A best-effort cleanup step that failed without failing the operation.
/// Returned on the success report so callers and tests can observe it.
#[derive(Debug, Clone)]
pub struct CleanupWarning {
    pub path: PathBuf,
    pub detail: String,
}

pub type Result<T> = std::result::Result<T, BackupError>;
