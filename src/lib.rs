//! Backup and restore engine for the site server.
//!
//! The engine serializes the whole relational state plus the upload tree
//! into a single zip archive ([`create_archive`]) and reconstructs both
//! from such an archive ([`restore_archive`]). A restore runs in four
//! strictly ordered phases — stage, extract, reload, promote — where the
//! database reload is one all-or-nothing transaction and the upload swap
//! is a single directory rename, so readers never observe half-applied
//! state on either side.
//!
//! Two contracts callers must hold:
//!
//! - **Single flight.** The engine does not guard against concurrent
//!   restores against the same store. The caller owns a mutual-exclusion
//!   gate and rejects a second restore while one is running.
//! - **Promotion window.** The database commit and the upload-directory
//!   swap are not one atomic unit. A [`BackupError::Promotion`] error
//!   means the store already holds the restored data while the previous
//!   upload directory was put back; that state needs operator attention,
//!   not a blind retry.

pub mod archive;
pub mod config;
pub mod db;
pub mod error;
pub mod manifest;
pub mod models;
pub mod services;

#[cfg(test)]
pub(crate) mod test_support;

pub use archive::handle::ArchiveHandle;
pub use config::BackupConfig;
pub use db::connection::{create_pool, DbPool};
pub use error::{BackupError, CleanupWarning, Phase, Result};
pub use manifest::{BackupSummary, Manifest, ManifestData, APPLICATION, SCHEMA_VERSION};
pub use services::export::create_archive;
pub use services::restore::{restore_archive, RestoreReport};
