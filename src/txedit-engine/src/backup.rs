//! In-memory backups and rollback.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{EngineError, EngineResult};

/// A point-in-time snapshot of one file, captured before any mutation.
///
/// `existed == false` means the file was absent before the transaction, so
/// rollback must delete it rather than restore empty content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileBackup {
    pub path: PathBuf,
    pub prior_content: Option<String>,
    pub existed: bool,
}

/// Pre-transaction snapshots for every path a transaction could touch.
///
/// Backups are keyed by path and immutable once captured: the first snapshot
/// of a path wins, so a later edit to the same path within one transaction
/// cannot overwrite the original state. Capture order is preserved because
/// [`BackupStore::restore_all`] replays it in reverse.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BackupStore {
    backups: IndexMap<PathBuf, FileBackup>,
}

impl BackupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshots every path not already captured.
    ///
    /// All reads are issued concurrently and fully resolved before this
    /// returns; any I/O error other than not-found is fatal and must abort
    /// the transaction before mutation starts. Duplicate paths in the input
    /// are captured once, in first-seen order.
    pub async fn snapshot(&mut self, paths: &[PathBuf]) -> EngineResult<()> {
        let mut pending: Vec<PathBuf> = Vec::new();
        for path in paths {
            if !self.backups.contains_key(path) && !pending.contains(path) {
                pending.push(path.clone());
            }
        }

        let reads = pending.iter().map(|path| snapshot_one(path.clone()));
        let captured = futures::future::try_join_all(reads).await?;

        for backup in captured {
            tracing::debug!(
                "Captured backup for {} (existed: {})",
                backup.path.display(),
                backup.existed
            );
            self.backups.insert(backup.path.clone(), backup);
        }
        Ok(())
    }

    /// Restores every backup, in reverse capture order (last captured first),
    /// so nested creations are undone innermost-first.
    ///
    /// A file that existed is rewritten verbatim; a file that did not exist
    /// is deleted if present. A missing file during rollback is not an
    /// error, since the forward apply may never have reached it.
    pub async fn restore_all(&self) -> EngineResult<()> {
        for backup in self.backups.values().rev() {
            restore_one(backup).await?;
        }
        Ok(())
    }

    pub fn get(&self, path: &Path) -> Option<&FileBackup> {
        self.backups.get(path)
    }

    pub fn contains(&self, path: &Path) -> bool {
        self.backups.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.backups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.backups.is_empty()
    }

    /// Backed-up paths in capture order.
    pub fn paths(&self) -> impl Iterator<Item = &PathBuf> {
        self.backups.keys()
    }
}

async fn snapshot_one(path: PathBuf) -> EngineResult<FileBackup> {
    match tokio::fs::read_to_string(&path).await {
        Ok(content) => Ok(FileBackup {
            path,
            prior_content: Some(content),
            existed: true,
        }),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(FileBackup {
            path,
            prior_content: None,
            existed: false,
        }),
        Err(source) => Err(EngineError::Read { path, source }),
    }
}

async fn restore_one(backup: &FileBackup) -> EngineResult<()> {
    if backup.existed {
        if let Some(parent) = backup.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| EngineError::RollbackFailed {
                    path: backup.path.clone(),
                    message: format!("failed to recreate parent directory: {e}"),
                })?;
        }
        let content = backup.prior_content.as_deref().unwrap_or_default();
        tokio::fs::write(&backup.path, content)
            .await
            .map_err(|e| EngineError::RollbackFailed {
                path: backup.path.clone(),
                message: format!("failed to restore content: {e}"),
            })?;
        tracing::debug!("Restored {}", backup.path.display());
    } else {
        match tokio::fs::remove_file(&backup.path).await {
            Ok(()) => tracing::debug!("Removed created file {}", backup.path.display()),
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => {
                return Err(EngineError::RollbackFailed {
                    path: backup.path.clone(),
                    message: format!("failed to remove created file: {e}"),
                });
            }
        }
    }
    Ok(())
}
