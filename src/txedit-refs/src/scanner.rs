//! Source tree walking and reference discovery.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;

use crate::config::ScanConfig;
use crate::error::{ScanError, ScanResult};
use crate::rewriter::{ImportUpdate, contains_reference};
use crate::specifier::relative_import_path;

/// Scans a source tree for files that textually reference given paths.
#[derive(Debug)]
pub struct ReferenceScanner {
    config: ScanConfig,
}

impl ReferenceScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Returns the scan configuration.
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Enumerates all source files under the project root.
    ///
    /// The walk respects .gitignore (when configured), skips hidden entries,
    /// prunes excluded directories, and filters to the configured source
    /// extensions. Walk errors are skipped with a trace rather than aborting
    /// the scan.
    pub fn source_files(&self) -> ScanResult<Vec<PathBuf>> {
        let root = &self.config.root;
        if !root.exists() {
            return Err(ScanError::RootNotFound(root.clone()));
        }
        if !root.is_dir() {
            return Err(ScanError::NotADirectory(root.clone()));
        }

        let mut builder = WalkBuilder::new(root);
        builder
            .hidden(true)
            .git_ignore(self.config.respect_gitignore)
            .git_global(self.config.respect_gitignore)
            .git_exclude(self.config.respect_gitignore);

        let exclude_dirs = self.config.exclude_dirs.clone();
        builder.filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            if !is_dir {
                return true;
            }
            entry
                .file_name()
                .to_str()
                .is_none_or(|name| !exclude_dirs.iter().any(|d| d == name))
        });

        let mut files = Vec::new();
        for entry in builder.build() {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::debug!("Skipping unreadable entry during scan: {e}");
                    continue;
                }
            };

            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }

            let path = entry.path();
            if !self.config.is_source_file(path) {
                continue;
            }

            if self.config.max_file_size > 0
                && let Ok(metadata) = entry.metadata()
                && metadata.len() > self.config.max_file_size
            {
                tracing::debug!("Skipping oversized file: {}", path.display());
                continue;
            }

            files.push(path.to_path_buf());
        }

        files.sort();
        Ok(files)
    }

    /// Finds all source files whose text references any of `candidates`.
    ///
    /// A file references a candidate when it contains the candidate's
    /// relative, extension-stripped import specifier in one of the accepted
    /// reference shapes. Candidate files themselves are never reported.
    pub async fn find_referencing_files(
        &self,
        candidates: &[PathBuf],
    ) -> ScanResult<BTreeSet<PathBuf>> {
        if candidates.is_empty() {
            return Ok(BTreeSet::new());
        }

        let files: Vec<PathBuf> = self
            .source_files()?
            .into_iter()
            .filter(|f| !candidates.contains(f))
            .collect();
        let contents = read_all(&files).await;

        let mut referencing = BTreeSet::new();
        for (file, content) in files.iter().zip(contents.iter()) {
            let Some(content) = content else { continue };
            for candidate in candidates {
                let Some(specifier) = relative_import_path(file, candidate) else {
                    continue;
                };
                if contains_reference(content, &specifier)? {
                    referencing.insert(file.clone());
                    break;
                }
            }
        }

        tracing::debug!(
            "Reference scan: {} of {} source files reference {} candidate path(s)",
            referencing.len(),
            files.len(),
            candidates.len()
        );
        Ok(referencing)
    }

    /// Computes the import updates required by a set of renames.
    ///
    /// For each rename `(old, new)` and each referencing file `f != old`, an
    /// update is emitted only when a reference pattern for the old specifier
    /// actually matches `f`'s content; a bare substring hit is not enough.
    pub async fn compute_import_updates(
        &self,
        renames: &[(PathBuf, PathBuf)],
    ) -> ScanResult<Vec<ImportUpdate>> {
        if renames.is_empty() {
            return Ok(Vec::new());
        }

        let files = self.source_files()?;
        let contents = read_all(&files).await;

        let mut updates = Vec::new();
        for (file, content) in files.iter().zip(contents.iter()) {
            let Some(content) = content else { continue };
            for (old_path, new_path) in renames {
                if file == old_path {
                    continue;
                }
                let Some(old_specifier) = relative_import_path(file, old_path) else {
                    continue;
                };
                let Some(new_specifier) = relative_import_path(file, new_path) else {
                    continue;
                };
                if contains_reference(content, &old_specifier)? {
                    updates.push(ImportUpdate {
                        file: file.clone(),
                        old_specifier,
                        new_specifier,
                    });
                }
            }
        }

        Ok(updates)
    }
}

/// Reads every file concurrently; unreadable files yield `None` and are
/// skipped by the caller.
async fn read_all(files: &[PathBuf]) -> Vec<Option<String>> {
    let reads = files.iter().map(|path| async move {
        match tokio::fs::read_to_string(path).await {
            Ok(content) => Some(content),
            Err(e) => {
                tracing::debug!("Skipping unreadable file {}: {e}", path.display());
                None
            }
        }
    });
    futures::future::join_all(reads).await
}
