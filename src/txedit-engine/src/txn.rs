//! Transaction lifecycle and the manager that owns it.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use uuid::Uuid;

use txedit_refs::{ImportUpdate, ReferenceScanner, apply_import_update};

use crate::apply;
use crate::backup::BackupStore;
use crate::config::EngineConfig;
use crate::edit::{EditOp, FileEdit};
use crate::error::{EngineError, EngineResult};
use crate::verify::VerificationGate;

/// Identifier of a transaction.
pub type TransactionId = Uuid;

/// The transaction state machine.
///
/// `Pending → Executing → {Completed | RolledBack | Failed}`. `Failed` is
/// reached only when rollback itself could not be completed; the filesystem
/// may then be partially mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionStatus {
    Pending,
    Executing,
    Completed,
    RolledBack,
    Failed,
}

impl TransactionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::RolledBack | Self::Failed)
    }
}

/// One atomic batch of file edits.
///
/// Created by [`TransactionManager::begin_transaction`], mutated only by the
/// manager during commit/rollback, and immutable once terminal, at which
/// point it lives in the manager's history.
#[derive(Debug, Clone, Serialize)]
pub struct Transaction {
    pub id: TransactionId,
    pub edits: Vec<FileEdit>,
    pub backups: BackupStore,
    pub import_updates: Vec<ImportUpdate>,
    pub status: TransactionStatus,
    pub started_at: DateTime<Utc>,
}

impl Transaction {
    fn new(edits: Vec<FileEdit>) -> Self {
        Self {
            id: Uuid::new_v4(),
            edits,
            backups: BackupStore::new(),
            import_updates: Vec::new(),
            status: TransactionStatus::Pending,
            started_at: Utc::now(),
        }
    }
}

/// The outcome handed back to the caller after commit.
#[derive(Debug, Clone, Serialize)]
pub struct TransactionResult {
    pub success: bool,
    pub files_modified: BTreeSet<PathBuf>,
    pub errors: Vec<String>,
    pub import_updates: Vec<ImportUpdate>,
    /// `false` together with `success == false` signals the documented
    /// partial-consistency hazard: rollback itself failed and the tree needs
    /// manual inspection.
    pub rollback_performed: bool,
}

/// A read-only dry run of a would-be transaction.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PreviewReport {
    pub files_to_modify: BTreeSet<PathBuf>,
    pub files_to_create: BTreeSet<PathBuf>,
    pub files_to_delete: BTreeSet<PathBuf>,
    pub import_updates: Vec<ImportUpdate>,
}

/// Hooks for transaction lifecycle notification.
///
/// `on_start` fires before any filesystem mutation; `on_complete` fires after
/// the terminal state transition.
pub trait TransactionObserver: Send + Sync {
    fn on_start(&self, _txn: &Transaction) {}
    fn on_complete(&self, _txn: &Transaction, _result: &TransactionResult) {}
}

/// Owns the single active transaction, its state machine, and history.
///
/// An explicitly constructed, caller-owned value: the single-active-
/// transaction invariant is a field on this instance, not process-wide
/// state. `&mut self` on every state-changing operation is the whole
/// concurrency story; there is exactly one manager and it never reenters
/// commit.
pub struct TransactionManager {
    config: EngineConfig,
    active: Option<Transaction>,
    history: Vec<Transaction>,
    observers: Vec<Box<dyn TransactionObserver>>,
}

impl TransactionManager {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            active: None,
            history: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Registers a lifecycle observer.
    pub fn add_observer(&mut self, observer: Box<dyn TransactionObserver>) {
        self.observers.push(observer);
    }

    /// Whether a transaction is pending or executing.
    pub fn has_active_transaction(&self) -> bool {
        self.active.is_some()
    }

    /// Terminal transactions, oldest first. Unbounded for this scope.
    pub fn history(&self) -> &[Transaction] {
        &self.history
    }

    /// Starts a transaction over the given edits.
    ///
    /// Rejects nesting outright: a second `begin` while one transaction is
    /// pending or executing fails with [`EngineError::TransactionActive`] and
    /// leaves the existing transaction untouched. Every edit is validated up
    /// front; the edit list is stored verbatim (the engine never reorders,
    /// callers order logically dependent edits themselves).
    pub fn begin_transaction(&mut self, edits: Vec<FileEdit>) -> EngineResult<TransactionId> {
        if self.active.is_some() {
            return Err(EngineError::TransactionActive);
        }
        for edit in &edits {
            edit.validate()?;
        }

        let txn = Transaction::new(edits);
        let id = txn.id;
        tracing::info!("Transaction {} begun with {} edit(s)", id, txn.edits.len());
        self.active = Some(txn);
        Ok(id)
    }

    /// Explicit caller-triggered abort of a not-yet-committed transaction.
    ///
    /// Nothing has been mutated, so there is no filesystem work: the
    /// transaction is marked rolled back and archived.
    pub fn rollback_transaction(&mut self) -> EngineResult<()> {
        let mut txn = self.active.take().ok_or(EngineError::NoActiveTransaction)?;
        txn.status = TransactionStatus::RolledBack;
        tracing::info!("Transaction {} aborted before commit", txn.id);
        self.history.push(txn);
        Ok(())
    }

    /// Commits the active transaction.
    ///
    /// The sequence is fixed: snapshot every path that could be affected,
    /// compute import updates for renames, apply edits in caller order, apply
    /// import updates, run the verification gate. Verification failure (and
    /// any unexpected failure along the way) triggers rollback; both paths
    /// converge on the same restore routine. The transaction always ends in
    /// history with the active slot cleared, so a new `begin` is legal
    /// immediately afterward.
    ///
    /// Errors only when no transaction is active; every commit failure is
    /// folded into the returned [`TransactionResult`].
    pub async fn commit_transaction(&mut self) -> EngineResult<TransactionResult> {
        let mut txn = self.active.take().ok_or(EngineError::NoActiveTransaction)?;
        txn.status = TransactionStatus::Executing;
        tracing::info!("Committing transaction {}", txn.id);

        for observer in &self.observers {
            observer.on_start(&txn);
        }

        let result = match self.run_commit(&mut txn).await {
            Ok(files_modified) => {
                txn.status = TransactionStatus::Completed;
                tracing::info!(
                    "Transaction {} completed, {} file(s) modified",
                    txn.id,
                    files_modified.len()
                );
                TransactionResult {
                    success: true,
                    files_modified,
                    errors: Vec::new(),
                    import_updates: txn.import_updates.clone(),
                    rollback_performed: false,
                }
            }
            Err(err) => self.roll_back(&mut txn, err).await,
        };

        for observer in &self.observers {
            observer.on_complete(&txn, &result);
        }
        self.history.push(txn);
        Ok(result)
    }

    /// Pure, read-only dry run: reference scanning but no mutation, no
    /// backups, no verification.
    pub async fn preview_transaction(&self, edits: &[FileEdit]) -> EngineResult<PreviewReport> {
        for edit in edits {
            edit.validate()?;
        }

        let mut report = PreviewReport::default();
        for edit in edits {
            let path = apply::resolve(&self.config.root, &edit.path);
            match edit.op {
                EditOp::Create => {
                    report.files_to_create.insert(path);
                }
                EditOp::Modify => {
                    report.files_to_modify.insert(path);
                }
                EditOp::Delete => {
                    report.files_to_delete.insert(path);
                }
                EditOp::Rename => {
                    let new_path = apply::resolve(
                        &self.config.root,
                        edit.new_path.as_deref().unwrap_or(&edit.path),
                    );
                    report.files_to_delete.insert(path);
                    report.files_to_create.insert(new_path);
                }
            }
        }

        let scanner = ReferenceScanner::new(self.config.scan.clone());
        report.import_updates = scanner
            .compute_import_updates(&self.rename_pairs(edits))
            .await?;
        for update in &report.import_updates {
            report.files_to_modify.insert(update.file.clone());
        }

        Ok(report)
    }

    /// Steps 1–5 of the commit sequence. Any error unwinds to the rollback
    /// path in `commit_transaction`.
    async fn run_commit(&self, txn: &mut Transaction) -> EngineResult<BTreeSet<PathBuf>> {
        let scanner = ReferenceScanner::new(self.config.scan.clone());
        let rename_pairs = self.rename_pairs(&txn.edits);

        // Paths whose importers must be snapshotted: renamed and deleted
        // sources.
        let mut removal_candidates: Vec<PathBuf> = rename_pairs
            .iter()
            .map(|(old, _)| old.clone())
            .collect();
        for edit in &txn.edits {
            if edit.op == EditOp::Delete {
                removal_candidates.push(apply::resolve(&self.config.root, &edit.path));
            }
        }

        let referencing = scanner.find_referencing_files(&removal_candidates).await?;

        // Snapshot everything that could be affected, before any mutation.
        let mut snapshot_paths: Vec<PathBuf> = Vec::new();
        for edit in &txn.edits {
            snapshot_paths.push(apply::resolve(&self.config.root, &edit.path));
            if let Some(new_path) = &edit.new_path {
                snapshot_paths.push(apply::resolve(&self.config.root, new_path));
            }
        }
        snapshot_paths.extend(referencing.iter().cloned());
        txn.backups.snapshot(&snapshot_paths).await?;

        txn.import_updates = scanner.compute_import_updates(&rename_pairs).await?;

        // Apply edits in caller order.
        let mut files_modified = BTreeSet::new();
        for edit in &txn.edits {
            apply::apply_edit(&self.config.root, edit).await?;
            let touched = match edit.op {
                EditOp::Rename => apply::resolve(
                    &self.config.root,
                    edit.new_path.as_deref().unwrap_or(&edit.path),
                ),
                _ => apply::resolve(&self.config.root, &edit.path),
            };
            files_modified.insert(touched);
        }

        // Apply import updates.
        for update in &txn.import_updates {
            let content = tokio::fs::read_to_string(&update.file).await.map_err(|source| {
                EngineError::Read {
                    path: update.file.clone(),
                    source,
                }
            })?;
            let (rewritten, replaced) = apply_import_update(&content, update)?;
            if replaced > 0 {
                tokio::fs::write(&update.file, rewritten)
                    .await
                    .map_err(|source| EngineError::Write {
                        path: update.file.clone(),
                        source,
                    })?;
                files_modified.insert(update.file.clone());
            }
        }

        let gate = VerificationGate::new(self.config.verify.clone());
        gate.run(&self.config.root).await?;

        Ok(files_modified)
    }

    /// The converged rollback routine for both the controlled
    /// verification-failure path and the unexpected-exception path.
    async fn roll_back(&self, txn: &mut Transaction, err: EngineError) -> TransactionResult {
        if err.is_verification_failure() {
            tracing::warn!("Transaction {} failed verification, rolling back", txn.id);
        } else {
            tracing::warn!("Transaction {} failed mid-commit, rolling back: {err}", txn.id);
        }

        let mut errors = match &err {
            EngineError::VerificationFailed { diagnostics } => diagnostics.clone(),
            other => vec![other.to_string()],
        };

        match txn.backups.restore_all().await {
            Ok(()) => {
                txn.status = TransactionStatus::RolledBack;
                tracing::info!(
                    "Transaction {} rolled back ({} backup(s) restored)",
                    txn.id,
                    txn.backups.len()
                );
                TransactionResult {
                    success: false,
                    files_modified: BTreeSet::new(),
                    errors,
                    import_updates: txn.import_updates.clone(),
                    rollback_performed: true,
                }
            }
            Err(rollback_err) => {
                txn.status = TransactionStatus::Failed;
                tracing::error!(
                    "Rollback of transaction {} failed, tree may be partially mutated: {rollback_err}",
                    txn.id
                );
                errors.push(rollback_err.to_string());
                TransactionResult {
                    success: false,
                    files_modified: BTreeSet::new(),
                    errors,
                    import_updates: txn.import_updates.clone(),
                    rollback_performed: false,
                }
            }
        }
    }

    fn rename_pairs(&self, edits: &[FileEdit]) -> Vec<(PathBuf, PathBuf)> {
        edits
            .iter()
            .filter(|e| e.op == EditOp::Rename)
            .filter_map(|e| {
                e.new_path.as_ref().map(|new_path| {
                    (
                        apply::resolve(&self.config.root, &e.path),
                        apply::resolve(&self.config.root, new_path),
                    )
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::edit::LineChange;
    use crate::verify::VerifyConfig;
    use pretty_assertions::assert_eq;
    use std::fs;
    use std::path::Path;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;

    fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, content).unwrap();
        path
    }

    fn sh(script: &str) -> Vec<String> {
        vec!["sh".to_string(), "-c".to_string(), script.to_string()]
    }

    /// A manager whose verification gate runs a real command.
    fn manager_with_verifier(root: &Path, script: &str) -> TransactionManager {
        let verify = VerifyConfig::default()
            .with_command(sh(script))
            .with_marker_files(Vec::new());
        TransactionManager::new(EngineConfig::new(root).with_verify(verify))
    }

    fn manager(root: &Path) -> TransactionManager {
        TransactionManager::new(EngineConfig::new(root).with_verify(VerifyConfig::disabled()))
    }

    #[tokio::test]
    async fn rename_propagates_to_importers() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "old/name.ts", "export const foo = 1;\n");
        let consumer = write_file(root, "consumer.ts", "import { foo } from './old/name';\n");

        let mut mgr = manager_with_verifier(root, "exit 0");
        mgr.begin_transaction(vec![FileEdit::rename("old/name.ts", "new/name.ts")])
            .unwrap();
        let result = mgr.commit_transaction().await.unwrap();

        assert!(result.success);
        assert!(!result.rollback_performed);
        assert!(result.files_modified.contains(&root.join("new/name.ts")));
        assert!(result.files_modified.contains(&consumer));
        assert_eq!(result.import_updates.len(), 1);
        assert_eq!(result.import_updates[0].old_specifier, "./old/name");
        assert_eq!(result.import_updates[0].new_specifier, "./new/name");

        assert!(!root.join("old/name.ts").exists());
        assert_eq!(
            fs::read_to_string(root.join("new/name.ts")).unwrap(),
            "export const foo = 1;\n"
        );
        let rewritten = fs::read_to_string(&consumer).unwrap();
        assert!(rewritten.contains("'./new/name'"));
        assert!(!rewritten.contains("'./old/name'"));

        assert!(!mgr.has_active_transaction());
        assert_eq!(mgr.history().len(), 1);
        assert_eq!(mgr.history()[0].status, TransactionStatus::Completed);
    }

    #[tokio::test]
    async fn verification_failure_restores_tree_byte_identically() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "a.ts", "export const a = 1;\n");
        write_file(root, "b.ts", "export const b = 2;\n");
        let consumer = write_file(root, "c.ts", "import { a } from './a';\n");

        let mut mgr = manager_with_verifier(root, "echo 'x.ts(1,1): error TS1'; exit 1");
        mgr.begin_transaction(vec![
            FileEdit::create("fresh.ts", "export const f = 0;\n"),
            FileEdit::modify("b.ts", "export const b = 99;\n"),
            FileEdit::rename("a.ts", "lib/a.ts"),
        ])
        .unwrap();
        let result = mgr.commit_transaction().await.unwrap();

        assert!(!result.success);
        assert!(result.rollback_performed);
        assert_eq!(result.errors, vec!["x.ts(1,1): error TS1".to_string()]);

        // Byte-identical pre-commit state for every touched path.
        assert_eq!(fs::read_to_string(root.join("a.ts")).unwrap(), "export const a = 1;\n");
        assert_eq!(fs::read_to_string(root.join("b.ts")).unwrap(), "export const b = 2;\n");
        assert_eq!(fs::read_to_string(&consumer).unwrap(), "import { a } from './a';\n");
        assert!(!root.join("fresh.ts").exists());
        assert!(!root.join("lib/a.ts").exists());

        assert_eq!(mgr.history()[0].status, TransactionStatus::RolledBack);
    }

    #[tokio::test]
    async fn two_edits_to_one_path_restore_the_original() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "a.ts", "original\n");

        let mut mgr = manager_with_verifier(root, "exit 1");
        mgr.begin_transaction(vec![
            FileEdit::modify("a.ts", "intermediate\n"),
            FileEdit::modify("a.ts", "final\n"),
        ])
        .unwrap();
        let result = mgr.commit_transaction().await.unwrap();

        assert!(!result.success);
        assert!(result.rollback_performed);
        // The first snapshot wins: rollback restores the pre-transaction
        // content, never the intermediate one.
        assert_eq!(fs::read_to_string(root.join("a.ts")).unwrap(), "original\n");
    }

    #[tokio::test]
    async fn second_begin_is_rejected() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "a.ts", "x\n");

        let mut mgr = manager(root);
        let id = mgr
            .begin_transaction(vec![FileEdit::modify("a.ts", "y\n")])
            .unwrap();
        let second = mgr.begin_transaction(vec![FileEdit::delete("a.ts")]);
        assert!(matches!(second, Err(EngineError::TransactionActive)));

        // The first transaction is untouched and still commits.
        assert!(mgr.has_active_transaction());
        let result = mgr.commit_transaction().await.unwrap();
        assert!(result.success);
        assert_eq!(mgr.history()[0].id, id);
    }

    #[tokio::test]
    async fn preview_has_no_side_effects() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let doomed = write_file(root, "doomed.ts", "export const d = 1;\n");
        let consumer = write_file(root, "consumer.ts", "import { d } from './doomed';\n");

        let mgr = manager(root);
        let report = mgr
            .preview_transaction(&[
                FileEdit::delete("doomed.ts"),
                FileEdit::create("fresh.ts", "x\n"),
                FileEdit::rename("consumer.ts", "app/consumer.ts"),
            ])
            .await
            .unwrap();

        assert!(report.files_to_delete.contains(&doomed));
        assert!(report.files_to_delete.contains(&consumer));
        assert!(report.files_to_create.contains(&root.join("fresh.ts")));
        assert!(report.files_to_create.contains(&root.join("app/consumer.ts")));

        // Nothing moved, nothing created, nothing deleted, no transaction.
        assert!(doomed.exists());
        assert!(consumer.exists());
        assert!(!root.join("fresh.ts").exists());
        assert!(!root.join("app").exists());
        assert!(!mgr.has_active_transaction());
        assert!(mgr.history().is_empty());
    }

    #[tokio::test]
    async fn preview_reports_import_updates_for_renames() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "a.ts", "export const foo = 1;\n");
        let consumer = write_file(root, "b.ts", "import { foo } from './a';\n");

        let mgr = manager(root);
        let report = mgr
            .preview_transaction(&[FileEdit::rename("a.ts", "lib/a.ts")])
            .await
            .unwrap();

        assert_eq!(report.import_updates.len(), 1);
        assert_eq!(report.import_updates[0].file, consumer);
        assert!(report.files_to_modify.contains(&consumer));
        // The consumer still imports the old specifier.
        assert!(fs::read_to_string(&consumer).unwrap().contains("'./a'"));
    }

    #[tokio::test]
    async fn line_changes_commit_through_the_engine() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "a.ts", "one\ntwo\nthree\n");

        let mut mgr = manager(root);
        mgr.begin_transaction(vec![FileEdit::modify_lines(
            "a.ts",
            vec![
                LineChange {
                    start_line: 1,
                    end_line: 1,
                    old_text: "one".to_string(),
                    new_text: "ONE".to_string(),
                },
                LineChange {
                    start_line: 3,
                    end_line: 3,
                    old_text: "three".to_string(),
                    new_text: "THREE".to_string(),
                },
            ],
        )])
        .unwrap();
        let result = mgr.commit_transaction().await.unwrap();

        assert!(result.success);
        assert_eq!(fs::read_to_string(root.join("a.ts")).unwrap(), "ONE\ntwo\nTHREE\n");
    }

    #[tokio::test]
    async fn midway_failure_rolls_back_earlier_edits() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        let mut mgr = manager(root);
        mgr.begin_transaction(vec![
            FileEdit::create("made.ts", "x\n"),
            // Deleting a missing file propagates and aborts the commit.
            FileEdit::delete("missing.ts"),
        ])
        .unwrap();
        let result = mgr.commit_transaction().await.unwrap();

        assert!(!result.success);
        assert!(result.rollback_performed);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("missing.ts"));
        // The create was undone.
        assert!(!root.join("made.ts").exists());
        assert_eq!(mgr.history()[0].status, TransactionStatus::RolledBack);
    }

    #[tokio::test]
    async fn explicit_rollback_before_commit() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "a.ts", "x\n");

        let mut mgr = manager(root);
        mgr.begin_transaction(vec![FileEdit::delete("a.ts")]).unwrap();
        mgr.rollback_transaction().unwrap();

        assert!(!mgr.has_active_transaction());
        assert!(root.join("a.ts").exists());
        assert_eq!(mgr.history().len(), 1);
        assert_eq!(mgr.history()[0].status, TransactionStatus::RolledBack);

        // The slot is free again.
        assert!(
            mgr.begin_transaction(vec![FileEdit::modify("a.ts", "y\n")])
                .is_ok()
        );
    }

    #[tokio::test]
    async fn commit_without_begin_is_an_error() {
        let temp = TempDir::new().unwrap();
        let mut mgr = manager(temp.path());
        let result = mgr.commit_transaction().await;
        assert!(matches!(result, Err(EngineError::NoActiveTransaction)));

        let result = mgr.rollback_transaction();
        assert!(matches!(result, Err(EngineError::NoActiveTransaction)));
    }

    #[tokio::test]
    async fn invalid_edit_fails_begin() {
        let temp = TempDir::new().unwrap();
        let mut mgr = manager(temp.path());
        let bad = FileEdit {
            path: PathBuf::from("a.ts"),
            op: EditOp::Rename,
            content: None,
            new_path: None,
            line_changes: None,
        };
        assert!(matches!(
            mgr.begin_transaction(vec![bad]),
            Err(EngineError::InvalidEdit { .. })
        ));
        assert!(!mgr.has_active_transaction());
    }

    struct Recorder {
        events: Arc<Mutex<Vec<String>>>,
        watched: PathBuf,
    }

    impl TransactionObserver for Recorder {
        fn on_start(&self, txn: &Transaction) {
            // Start notification precedes any filesystem mutation.
            let untouched = !self.watched.exists();
            self.events
                .lock()
                .unwrap()
                .push(format!("start:{:?}:untouched={untouched}", txn.status));
        }

        fn on_complete(&self, txn: &Transaction, result: &TransactionResult) {
            self.events
                .lock()
                .unwrap()
                .push(format!("complete:{:?}:success={}", txn.status, result.success));
        }
    }

    #[tokio::test]
    async fn observers_bracket_the_commit() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        let events = Arc::new(Mutex::new(Vec::new()));

        let mut mgr = manager(root);
        mgr.add_observer(Box::new(Recorder {
            events: Arc::clone(&events),
            watched: root.join("made.ts"),
        }));

        mgr.begin_transaction(vec![FileEdit::create("made.ts", "x\n")])
            .unwrap();
        mgr.commit_transaction().await.unwrap();

        let events = events.lock().unwrap();
        assert_eq!(
            *events,
            vec![
                "start:Executing:untouched=true".to_string(),
                "complete:Completed:success=true".to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn history_accumulates_across_transactions() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "a.ts", "x\n");

        let mut mgr = manager(root);
        mgr.begin_transaction(vec![FileEdit::modify("a.ts", "y\n")])
            .unwrap();
        mgr.commit_transaction().await.unwrap();

        mgr.begin_transaction(vec![FileEdit::modify("a.ts", "z\n")])
            .unwrap();
        mgr.commit_transaction().await.unwrap();

        assert_eq!(mgr.history().len(), 2);
        assert!(mgr.history().iter().all(|t| t.status.is_terminal()));
        assert_eq!(fs::read_to_string(root.join("a.ts")).unwrap(), "z\n");
    }

    #[tokio::test]
    async fn delete_snapshots_importers_for_rollback() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        write_file(root, "a.ts", "export const a = 1;\n");
        write_file(root, "c.ts", "import { a } from './a';\n");

        let mut mgr = manager_with_verifier(root, "exit 1");
        mgr.begin_transaction(vec![FileEdit::delete("a.ts")]).unwrap();
        let result = mgr.commit_transaction().await.unwrap();

        assert!(!result.success);
        // The importer was captured before mutation even though deletes
        // produce no import updates.
        assert!(mgr.history()[0].backups.contains(&root.join("c.ts")));
        assert!(root.join("a.ts").exists());
    }
}
