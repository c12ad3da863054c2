//! Transactional multi-file edit engine.
//!
//! Batches a set of file mutations (create, modify, delete, rename/move) and
//! applies them as a single unit that either fully succeeds, including
//! rewriting every import that pointed at a moved or deleted file, or is
//! rolled back to the exact prior on-disk state.
//!
//! The commit protocol is fixed: snapshot every path that could be touched,
//! compute import updates for renames, apply edits in caller order, apply
//! import updates, then run an external verification command. A failing
//! verifier (or any error along the way) restores every captured backup in
//! reverse capture order.
//!
//! # Example
//!
//! ```no_run
//! use txedit_engine::{EngineConfig, FileEdit, TransactionManager, VerifyConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), txedit_engine::EngineError> {
//!     let config = EngineConfig::new("/path/to/project")
//!         .with_verify(VerifyConfig::disabled());
//!     let mut manager = TransactionManager::new(config);
//!
//!     manager.begin_transaction(vec![
//!         FileEdit::rename("old/name.ts", "new/name.ts"),
//!     ])?;
//!     let result = manager.commit_transaction().await?;
//!     println!("success: {}, {} file(s) touched", result.success, result.files_modified.len());
//!     Ok(())
//! }
//! ```

mod apply;
mod backup;
mod config;
mod edit;
mod error;
mod txn;
mod verify;

pub use apply::apply_line_changes;
pub use backup::{BackupStore, FileBackup};
pub use config::EngineConfig;
pub use edit::{EditOp, FileEdit, LineChange};
pub use error::{EngineError, EngineResult};
pub use txn::{
    PreviewReport, Transaction, TransactionId, TransactionManager, TransactionObserver,
    TransactionResult, TransactionStatus,
};
pub use verify::{VerificationGate, VerifyConfig, VerifyOutcome};

// Re-exported so callers can consume scan results without a second import.
pub use txedit_refs::{ImportUpdate, ScanConfig};
