//! Import reference scanning and rewriting.
//!
//! This crate finds source files that reference a given path through one of
//! three textual reference shapes (a `from`-style import, a dynamic
//! `import(...)` call, or a synchronous `require(...)` call) and computes
//! specifier-level rewrites when a file is renamed or moved.
//!
//! Detection is deliberately textual (regex over file contents, not an AST).
//! Specifiers are compared in their relative, extension-stripped form
//! (`./utils/a`), which is also the form rewrites are expressed in.
//!
//! # Example
//!
//! ```no_run
//! use std::path::PathBuf;
//! use txedit_refs::{ReferenceScanner, ScanConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), txedit_refs::ScanError> {
//!     let scanner = ReferenceScanner::new(ScanConfig::new("/path/to/project"));
//!     let renames = vec![(
//!         PathBuf::from("/path/to/project/a.ts"),
//!         PathBuf::from("/path/to/project/lib/a.ts"),
//!     )];
//!     for update in scanner.compute_import_updates(&renames).await? {
//!         println!(
//!             "{}: {} -> {}",
//!             update.file.display(),
//!             update.old_specifier,
//!             update.new_specifier
//!         );
//!     }
//!     Ok(())
//! }
//! ```

mod config;
mod error;
mod rewriter;
mod scanner;
mod specifier;

pub use config::ScanConfig;
pub use error::{ScanError, ScanResult};
pub use rewriter::{ImportUpdate, apply_import_update};
pub use scanner::ReferenceScanner;
pub use specifier::relative_import_path;
