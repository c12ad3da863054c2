//! txedit - transactional multi-file edits for a source tree.
//!
//! Loads an edit plan (a JSON array of edits), then either previews it
//! (read-only) or applies it as one transaction: every edit succeeds and the
//! verifier passes, or the tree is restored to its prior state.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use txedit_engine::{EngineConfig, FileEdit, TransactionManager, VerifyConfig};

#[derive(Debug, Parser)]
#[command(name = "txedit", version, about = "Transactional multi-file edits for a source tree")]
struct Cli {
    /// Project root (defaults to the current directory).
    #[arg(long, global = true)]
    root: Option<PathBuf>,

    /// Emit machine-readable JSON instead of a summary.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show what a plan would change, without touching the tree.
    Preview {
        /// Path to the edit plan (JSON array of edits).
        plan: PathBuf,
    },
    /// Apply a plan as a single transaction.
    Apply {
        /// Path to the edit plan (JSON array of edits).
        plan: PathBuf,

        /// Verification command, whitespace-separated (e.g. "npx tsc --noEmit").
        #[arg(long)]
        verify_cmd: Option<String>,

        /// Skip the verification gate entirely.
        #[arg(long)]
        no_verify: bool,

        /// Verification timeout in seconds.
        #[arg(long, default_value_t = 120)]
        timeout: u64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let root = match cli.root {
        Some(root) => root,
        None => std::env::current_dir().context("failed to resolve current directory")?,
    };

    match cli.command {
        Commands::Preview { plan } => preview(&root, &plan, cli.json).await,
        Commands::Apply {
            plan,
            verify_cmd,
            no_verify,
            timeout,
        } => {
            let verify = build_verify_config(verify_cmd.as_deref(), no_verify, timeout);
            apply(&root, &plan, verify, cli.json).await
        }
    }
}

/// Reads and parses an edit plan file.
fn load_plan(path: &Path) -> Result<Vec<FileEdit>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read plan {}", path.display()))?;
    let edits: Vec<FileEdit> = serde_json::from_str(&raw)
        .with_context(|| format!("failed to parse plan {}", path.display()))?;
    anyhow::ensure!(!edits.is_empty(), "plan {} contains no edits", path.display());
    Ok(edits)
}

/// Translates the verification flags into a gate configuration.
fn build_verify_config(verify_cmd: Option<&str>, no_verify: bool, timeout_secs: u64) -> VerifyConfig {
    if no_verify {
        return VerifyConfig::disabled();
    }
    let mut config = VerifyConfig::default().with_timeout(Duration::from_secs(timeout_secs));
    if let Some(cmd) = verify_cmd {
        let command: Vec<String> = cmd.split_whitespace().map(str::to_string).collect();
        // An explicit command overrides marker-file detection.
        config = config.with_command(command).with_marker_files(Vec::new());
    }
    config
}

async fn preview(root: &Path, plan: &Path, json: bool) -> Result<()> {
    let edits = load_plan(plan)?;
    let manager = TransactionManager::new(EngineConfig::new(root));
    let report = manager.preview_transaction(&edits).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    print_path_section("Would create", report.files_to_create.iter());
    print_path_section("Would modify", report.files_to_modify.iter());
    print_path_section("Would delete", report.files_to_delete.iter());
    if !report.import_updates.is_empty() {
        println!("Import updates:");
        for update in &report.import_updates {
            println!(
                "  {}: {} -> {}",
                update.file.display(),
                update.old_specifier,
                update.new_specifier
            );
        }
    }
    Ok(())
}

async fn apply(root: &Path, plan: &Path, verify: VerifyConfig, json: bool) -> Result<()> {
    let edits = load_plan(plan)?;
    let mut manager = TransactionManager::new(EngineConfig::new(root).with_verify(verify));
    manager.begin_transaction(edits)?;
    let result = manager.commit_transaction().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else if result.success {
        println!("Transaction complete: {} file(s) modified", result.files_modified.len());
        for path in &result.files_modified {
            println!("  {}", path.display());
        }
    } else {
        if result.rollback_performed {
            eprintln!("Transaction failed, all changes rolled back:");
        } else {
            eprintln!("Transaction failed AND rollback failed; inspect the tree manually:");
        }
        for error in &result.errors {
            eprintln!("  {error}");
        }
    }

    if !result.success {
        std::process::exit(1);
    }
    Ok(())
}

fn print_path_section<'a>(label: &str, paths: impl ExactSizeIterator<Item = &'a PathBuf>) {
    if paths.len() == 0 {
        return;
    }
    println!("{label}:");
    for path in paths {
        println!("  {}", path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;
    use txedit_engine::EditOp;

    #[test]
    fn plan_parses_operations() {
        let temp = TempDir::new().unwrap();
        let plan = temp.path().join("plan.json");
        fs::write(
            &plan,
            r#"[
                {"path": "a.ts", "op": "create", "content": "export const a = 1;\n"},
                {"path": "old/name.ts", "op": "rename", "new_path": "new/name.ts"},
                {"path": "b.ts", "op": "delete"}
            ]"#,
        )
        .unwrap();

        let edits = load_plan(&plan).unwrap();
        assert_eq!(edits.len(), 3);
        assert_eq!(edits[0].op, EditOp::Create);
        assert_eq!(edits[1].op, EditOp::Rename);
        assert_eq!(edits[1].new_path.as_deref(), Some(Path::new("new/name.ts")));
        assert_eq!(edits[2].op, EditOp::Delete);
    }

    #[test]
    fn empty_plan_is_rejected() {
        let temp = TempDir::new().unwrap();
        let plan = temp.path().join("plan.json");
        fs::write(&plan, "[]").unwrap();
        assert!(load_plan(&plan).is_err());
    }

    #[test]
    fn malformed_plan_is_rejected() {
        let temp = TempDir::new().unwrap();
        let plan = temp.path().join("plan.json");
        fs::write(&plan, r#"[{"path": "a.ts", "op": "sideways"}]"#).unwrap();
        assert!(load_plan(&plan).is_err());
    }

    #[test]
    fn verify_flags_translate() {
        let disabled = build_verify_config(Some("npx tsc --noEmit"), true, 30);
        assert!(disabled.command.is_empty());

        let custom = build_verify_config(Some("cargo check --quiet"), false, 30);
        assert_eq!(custom.command, vec!["cargo", "check", "--quiet"]);
        assert!(custom.marker_files.is_empty());
        assert_eq!(custom.timeout, Duration::from_secs(30));

        let default = build_verify_config(None, false, 120);
        assert_eq!(default.command[0], "npx");
        assert!(!default.marker_files.is_empty());
    }
}
