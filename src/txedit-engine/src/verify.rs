//! The verification gate.
//!
//! Runs an external, configurable verification command (typically a
//! type-checker) scoped to the project root with a bounded timeout, and
//! interprets its exit status: zero is a pass, non-zero is a failure whose
//! stdout/stderr form the diagnostic corpus. Timeout or failure to spawn the
//! process is treated as verification failure (fail-closed).

use std::path::Path;
use std::time::Duration;
use tokio::process::Command;

use crate::error::{EngineError, EngineResult};

/// Default verification timeout.
const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// How many trailing output lines to surface when no line matches the error
/// marker, so a failure never comes back with an empty reason.
const FALLBACK_TAIL_LINES: usize = 20;

/// Configuration for the verification gate.
#[derive(Debug, Clone)]
pub struct VerifyConfig {
    /// The verification command and its arguments. An empty command disables
    /// the gate entirely (always-pass).
    pub command: Vec<String>,

    /// Time budget for the command.
    pub timeout: Duration,

    /// Token a diagnostic line must contain to be surfaced to the caller.
    pub error_marker: String,

    /// Marker files whose presence indicates the project uses the
    /// verification tool. If none exist under the root, verification is
    /// skipped. An empty list means "always run".
    pub marker_files: Vec<String>,
}

impl Default for VerifyConfig {
    fn default() -> Self {
        Self {
            command: vec!["npx".to_string(), "tsc".to_string(), "--noEmit".to_string()],
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            error_marker: "error".to_string(),
            marker_files: vec!["tsconfig.json".to_string()],
        }
    }
}

impl VerifyConfig {
    /// A gate that never runs anything and always passes.
    pub fn disabled() -> Self {
        Self {
            command: Vec::new(),
            ..Default::default()
        }
    }

    pub fn with_command(mut self, command: Vec<String>) -> Self {
        self.command = command;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_error_marker(mut self, marker: impl Into<String>) -> Self {
        self.error_marker = marker.into();
        self
    }

    pub fn with_marker_files(mut self, files: Vec<String>) -> Self {
        self.marker_files = files;
        self
    }
}

/// Why the gate let a transaction through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    /// The command ran and exited zero.
    Passed,
    /// No command configured, or no marker file present under the root.
    Skipped,
}

/// Runs the configured verification command against a project root.
#[derive(Debug, Clone)]
pub struct VerificationGate {
    config: VerifyConfig,
}

impl VerificationGate {
    pub fn new(config: VerifyConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &VerifyConfig {
        &self.config
    }

    /// Runs verification. `Ok` means the transaction may be kept; `Err` is
    /// either [`EngineError::VerificationFailed`] with parsed diagnostics or
    /// [`EngineError::VerificationTimeout`], both of which trigger rollback.
    pub async fn run(&self, root: &Path) -> EngineResult<VerifyOutcome> {
        let command = &self.config.command;
        if command.is_empty() {
            tracing::debug!("Verification disabled, passing trivially");
            return Ok(VerifyOutcome::Skipped);
        }

        if !self.config.marker_files.is_empty()
            && !self
                .config
                .marker_files
                .iter()
                .any(|m| root.join(m).exists())
        {
            tracing::debug!("No verification marker file under {}, skipping", root.display());
            return Ok(VerifyOutcome::Skipped);
        }

        tracing::info!("Running verification: {}", command.join(" "));
        let future = Command::new(&command[0])
            .args(&command[1..])
            .current_dir(root)
            .kill_on_drop(true)
            .output();

        let output = match tokio::time::timeout(self.config.timeout, future).await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                // Fail closed: a verifier that cannot run cannot vouch for
                // the tree.
                return Err(EngineError::VerificationFailed {
                    diagnostics: vec![format!(
                        "failed to run verification command '{}': {e}",
                        command.join(" ")
                    )],
                });
            }
            Err(_) => {
                return Err(EngineError::VerificationTimeout {
                    timeout_secs: self.config.timeout.as_secs(),
                });
            }
        };

        if output.status.success() {
            tracing::info!("Verification passed");
            return Ok(VerifyOutcome::Passed);
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let diagnostics = parse_diagnostics(&stdout, &stderr, &self.config.error_marker)
            .unwrap_or_else(|| {
                vec![format!(
                    "verification command exited with {}",
                    output.status
                )]
            });

        tracing::warn!("Verification failed with {} diagnostic line(s)", diagnostics.len());
        Err(EngineError::VerificationFailed { diagnostics })
    }
}

/// Filters the diagnostic corpus down to lines containing the error marker,
/// falling back to the tail of the raw output when nothing matches. Returns
/// `None` when there is no output at all.
fn parse_diagnostics(stdout: &str, stderr: &str, marker: &str) -> Option<Vec<String>> {
    let all_lines: Vec<&str> = stdout
        .lines()
        .chain(stderr.lines())
        .filter(|l| !l.trim().is_empty())
        .collect();

    let matching: Vec<String> = all_lines
        .iter()
        .filter(|l| l.contains(marker))
        .map(|l| l.to_string())
        .collect();

    if !matching.is_empty() {
        return Some(matching);
    }
    if all_lines.is_empty() {
        return None;
    }

    let tail_start = all_lines.len().saturating_sub(FALLBACK_TAIL_LINES);
    Some(all_lines[tail_start..].iter().map(|l| l.to_string()).collect())
}
