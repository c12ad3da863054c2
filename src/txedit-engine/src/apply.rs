//! Filesystem edit primitives.
//!
//! None of these are idempotent; the transaction manager invokes each one at
//! most once per edit.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::edit::{EditOp, FileEdit, LineChange};
use crate::error::{EngineError, EngineResult};

/// Resolves an edit path against the project root.
pub fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Applies one edit. The edit is assumed to have passed
/// [`FileEdit::validate`].
pub async fn apply_edit(root: &Path, edit: &FileEdit) -> EngineResult<()> {
    let path = resolve(root, &edit.path);
    match edit.op {
        EditOp::Create => {
            let content = edit.content.as_deref().unwrap_or_default();
            create_file(&path, content).await
        }
        EditOp::Modify => {
            if let Some(content) = &edit.content {
                write_file(&path, content).await
            } else {
                let changes = edit.line_changes.as_deref().unwrap_or_default();
                modify_lines(&path, changes).await
            }
        }
        EditOp::Delete => delete_file(&path).await,
        EditOp::Rename => {
            let new_path = resolve(root, edit.new_path.as_deref().unwrap_or(&edit.path));
            rename_file(&path, &new_path).await
        }
    }
}

/// Creates parent directories recursively, then writes content. Overwrites
/// silently if the path exists (last writer wins).
pub async fn create_file(path: &Path, content: &str) -> EngineResult<()> {
    create_parents(path).await?;
    write_file(path, content).await
}

/// Removes the file; a missing file is an error and propagates.
pub async fn delete_file(path: &Path) -> EngineResult<()> {
    tokio::fs::remove_file(path)
        .await
        .map_err(|source| EngineError::Delete {
            path: path.to_path_buf(),
            source,
        })
}

/// Creates the destination's parent directories, then moves the file.
/// Refuses to overwrite an existing destination.
pub async fn rename_file(path: &Path, new_path: &Path) -> EngineResult<()> {
    match tokio::fs::metadata(new_path).await {
        Ok(_) => {
            return Err(EngineError::DestinationExists {
                path: new_path.to_path_buf(),
            });
        }
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(source) => {
            return Err(EngineError::Read {
                path: new_path.to_path_buf(),
                source,
            });
        }
    }

    create_parents(new_path).await?;
    tokio::fs::rename(path, new_path)
        .await
        .map_err(|source| EngineError::Rename {
            from: path.to_path_buf(),
            to: new_path.to_path_buf(),
            source,
        })
}

/// Applies line changes against the current line array.
///
/// Changes are processed in descending `start_line` order so that earlier
/// edits' line numbers remain valid despite length changes from later
/// (higher-line) edits. Each change's `old_text` must match the current
/// range text; an empty `new_text` removes the range.
pub async fn modify_lines(path: &Path, changes: &[LineChange]) -> EngineResult<()> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| EngineError::Read {
            path: path.to_path_buf(),
            source,
        })?;

    let rewritten = apply_line_changes(path, &content, changes)?;
    write_file(path, &rewritten).await
}

/// Pure line-splice logic, separated from I/O for testability.
pub fn apply_line_changes(
    path: &Path,
    content: &str,
    changes: &[LineChange],
) -> EngineResult<String> {
    let mut lines: Vec<String> = content.split('\n').map(str::to_string).collect();

    let mut ordered: Vec<&LineChange> = changes.iter().collect();
    ordered.sort_by(|a, b| b.start_line.cmp(&a.start_line));

    for change in ordered {
        let start = change.start_line;
        let end = change.end_line;
        if start == 0 || end < start || end > lines.len() {
            return Err(EngineError::LineOutOfBounds {
                path: path.to_path_buf(),
                start_line: start,
                end_line: end,
                line_count: lines.len(),
            });
        }

        let current = lines[start - 1..end].join("\n");
        if current != change.old_text {
            return Err(EngineError::LineMismatch {
                path: path.to_path_buf(),
                start_line: start,
                end_line: end,
            });
        }

        let replacement: Vec<String> = if change.new_text.is_empty() {
            Vec::new()
        } else {
            change.new_text.split('\n').map(str::to_string).collect()
        };
        lines.splice(start - 1..end, replacement);
    }

    Ok(lines.join("\n"))
}

async fn write_file(path: &Path, content: &str) -> EngineResult<()> {
    tokio::fs::write(path, content)
        .await
        .map_err(|source| EngineError::Write {
            path: path.to_path_buf(),
            source,
        })
}

async fn create_parents(path: &Path) -> EngineResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|source| EngineError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
    }
    Ok(())
}
