//! The edit data model.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{EngineError, EngineResult};

/// The kind of mutation a [`FileEdit`] requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditOp {
    Create,
    Modify,
    Delete,
    Rename,
}

/// A replacement of a 1-based, inclusive line range.
///
/// `old_text` is the expected current text of the range and is verified
/// before the splice; an empty `new_text` removes the range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineChange {
    pub start_line: usize,
    pub end_line: usize,
    pub old_text: String,
    pub new_text: String,
}

/// One requested file mutation.
///
/// Paths are interpreted relative to the engine's project root unless
/// absolute. Invariants: `rename` requires `new_path`; `modify` requires
/// exactly one of `content` or `line_changes`; `create` requires `content`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEdit {
    pub path: PathBuf,
    pub op: EditOp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_path: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_changes: Option<Vec<LineChange>>,
}

impl FileEdit {
    /// A create edit: write `content` to a new file.
    pub fn create(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            op: EditOp::Create,
            content: Some(content.into()),
            new_path: None,
            line_changes: None,
        }
    }

    /// A whole-content modify edit.
    pub fn modify(path: impl Into<PathBuf>, content: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            op: EditOp::Modify,
            content: Some(content.into()),
            new_path: None,
            line_changes: None,
        }
    }

    /// A line-based modify edit.
    pub fn modify_lines(path: impl Into<PathBuf>, changes: Vec<LineChange>) -> Self {
        Self {
            path: path.into(),
            op: EditOp::Modify,
            content: None,
            new_path: None,
            line_changes: Some(changes),
        }
    }

    /// A delete edit.
    pub fn delete(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            op: EditOp::Delete,
            content: None,
            new_path: None,
            line_changes: None,
        }
    }

    /// A rename/move edit.
    pub fn rename(path: impl Into<PathBuf>, new_path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            op: EditOp::Rename,
            content: None,
            new_path: Some(new_path.into()),
            line_changes: None,
        }
    }

    /// Checks the structural invariants of this edit.
    pub fn validate(&self) -> EngineResult<()> {
        match self.op {
            EditOp::Create => {
                if self.content.is_none() {
                    return Err(EngineError::invalid_edit(&self.path, "create requires content"));
                }
            }
            EditOp::Modify => match (&self.content, &self.line_changes) {
                (Some(_), Some(_)) | (None, None) => {
                    return Err(EngineError::invalid_edit(
                        &self.path,
                        "modify requires exactly one of content or line_changes",
                    ));
                }
                (None, Some(changes)) => {
                    if changes.is_empty() {
                        return Err(EngineError::invalid_edit(
                            &self.path,
                            "line_changes must not be empty",
                        ));
                    }
                    for change in changes {
                        if change.start_line == 0 || change.end_line < change.start_line {
                            return Err(EngineError::invalid_edit(
                                &self.path,
                                format!(
                                    "invalid line range {}..={}",
                                    change.start_line, change.end_line
                                ),
                            ));
                        }
                    }
                }
                (Some(_), None) => {}
            },
            EditOp::Delete => {}
            EditOp::Rename => {
                if self.new_path.is_none() {
                    return Err(EngineError::invalid_edit(&self.path, "rename requires new_path"));
                }
            }
        }
        Ok(())
    }
}
