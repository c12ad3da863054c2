//! Relative import specifier computation.

use std::path::{Component, Path};

/// Computes the import specifier `from_file` would use to reference
/// `to_file`.
///
/// The result is relative to `from_file`'s directory, uses forward slashes on
/// every platform, has the final extension stripped, and is prefixed with
/// `./` unless it already starts with `../`, matching conventional module
/// resolution.
///
/// Returns `None` when no relative path between the two can be computed
/// (e.g. one path is absolute and the other relative) or when the relative
/// path collapses to nothing.
pub fn relative_import_path(from_file: &Path, to_file: &Path) -> Option<String> {
    let base = from_file.parent().unwrap_or_else(|| Path::new(""));
    let relative = pathdiff::diff_paths(to_file, base)?.with_extension("");

    let mut parts: Vec<String> = Vec::new();
    for component in relative.components() {
        match component {
            Component::ParentDir => parts.push("..".to_string()),
            Component::Normal(name) => parts.push(name.to_string_lossy().into_owned()),
            Component::CurDir => {}
            // A root or prefix component means the paths were not comparable.
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }

    if parts.is_empty() {
        return None;
    }

    let joined = parts.join("/");
    if joined.starts_with("..") {
        Some(joined)
    } else {
        Some(format!("./{joined}"))
    }
}
