//! Specifier rewriting for renamed files.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{ScanError, ScanResult};

/// A discovered textual rewrite: one referencing file, one specifier change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportUpdate {
    /// The file whose imports need rewriting.
    pub file: PathBuf,
    /// Specifier currently in the file, e.g. `./old/name`.
    pub old_specifier: String,
    /// Specifier it should become, e.g. `./new/name`.
    pub new_specifier: String,
}

/// The three accepted reference shapes, as regex fragments around a quoted
/// specifier. `{q}` is the quote character, `{spec}` the escaped specifier.
const REFERENCE_SHAPES: &[(&str, &str)] = &[
    // `import { x } from './a'` / `export { x } from './a'`
    (r"(from\s+)", r""),
    // dynamic `import('./a')`
    (r"(import\s*\(\s*)", r"(\s*\))"),
    // synchronous `require('./a')`
    (r"(require\s*\(\s*)", r"(\s*\))"),
];

/// Compiles the detection patterns for a specifier, one per reference shape.
///
/// Each pattern accepts either quote style, so three patterns cover all six
/// syntactic combinations.
pub(crate) fn reference_patterns(specifier: &str) -> ScanResult<Vec<Regex>> {
    let escaped = regex::escape(specifier);
    REFERENCE_SHAPES
        .iter()
        .map(|(prefix, suffix)| {
            let pattern = format!("{prefix}['\"]{escaped}['\"]{suffix}");
            Regex::new(&pattern).map_err(|source| ScanError::Pattern {
                specifier: specifier.to_string(),
                source,
            })
        })
        .collect()
}

/// Whether `content` contains a reference to `specifier` in any shape.
pub(crate) fn contains_reference(content: &str, specifier: &str) -> ScanResult<bool> {
    let patterns = reference_patterns(specifier)?;
    Ok(patterns.iter().any(|p| p.is_match(content)))
}

/// Applies an import update to file content.
///
/// Performs a literal, all-occurrences substitution of the old specifier for
/// the new one across the six syntactic shapes (single/double quotes × the
/// three reference forms). Returns the rewritten content and the number of
/// replacements made. No semantic resolution is attempted; a specifier that
/// appears outside a reference shape is left alone.
pub fn apply_import_update(content: &str, update: &ImportUpdate) -> ScanResult<(String, usize)> {
    let escaped = regex::escape(&update.old_specifier);
    let new_specifier = &update.new_specifier;
    let mut result = content.to_string();
    let mut replaced = 0;

    for (prefix, suffix) in REFERENCE_SHAPES {
        for quote in ['\'', '"'] {
            let pattern = format!("{prefix}{quote}{escaped}{quote}{suffix}");
            let regex = Regex::new(&pattern).map_err(|source| ScanError::Pattern {
                specifier: update.old_specifier.clone(),
                source,
            })?;

            replaced += regex.find_iter(&result).count();
            result = regex
                .replace_all(&result, |caps: &regex::Captures<'_>| {
                    let mut rewritten = format!("{}{quote}{new_specifier}{quote}", &caps[1]);
                    if let Some(close) = caps.get(2) {
                        rewritten.push_str(close.as_str());
                    }
                    rewritten
                })
                .into_owned();
        }
    }

    Ok((result, replaced))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn update(old: &str, new: &str) -> ImportUpdate {
        ImportUpdate {
            file: PathBuf::from("consumer.ts"),
            old_specifier: old.to_string(),
            new_specifier: new.to_string(),
        }
    }

    #[test]
    fn detects_all_three_shapes() {
        let content = r#"
import { a } from './a';
const b = await import('./b');
const c = require("./c");
"#;
        assert!(contains_reference(content, "./a").unwrap());
        assert!(contains_reference(content, "./b").unwrap());
        assert!(contains_reference(content, "./c").unwrap());
        assert!(!contains_reference(content, "./d").unwrap());
    }

    #[test]
    fn specifier_match_is_exact() {
        // `./a` must not match inside `./ab` or `./a/b`.
        let content = "import { x } from './ab';\nimport { y } from './a/b';\n";
        assert!(!contains_reference(content, "./a").unwrap());
    }

    #[test]
    fn bare_string_is_not_a_reference() {
        let content = "const path = './a';\n";
        assert!(!contains_reference(content, "./a").unwrap());
    }

    #[test]
    fn rewrites_from_import_both_quotes() {
        let content = "import { a } from './a';\nimport type { B } from \"./a\";\n";
        let (rewritten, count) = apply_import_update(content, &update("./a", "./lib/a")).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            rewritten,
            "import { a } from './lib/a';\nimport type { B } from \"./lib/a\";\n"
        );
    }

    #[test]
    fn rewrites_dynamic_import_and_require() {
        let content = "const m = await import('./a');\nconst n = require(\"./a\");\n";
        let (rewritten, count) = apply_import_update(content, &update("./a", "../a")).unwrap();
        assert_eq!(count, 2);
        assert_eq!(
            rewritten,
            "const m = await import('../a');\nconst n = require(\"../a\");\n"
        );
    }

    #[test]
    fn rewrite_preserves_unrelated_specifiers() {
        let content = "import { x } from './ab';\nimport { a } from './a';\n";
        let (rewritten, count) = apply_import_update(content, &update("./a", "./z")).unwrap();
        assert_eq!(count, 1);
        assert!(rewritten.contains("'./ab'"));
        assert!(rewritten.contains("'./z'"));
    }

    #[test]
    fn rewrite_is_all_occurrences() {
        let content = "import { a } from './a';\nexport { b } from './a';\n";
        let (rewritten, count) = apply_import_update(content, &update("./a", "./b")).unwrap();
        assert_eq!(count, 2);
        assert!(!rewritten.contains("'./a'"));
    }

    #[test]
    fn no_match_leaves_content_untouched() {
        let content = "import { a } from './other';\n";
        let (rewritten, count) = apply_import_update(content, &update("./a", "./b")).unwrap();
        assert_eq!(count, 0);
        assert_eq!(rewritten, content);
    }
}
