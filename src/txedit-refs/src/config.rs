//! Scan configuration.

use std::path::{Path, PathBuf};

/// Default maximum size of a file considered during scanning (5MB).
///
/// Larger files are skipped; generated bundles and vendored blobs are not
/// useful reference sources and dominate scan time.
pub const DEFAULT_MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Configuration for reference scanning.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Project root to scan under.
    pub root: PathBuf,

    /// File extensions treated as source files.
    pub source_extensions: Vec<String>,

    /// Directory names excluded from the walk (build output, dependencies).
    pub exclude_dirs: Vec<String>,

    /// Whether to respect .gitignore files.
    pub respect_gitignore: bool,

    /// Maximum file size in bytes (0 for no limit).
    pub max_file_size: u64,
}

impl ScanConfig {
    /// Creates a configuration with default filters for the given root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            source_extensions: ["ts", "tsx", "js", "jsx", "mts", "cts", "mjs", "cjs"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            exclude_dirs: ["node_modules", "dist", "build", "coverage", "target", ".git"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
            respect_gitignore: true,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }

    /// Replaces the set of source extensions.
    pub fn with_source_extensions(mut self, extensions: Vec<String>) -> Self {
        self.source_extensions = extensions;
        self
    }

    /// Replaces the set of excluded directory names.
    pub fn with_exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.exclude_dirs = dirs;
        self
    }

    /// Sets whether .gitignore files are respected.
    pub fn with_respect_gitignore(mut self, respect: bool) -> Self {
        self.respect_gitignore = respect;
        self
    }

    /// Sets the per-file size cap (0 disables the cap).
    pub fn with_max_file_size(mut self, max: u64) -> Self {
        self.max_file_size = max;
        self
    }

    /// Whether a file extension is one of the configured source extensions.
    pub fn is_source_extension(&self, ext: &str) -> bool {
        self.source_extensions.iter().any(|e| e == ext)
    }

    /// Whether a directory name is excluded from the walk.
    pub fn is_excluded_dir(&self, name: &str) -> bool {
        self.exclude_dirs.iter().any(|d| d == name)
    }

    /// Whether a path looks like a source file under this configuration.
    pub fn is_source_file(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| self.is_source_extension(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_filters() {
        let config = ScanConfig::new("/tmp/project");
        assert!(config.is_source_extension("ts"));
        assert!(config.is_source_extension("mjs"));
        assert!(!config.is_source_extension("rs"));
        assert!(config.is_excluded_dir("node_modules"));
        assert!(!config.is_excluded_dir("src"));
        assert!(config.is_source_file(Path::new("src/a.tsx")));
        assert!(!config.is_source_file(Path::new("README.md")));
        assert!(!config.is_source_file(Path::new("Makefile")));
    }

    #[test]
    fn builder_overrides() {
        let config = ScanConfig::new("/tmp/project")
            .with_source_extensions(vec!["py".to_string()])
            .with_exclude_dirs(vec!["__pycache__".to_string()])
            .with_respect_gitignore(false)
            .with_max_file_size(0);

        assert!(config.is_source_extension("py"));
        assert!(!config.is_source_extension("ts"));
        assert!(config.is_excluded_dir("__pycache__"));
        assert!(!config.respect_gitignore);
        assert_eq!(config.max_file_size, 0);
    }
}
