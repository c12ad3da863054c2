//! Engine configuration.

use std::path::PathBuf;

use txedit_refs::ScanConfig;

use crate::verify::VerifyConfig;

/// Configuration for a [`crate::TransactionManager`].
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Project root. Relative edit paths resolve against it; the reference
    /// scan and the verification command are both scoped to it.
    pub root: PathBuf,

    /// Reference scanning configuration.
    pub scan: ScanConfig,

    /// Verification gate configuration.
    pub verify: VerifyConfig,
}

impl EngineConfig {
    /// Creates a configuration with default scanning and verification for
    /// the given project root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            scan: ScanConfig::new(&root),
            verify: VerifyConfig::default(),
            root,
        }
    }

    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }

    pub fn with_verify(mut self, verify: VerifyConfig) -> Self {
        self.verify = verify;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_root_follows_engine_root() {
        let config = EngineConfig::new("/tmp/project");
        assert_eq!(config.scan.root, PathBuf::from("/tmp/project"));
    }

    #[test]
    fn builders_replace_sections() {
        let config = EngineConfig::new("/tmp/project")
            .with_verify(VerifyConfig::disabled())
            .with_scan(ScanConfig::new("/tmp/project").with_respect_gitignore(false));
        assert!(config.verify.command.is_empty());
        assert!(!config.scan.respect_gitignore);
    }
}
