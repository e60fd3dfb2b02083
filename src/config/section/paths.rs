//! `[paths]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [paths]
//! source = "source"   # Source root (views/, styles/, scripts/, images/, fonts/)
//! build = "build"     # Build root, emptied by `kiln clean`
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Source and build roots.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Source root directory.
    pub source: PathBuf,
    /// Build root directory.
    pub build: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            source: "source".into(),
            build: "build".into(),
        }
    }
}

impl PathsConfig {
    /// Resolve both roots against the project root, with tilde expansion.
    pub fn normalize(&mut self, root: &Path) {
        self.source = normalize_root(&self.source, root);
        self.build = normalize_root(&self.build, root);
    }

    /// Validate that the roots are usable.
    ///
    /// # Checks
    /// - neither root is empty
    /// - build root is not the source root, nor contains it
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.source.as_os_str().is_empty() {
            diag.error(FieldPath::new("paths.source"), "must not be empty");
        }
        if self.build.as_os_str().is_empty() {
            diag.error(FieldPath::new("paths.build"), "must not be empty");
            return;
        }
        if self.source.starts_with(&self.build) {
            diag.error_with_hint(
                FieldPath::new("paths.build"),
                format!(
                    "build root `{}` contains the source root",
                    self.build.display()
                ),
                "cleaning would delete sources; pick a sibling directory",
            );
        }
    }
}

fn normalize_root(path: &Path, root: &Path) -> PathBuf {
    let expanded = shellexpand::tilde(&path.to_string_lossy()).into_owned();
    let path = PathBuf::from(expanded);
    let full_path = if path.is_relative() {
        root.join(&path)
    } else {
        path
    };
    crate::utils::path::normalize_path(&full_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_paths_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.paths.source, PathBuf::from("source"));
        assert_eq!(config.paths.build, PathBuf::from("build"));
    }

    #[test]
    fn test_paths_override() {
        let config = test_parse_config("[paths]\nsource = \"src\"\nbuild = \"dist\"");
        assert_eq!(config.paths.source, PathBuf::from("src"));
        assert_eq!(config.paths.build, PathBuf::from("dist"));
    }

    #[test]
    fn test_normalize_relative_to_root() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut paths = PathsConfig::default();
        paths.normalize(dir.path());
        assert!(paths.source.is_absolute());
        assert!(paths.source.ends_with("source"));
        assert!(paths.build.ends_with("build"));
    }

    #[test]
    fn test_build_containing_source_rejected() {
        let paths = PathsConfig {
            source: PathBuf::from("/site/build/source"),
            build: PathBuf::from("/site/build"),
        };
        let mut diag = ConfigDiagnostics::new();
        paths.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
