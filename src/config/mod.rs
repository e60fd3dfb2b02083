//! Project configuration management for `kiln.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # One file per table
//! │   ├── paths      # [paths]
//! │   ├── styles     # [styles], [styles.rem]
//! │   ├── images     # [images.*]
//! │   ├── favicons   # [favicons]
//! │   ├── serve      # [serve]
//! │   └── watch      # [watch]
//! ├── error          # ConfigError, ConfigDiagnostics
//! └── mod.rs         # KilnConfig (this file)
//! ```
//!
//! The file is optional: without it the defaults reproduce the built-in
//! source/build layout.

mod error;
pub mod section;

pub use error::{ConfigDiagnostics, ConfigError, FieldPath};
pub use section::{
    FaviconsConfig, GifConfig, ImagesConfig, JpegConfig, PathsConfig, PngConfig, RemConfig,
    ServeConfig, StylesConfig, SvgConfig, SvgPlugin, WatchConfig, WebpConfig,
};

use crate::{cli::Cli, debug, log};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing kiln.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KilnConfig {
    /// Absolute path to the config file (internal use only)
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    /// Source and build roots
    #[serde(default)]
    pub paths: PathsConfig,

    /// Stylesheet pipeline settings
    #[serde(default)]
    pub styles: StylesConfig,

    /// Image optimisation settings
    #[serde(default)]
    pub images: ImagesConfig,

    /// Favicon set settings
    #[serde(default)]
    pub favicons: FaviconsConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// File watcher settings
    #[serde(default)]
    pub watch: WatchConfig,
}

impl KilnConfig {
    /// Load configuration from CLI arguments.
    ///
    /// Searches upward from cwd for the config file. The project root is the
    /// config file's parent directory, or cwd when no file exists.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cli.config) {
            Some(path) => {
                let mut config = Self::from_path(&path)?;
                config.root = path.parent().map(Path::to_path_buf).unwrap_or_default();
                config.config_path = path;
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self {
                    config_path: cwd.join(&cli.config),
                    root: cwd,
                    ..Self::default()
                }
            }
        };

        config.finalize();
        config.validate()?;
        Ok(config)
    }

    /// Resolve paths after loading.
    fn finalize(&mut self) {
        let root = crate::utils::path::normalize_path(&self.root);
        self.paths.normalize(&root);
        self.root = root;
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>)> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })
        .map_err(ConfigError::Toml)?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    /// Validate configuration.
    ///
    /// Collects all validation errors and returns them at once.
    pub fn validate(&self) -> Result<()> {
        let mut diag = ConfigDiagnostics::new();

        self.paths.validate(&mut diag);
        self.styles.validate(&mut diag);
        self.images.validate(&mut diag);
        self.favicons.validate(&mut diag);
        self.serve.validate(&mut diag);

        diag.into_result()
            .map_err(|e| ConfigError::Diagnostics(e).into())
    }

    /// Source root directory.
    pub fn source_root(&self) -> &Path {
        &self.paths.source
    }

    /// Build root directory.
    pub fn build_root(&self) -> &Path {
        &self.paths.build
    }
}

/// Find config file by searching upward from current directory
///
/// ```text
/// /home/user/site/source/styles/  ← cwd
/// /home/user/site/kiln.toml       ← found!
/// ```
fn find_config_file(config_name: &Path) -> Option<PathBuf> {
    if config_name.is_absolute() {
        return config_name.exists().then(|| config_name.to_path_buf());
    }

    let cwd = std::env::current_dir().ok()?;
    cwd.ancestors()
        .map(|dir| dir.join(config_name))
        .find(|candidate| candidate.is_file())
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config content.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> KilnConfig {
    let (parsed, ignored) = KilnConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

/// Default config rooted at `root` (`root/source`, `root/build`).
#[cfg(test)]
pub fn test_config_at(root: &Path) -> KilnConfig {
    let mut config = KilnConfig {
        root: root.to_path_buf(),
        config_path: root.join("kiln.toml"),
        ..KilnConfig::default()
    };
    config.finalize();
    config
}

// ============================================================================
// tests
// ============================================================================
