//! `[favicons]` section configuration.
//!
//! Only the base favicon set is generated; platform variants are not.
//!
//! # Example
//!
//! ```toml
//! [favicons]
//! sizes = [16, 32, 48]              # favicon-NxN.png files
//! ico_sizes = [16, 24, 32, 48, 64]  # frames inside favicon.ico
//! name = "app"
//! background = "#fff"
//! theme = "#fff"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Favicon set settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FaviconsConfig {
    /// Standalone PNG sizes.
    pub sizes: Vec<u32>,
    /// Frame sizes inside `favicon.ico`.
    pub ico_sizes: Vec<u32>,
    /// Application name written to `manifest.json`.
    pub name: String,
    /// `background_color` in `manifest.json`.
    pub background: String,
    /// `theme_color` in `manifest.json`.
    pub theme: String,
}

impl Default for FaviconsConfig {
    fn default() -> Self {
        Self {
            sizes: vec![16, 32, 48],
            ico_sizes: vec![16, 24, 32, 48, 64],
            name: "app".into(),
            background: "#fff".into(),
            theme: "#fff".into(),
        }
    }
}

impl FaviconsConfig {
    /// Validate favicon settings.
    ///
    /// # Checks
    /// - ico frames are within 1..=256 (ICO format limit)
    /// - no size is zero
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.ico_sizes.iter().any(|&s| s == 0 || s > 256) {
            diag.error(
                FieldPath::new("favicons.ico_sizes"),
                "frame sizes must be within 1..=256",
            );
        }
        if self.sizes.contains(&0) {
            diag.error(FieldPath::new("favicons.sizes"), "sizes must be positive");
        }
    }
}
