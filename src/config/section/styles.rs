//! `[styles]` section configuration.
//!
//! # Example
//!
//! ```toml
//! [styles]
//! allow = ["js"]            # Selector regexes never purged
//! keep_font_face = true     # Keep @font-face even when unused
//! keep_keyframes = true     # Keep @keyframes even when unused
//!
//! [styles.rem]
//! root_value = 16
//! precision = 5
//! props = ["font", "font-size", "line-height", "letter-spacing"]
//! min_px = 0
//! media_query = true
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

/// Stylesheet pipeline settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StylesConfig {
    /// Regexes matched against selectors; a match is never purged.
    pub allow: Vec<String>,
    /// Keep `@font-face` rules even when no kept rule uses the family.
    pub keep_font_face: bool,
    /// Keep `@keyframes` rules even when no kept rule animates with them.
    pub keep_keyframes: bool,
    /// px → rem conversion.
    pub rem: RemConfig,
}

impl Default for StylesConfig {
    fn default() -> Self {
        Self {
            allow: vec!["js".into()],
            keep_font_face: true,
            keep_keyframes: true,
            rem: RemConfig::default(),
        }
    }
}

impl StylesConfig {
    /// Compile the allow-list. Invalid entries are reported by `validate`.
    pub fn allow_patterns(&self) -> Vec<Regex> {
        self.allow.iter().filter_map(|p| Regex::new(p).ok()).collect()
    }

    /// Validate styles configuration.
    ///
    /// # Checks
    /// - every `allow` entry is a valid regex
    /// - `rem` settings (see [`RemConfig::validate`])
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        for pattern in &self.allow {
            if let Err(e) = Regex::new(pattern) {
                diag.error(
                    FieldPath::new("styles.allow"),
                    format!("invalid regex `{pattern}`: {e}"),
                );
            }
        }
        self.rem.validate(diag);
    }
}

/// px → rem conversion settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemConfig {
    /// Root font size in px.
    pub root_value: f64,
    /// Decimal places kept in converted values.
    pub precision: u32,
    /// Properties whose values are converted.
    pub props: Vec<String>,
    /// Values below this many px are left alone.
    pub min_px: f64,
    /// Also convert px inside `@media` parameters.
    pub media_query: bool,
}

impl Default for RemConfig {
    fn default() -> Self {
        Self {
            root_value: 16.0,
            precision: 5,
            props: ["font", "font-size", "line-height", "letter-spacing"]
                .into_iter()
                .map(String::from)
                .collect(),
            min_px: 0.0,
            media_query: true,
        }
    }
}

impl RemConfig {
    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.root_value <= 0.0 {
            diag.error(FieldPath::new("styles.rem.root_value"), "must be positive");
        }
        if self.props.is_empty() {
            diag.error_with_hint(
                FieldPath::new("styles.rem.props"),
                "must list at least one property",
                "use `[\"*\"]` to convert every property",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_styles_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.styles.allow, vec!["js".to_string()]);
        assert!(config.styles.keep_font_face);
        assert!(config.styles.keep_keyframes);
        assert_eq!(config.styles.rem.root_value, 16.0);
        assert_eq!(config.styles.rem.precision, 5);
        assert!(config.styles.rem.media_query);
        assert!(config.styles.rem.props.iter().any(|p| p == "font-size"));
    }

    #[test]
    fn test_rem_override() {
        let config = test_parse_config("[styles.rem]\nroot_value = 10\nprops = [\"*\"]");
        assert_eq!(config.styles.rem.root_value, 10.0);
        assert_eq!(config.styles.rem.props, vec!["*".to_string()]);
        assert_eq!(config.styles.rem.precision, 5);
    }

    #[test]
    fn test_invalid_regex_reported() {
        let config = test_parse_config("[styles]\nallow = [\"js\", \"(\"]");
        let mut diag = ConfigDiagnostics::new();
        config.styles.validate(&mut diag);
        assert_eq!(diag.len(), 1);
        assert_eq!(config.styles.allow_patterns().len(), 1);
    }

    #[test]
    fn test_empty_props_reported() {
        let config = test_parse_config("[styles.rem]\nprops = []");
        let mut diag = ConfigDiagnostics::new();
        config.styles.validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
