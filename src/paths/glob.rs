//! Glob patterns relative to the source root.
//!
//! The `glob` crate has no brace alternation, so `*.{css,scss}` is expanded
//! into one pattern per alternative before compiling.

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern};
use std::path::PathBuf;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Expand `{a,b}` alternations (nested groups included).
///
/// ```ignore
/// assert_eq!(expand_braces("*.{css,scss}"), ["*.css", "*.scss"]);
/// ```
pub fn expand_braces(pattern: &str) -> Vec<String> {
    let Some(open) = pattern.find('{') else {
        return vec![pattern.to_string()];
    };

    // Find the matching close brace for the first open brace
    let mut depth = 0;
    let mut close = None;
    let mut splits = Vec::new();
    for (i, c) in pattern[open..].char_indices() {
        let i = open + i;
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    close = Some(i);
                    break;
                }
            }
            ',' if depth == 1 => splits.push(i),
            _ => {}
        }
    }

    let Some(close) = close else {
        return vec![pattern.to_string()];
    };

    let prefix = &pattern[..open];
    let suffix = &pattern[close + 1..];
    let mut bounds = vec![open];
    bounds.extend(&splits);
    bounds.push(close);

    bounds
        .windows(2)
        .flat_map(|w| {
            let alt = &pattern[w[0] + 1..w[1]];
            expand_braces(&format!("{prefix}{alt}{suffix}"))
        })
        .collect()
}

/// Leading components without glob metacharacters.
///
/// `images/svg/*.svg` → `images/svg`, `views/**/*.html` → `views`.
pub fn static_base(pattern: &str) -> PathBuf {
    pattern
        .split('/')
        .take_while(|part| !part.contains(['*', '?', '[', '{']))
        .collect()
}

/// Include and exclude patterns for one category.
#[derive(Debug, Clone)]
pub struct GlobSet {
    include: Vec<Pattern>,
    exclude: Vec<Pattern>,
}

impl GlobSet {
    /// Compile include/exclude patterns (brace-expanded).
    pub fn new(include: &[&str], exclude: &[&str]) -> Result<Self> {
        Ok(Self {
            include: compile(include)?,
            exclude: compile(exclude)?,
        })
    }

    /// Whether a `/`-separated path relative to the source root matches.
    pub fn matches(&self, rel: &str) -> bool {
        self.include.iter().any(|p| p.matches_with(rel, MATCH_OPTIONS))
            && !self.exclude.iter().any(|p| p.matches_with(rel, MATCH_OPTIONS))
    }
}

fn compile(patterns: &[&str]) -> Result<Vec<Pattern>> {
    patterns
        .iter()
        .flat_map(|p| expand_braces(p))
        .map(|p| Pattern::new(&p).with_context(|| format!("invalid glob `{p}`")))
        .collect()
}
