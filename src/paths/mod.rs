//! Static path table: asset category → globs and output directory.
//!
//! ```text
//! category   include (relative to source root)          output (relative to build root)
//! views      views/**/*.html                             .
//! styles     styles/**/*.{css,scss}                      styles/
//! scripts    scripts/**/*.js                             scripts/
//! images     images/**/*.{gif,jpg,jpeg,png,svg}          images/
//! imagewebp  images/**/*.{gif,jpg,jpeg,png}              images/
//! sprites    images/svg/*.svg                            images/sprites/
//! favicons   images/favicons/*.{gif,jpg,jpeg,png}        images/favicons/
//! fonts      fonts/**/*.{woff,woff2}                     fonts/
//! ```
//!
//! `images` and `imagewebp` both exclude `images/favicons/*.{gif,jpg,jpeg,png}`.

mod glob;

pub use self::glob::{GlobSet, expand_braces, static_base};

use anyhow::{Context, Result};
use jwalk::{Parallelism, WalkDir};
use std::fmt;
use std::path::{Path, PathBuf};

use crate::utils::path::to_slash;

const FAVICON_SOURCES: &str = "images/favicons/*.{gif,jpg,jpeg,png}";

/// Asset categories, in startup order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, clap::ValueEnum)]
pub enum CategoryKind {
    Views,
    Styles,
    Scripts,
    Images,
    Imagewebp,
    Sprites,
    Favicons,
    Fonts,
}

impl CategoryKind {
    pub const ALL: [Self; 8] = [
        Self::Views,
        Self::Styles,
        Self::Scripts,
        Self::Images,
        Self::Imagewebp,
        Self::Sprites,
        Self::Favicons,
        Self::Fonts,
    ];

    /// Lowercase name used in logs and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Views => "views",
            Self::Styles => "styles",
            Self::Scripts => "scripts",
            Self::Images => "images",
            Self::Imagewebp => "imagewebp",
            Self::Sprites => "sprites",
            Self::Favicons => "favicons",
            Self::Fonts => "fonts",
        }
    }

    /// Include globs, exclude globs, output directory.
    const fn layout(self) -> (&'static [&'static str], &'static [&'static str], &'static str) {
        match self {
            Self::Views => (&["views/**/*.html"], &[], ""),
            Self::Styles => (&["styles/**/*.{css,scss}"], &[], "styles"),
            Self::Scripts => (&["scripts/**/*.js"], &[], "scripts"),
            Self::Images => (
                &["images/**/*.{gif,jpg,jpeg,png,svg}"],
                &[FAVICON_SOURCES],
                "images",
            ),
            Self::Imagewebp => (
                &["images/**/*.{gif,jpg,jpeg,png}"],
                &[FAVICON_SOURCES],
                "images",
            ),
            Self::Sprites => (&["images/svg/*.svg"], &[], "images/sprites"),
            Self::Favicons => (&[FAVICON_SOURCES], &[], "images/favicons"),
            Self::Fonts => (&["fonts/**/*.{woff,woff2}"], &[], "fonts"),
        }
    }
}

impl fmt::Display for CategoryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A file matched by a category's globs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Matched {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the category's glob base.
    pub rel: PathBuf,
}

/// One row of the path table, resolved against the configured roots.
#[derive(Debug, Clone)]
pub struct Category {
    pub kind: CategoryKind,
    source_root: PathBuf,
    /// Glob base directory (absolute).
    pub base: PathBuf,
    globs: GlobSet,
    /// Output directory (absolute).
    pub output: PathBuf,
}

impl Category {
    fn new(kind: CategoryKind, source_root: &Path, build_root: &Path) -> Result<Self> {
        let (include, exclude, output) = kind.layout();
        Ok(Self {
            kind,
            source_root: source_root.to_path_buf(),
            base: source_root.join(static_base(include[0])),
            globs: GlobSet::new(include, exclude)?,
            output: build_root.join(output),
        })
    }

    /// Whether an absolute path belongs to this category.
    pub fn matches(&self, path: &Path) -> bool {
        path.strip_prefix(&self.source_root)
            .is_ok_and(|rel| self.globs.matches(&to_slash(rel)))
    }

    /// All matching files, sorted by relative path.
    ///
    /// The walk is serial: scans run inside rayon tasks, and a parallel
    /// walk there can time out waiting for a busy pool.
    pub fn scan(&self) -> Result<Vec<Matched>> {
        if !self.base.is_dir() {
            return Ok(Vec::new());
        }

        let mut files = Vec::new();
        let walk = WalkDir::new(&self.base)
            .parallelism(Parallelism::Serial)
            .sort(false);
        for entry in walk {
            let entry =
                entry.with_context(|| format!("failed to walk {}", self.base.display()))?;
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !self.matches(&path) {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(&self.base) {
                let rel = rel.to_path_buf();
                files.push(Matched { path, rel });
            }
        }

        files.sort_by_cached_key(|m| to_slash(&m.rel));
        Ok(files)
    }
}

/// The eight categories, built once from config at startup.
#[derive(Debug, Clone)]
pub struct PathTable {
    source_root: PathBuf,
    build_root: PathBuf,
    categories: Vec<Category>,
}

impl PathTable {
    pub fn new(source_root: &Path, build_root: &Path) -> Result<Self> {
        let categories = CategoryKind::ALL
            .iter()
            .map(|&kind| Category::new(kind, source_root, build_root))
            .collect::<Result<_>>()?;
        Ok(Self {
            source_root: source_root.to_path_buf(),
            build_root: build_root.to_path_buf(),
            categories,
        })
    }

    pub fn source_root(&self) -> &Path {
        &self.source_root
    }

    pub fn build_root(&self) -> &Path {
        &self.build_root
    }

    pub fn get(&self, kind: CategoryKind) -> &Category {
        // Built from CategoryKind::ALL, so the index always exists
        &self.categories[kind as usize]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Category> {
        self.categories.iter()
    }

    /// Categories whose globs match an absolute path.
    pub fn categories_for(&self, path: &Path) -> Vec<CategoryKind> {
        self.iter()
            .filter(|c| c.matches(path))
            .map(|c| c.kind)
            .collect()
    }
}
