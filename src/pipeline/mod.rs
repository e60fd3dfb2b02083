//! Per-category pipelines.
//!
//! Every category follows the same shape:
//!
//! ```text
//! scan globs → read → fixed transform chain (mode-dependent) → write → notify
//! ```
//!
//! | Category | Isolation | Notification |
//! |---|---|---|
//! | views, scripts | per file | full reload |
//! | styles | per file | css inject per stylesheet |
//! | images, imagewebp, sprites, favicons, fonts | none | none |
//!
//! Categories write disjoint output trees, so any number may run at once.

mod favicons;
mod fonts;
mod images;
mod isolate;
mod scripts;
mod sprites;
mod styles;
mod views;
mod webp;

pub use isolate::PipelineError;

use anyhow::{Context, Result};
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::KilnConfig;
use crate::core::Mode;
use crate::paths::{Category, CategoryKind, PathTable};
use crate::reload::ReloadHandle;
use crate::utils::path::to_slash;

/// One input file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Absolute path.
    pub path: PathBuf,
    /// Path relative to the category's glob base.
    pub rel: PathBuf,
    pub content: Vec<u8>,
}

impl SourceFile {
    /// `rel` with `/` separators, used in logs and source maps.
    pub fn name(&self) -> String {
        to_slash(&self.rel)
    }
}

/// One output file, relative to the category's output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputFile {
    pub rel: PathBuf,
    pub content: Vec<u8>,
}

impl OutputFile {
    pub fn new(rel: impl Into<PathBuf>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            rel: rel.into(),
            content: content.into(),
        }
    }
}

/// Everything a pipeline reads besides its files.
#[derive(Clone, Copy)]
pub struct PipelineContext<'a> {
    pub config: &'a KilnConfig,
    pub table: &'a PathTable,
    pub mode: Mode,
    pub reload: &'a ReloadHandle,
}

impl PipelineContext<'_> {
    pub fn category(&self, kind: CategoryKind) -> &Category {
        self.table.get(kind)
    }
}

/// Outcome of one category run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunReport {
    pub kind: CategoryKind,
    /// Files written.
    pub written: usize,
    /// Files skipped after an isolated failure.
    pub failed: usize,
}

impl RunReport {
    const fn new(kind: CategoryKind, written: usize, failed: usize) -> Self {
        Self {
            kind,
            written,
            failed,
        }
    }

    pub const fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// Run one category's pipeline.
///
/// Errors abort the whole category; per-file failures in views, styles and
/// scripts are logged and counted in the report instead.
pub fn run(kind: CategoryKind, ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let report = match kind {
        CategoryKind::Views => views::run(ctx),
        CategoryKind::Styles => styles::run(ctx),
        CategoryKind::Scripts => scripts::run(ctx),
        CategoryKind::Images => images::run(ctx),
        CategoryKind::Imagewebp => webp::run(ctx),
        CategoryKind::Sprites => sprites::run(ctx),
        CategoryKind::Favicons => favicons::run(ctx),
        CategoryKind::Fonts => fonts::run(ctx),
    }
    .with_context(|| format!("{kind} pipeline failed"))?;

    crate::debug!(kind.name(); "wrote {} file(s), {} failed", report.written, report.failed);
    Ok(report)
}

/// Read every file matching a category, sorted by relative path.
fn read_sources(category: &Category) -> Result<Vec<SourceFile>> {
    category
        .scan()?
        .into_par_iter()
        .map(|m| {
            let content =
                fs::read(&m.path).with_context(|| format!("failed to read {}", m.path.display()))?;
            Ok(SourceFile {
                path: m.path,
                rel: m.rel,
                content,
            })
        })
        .collect()
}

/// Write outputs under `dir`, creating parent directories.
fn write_outputs(dir: &Path, outputs: &[OutputFile]) -> Result<usize> {
    outputs
        .par_iter()
        .map(|out| write_file(&dir.join(&out.rel), &out.content))
        .collect::<Result<Vec<_>>>()
        .map(|written| written.len())
}

fn write_file(path: &Path, content: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    fs::write(path, content).with_context(|| format!("failed to write {}", path.display()))
}

/// Extension of a relative path, lowercased.
fn extension(rel: &Path) -> Option<String> {
    rel.extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
}

// =============================================================================
// Test Helpers
// =============================================================================

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::config::{KilnConfig, test_config_at};
    use tempfile::TempDir;

    /// Temporary project with a `source/` tree and default config.
    pub struct Project {
        pub dir: TempDir,
        pub config: KilnConfig,
        pub table: PathTable,
    }

    impl Project {
        pub fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("source")).unwrap();
            let config = test_config_at(dir.path());
            let table = PathTable::new(config.source_root(), config.build_root()).unwrap();
            Self { dir, config, table }
        }

        pub fn add(&self, rel: &str, content: impl AsRef<[u8]>) {
            let path = self.table.source_root().join(rel);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(path, content).unwrap();
        }

        pub fn run(&self, kind: CategoryKind, mode: Mode) -> RunReport {
            self.run_with(kind, mode, &ReloadHandle::disabled()).unwrap()
        }

        pub fn run_with(
            &self,
            kind: CategoryKind,
            mode: Mode,
            reload: &ReloadHandle,
        ) -> Result<RunReport> {
            let ctx = PipelineContext {
                config: &self.config,
                table: &self.table,
                mode,
                reload,
            };
            run(kind, &ctx)
        }

        /// Run with a live reload handle and collect what it was sent.
        pub fn run_live(
            &self,
            kind: CategoryKind,
            mode: Mode,
        ) -> (RunReport, Vec<crate::reload::message::HotReloadMessage>) {
            let (tx, mut rx) = tokio::sync::mpsc::channel(64);
            let report = self.run_with(kind, mode, &ReloadHandle::new(tx)).unwrap();
            let mut sent = Vec::new();
            while let Ok(crate::actor::messages::WsMsg::Broadcast(msg)) = rx.try_recv() {
                sent.push(msg);
            }
            (report, sent)
        }

        pub fn build_path(&self, rel: &str) -> PathBuf {
            self.table.build_root().join(rel)
        }

        pub fn read_build(&self, rel: &str) -> String {
            fs::read_to_string(self.build_path(rel)).unwrap()
        }

        /// Every file under the build root, `/`-separated and sorted.
        pub fn build_files(&self) -> Vec<String> {
            let root = self.table.build_root();
            if !root.exists() {
                return Vec::new();
            }
            let mut files: Vec<String> = jwalk::WalkDir::new(root)
                .parallelism(jwalk::Parallelism::Serial)
                .into_iter()
                .map(Result::unwrap)
                .filter(|e| e.file_type().is_file())
                .filter_map(|e| Some(to_slash(e.path().strip_prefix(root).ok()?)))
                .collect();
            files.sort();
            files
        }
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::Project;
    use super::*;

    #[test]
    fn test_read_sources_sorted() {
        let project = Project::new();
        project.add("fonts/b.woff", b"b");
        project.add("fonts/a.woff2", b"a");
        let files = read_sources(project.table.get(CategoryKind::Fonts)).unwrap();
        let names: Vec<_> = files.iter().map(SourceFile::name).collect();
        assert_eq!(names, ["a.woff2", "b.woff"]);
        assert_eq!(files[0].content, b"a");
    }

    #[test]
    fn test_write_outputs_creates_dirs() {
        let dir = tempfile::TempDir::new().unwrap();
        let outputs = [
            OutputFile::new("a/b/c.txt", "c"),
            OutputFile::new("d.txt", "d"),
        ];
        assert_eq!(write_outputs(dir.path(), &outputs).unwrap(), 2);
        assert_eq!(fs::read_to_string(dir.path().join("a/b/c.txt")).unwrap(), "c");
    }

    #[test]
    fn test_extension_lowercased() {
        assert_eq!(extension(Path::new("a/B.JPG")).as_deref(), Some("jpg"));
        assert_eq!(extension(Path::new("README")), None);
    }
}
