//! Per-file failure isolation.
//!
//! Views, styles and scripts keep going when one file fails: the failure
//! is logged under the category prefix and the file produces no output.

use anyhow::Result;
use rayon::prelude::*;
use std::path::PathBuf;
use thiserror::Error;

use super::SourceFile;
use crate::paths::CategoryKind;

/// One file that failed inside an isolating pipeline.
#[derive(Debug, Error)]
#[error("{}: {message}", .path.display())]
pub struct PipelineError {
    pub kind: CategoryKind,
    /// Path relative to the category's glob base.
    pub path: PathBuf,
    pub message: String,
}

impl PipelineError {
    fn new(kind: CategoryKind, file: &SourceFile, err: &anyhow::Error) -> Self {
        Self {
            kind,
            path: file.rel.clone(),
            message: format!("{err:#}"),
        }
    }
}

/// Results of an isolated map: successes in input order, plus failures.
#[derive(Debug)]
pub struct Isolated<T> {
    pub ok: Vec<T>,
    pub failed: Vec<PipelineError>,
}

/// Apply `f` to every file in parallel, catching and logging failures.
pub fn isolate<T, F>(kind: CategoryKind, files: &[SourceFile], f: F) -> Isolated<T>
where
    T: Send,
    F: Fn(&SourceFile) -> Result<T> + Sync,
{
    let results: Vec<_> = files
        .par_iter()
        .map(|file| f(file).map_err(|e| PipelineError::new(kind, file, &e)))
        .collect();

    let mut ok = Vec::with_capacity(results.len());
    let mut failed = Vec::new();
    for result in results {
        match result {
            Ok(value) => ok.push(value),
            Err(err) => {
                crate::log!(kind.name(); "{}", err);
                failed.push(err);
            }
        }
    }
    Isolated { ok, failed }
}

/// Run `f` once over the whole stream, turning a failure into a logged
/// [`PipelineError`] against `name`.
pub fn isolate_all<T>(
    kind: CategoryKind,
    name: &str,
    f: impl FnOnce() -> Result<T>,
) -> std::result::Result<T, PipelineError> {
    f().map_err(|e| {
        let err = PipelineError {
            kind,
            path: PathBuf::from(name),
            message: format!("{e:#}"),
        };
        crate::log!(kind.name(); "{}", err);
        err
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    fn file(rel: &str) -> SourceFile {
        SourceFile {
            path: PathBuf::from("/src").join(rel),
            rel: PathBuf::from(rel),
            content: rel.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_failures_do_not_stop_others() {
        let files = [file("a.html"), file("bad.html"), file("c.html")];
        let out = isolate(CategoryKind::Views, &files, |f| {
            if f.name().starts_with("bad") {
                bail!("broken markup");
            }
            Ok(f.name())
        });

        assert_eq!(out.ok, ["a.html", "c.html"]);
        assert_eq!(out.failed.len(), 1);
        assert_eq!(out.failed[0].path, PathBuf::from("bad.html"));
        assert_eq!(out.failed[0].to_string(), "bad.html: broken markup");
    }

    #[test]
    fn test_isolate_all() {
        let err = isolate_all(CategoryKind::Scripts, "main.js", || -> Result<()> {
            bail!("unexpected token")
        })
        .unwrap_err();
        assert_eq!(err.kind, CategoryKind::Scripts);
        assert_eq!(err.to_string(), "main.js: unexpected token");
    }
}
