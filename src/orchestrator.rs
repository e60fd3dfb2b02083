//! One-shot runs: clean the build root and run categories concurrently.
//!
//! ```text
//! clean → rayon::scope { views | styles | scripts | ... } → summary
//! ```

use std::fs;
use std::path::Path;
use std::time::Instant;

use anyhow::{Context, Result};
use parking_lot::Mutex;

use crate::logger::{status_error, status_success};
use crate::paths::CategoryKind;
use crate::pipeline::{self, PipelineContext, RunReport};
use crate::{debug, log};

/// Result of one category within a run.
pub type CategoryResult = (CategoryKind, Result<RunReport>);

/// Delete everything inside `build_root`, keeping the directory itself.
///
/// Returns the number of top-level entries removed.
pub fn clean(build_root: &Path) -> Result<usize> {
    let entries = match fs::read_dir(build_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(0),
        Err(e) => {
            return Err(e).with_context(|| format!("failed to read {}", build_root.display()));
        }
    };

    let mut removed = 0;
    for entry in entries {
        let path = entry?.path();
        let result = if path.is_dir() && !path.is_symlink() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.with_context(|| format!("failed to remove {}", path.display()))?;
        removed += 1;
    }

    debug!("clean"; "removed {} entr(ies) from {}", removed, build_root.display());
    Ok(removed)
}

/// Run the given categories, one rayon task each, and collect results in
/// category order.
pub fn run_categories(kinds: &[CategoryKind], ctx: &PipelineContext<'_>) -> Vec<CategoryResult> {
    let results = Mutex::new(Vec::with_capacity(kinds.len()));

    rayon::scope(|s| {
        for &kind in kinds {
            let results = &results;
            s.spawn(move |_| {
                let result = pipeline::run(kind, ctx);
                results.lock().push((kind, result));
            });
        }
    });

    let mut results = results.into_inner();
    results.sort_by_key(|(kind, _)| *kind);
    results
}

/// Run every category.
pub fn run_all(ctx: &PipelineContext<'_>) -> Vec<CategoryResult> {
    run_categories(&CategoryKind::ALL, ctx)
}

/// Clean, then run `kinds`, logging one line per category and a summary.
///
/// Returns whether every category finished without failures.
pub fn build(kinds: &[CategoryKind], clean_first: bool, ctx: &PipelineContext<'_>) -> Result<bool> {
    let start = Instant::now();
    if clean_first {
        clean(ctx.table.build_root())?;
    }

    let results = run_categories(kinds, ctx);
    let ok = report(&results);

    let elapsed = start.elapsed().as_millis();
    if ok {
        status_success(&format!("built {} categories in {elapsed}ms ({})", results.len(), ctx.mode));
    } else {
        status_error(&format!("build finished with errors in {elapsed}ms"), "");
    }
    Ok(ok)
}

/// Log each category outcome. Returns `true` when all are clean.
fn report(results: &[CategoryResult]) -> bool {
    let mut ok = true;
    for (kind, result) in results {
        match result {
            Ok(report) if report.is_clean() => {
                debug!(kind.name(); "{} file(s)", report.written);
            }
            Ok(report) => {
                ok = false;
                log!(kind.name(); "{} written, {} failed", report.written, report.failed);
            }
            Err(e) => {
                ok = false;
                log!(kind.name(); "{:#}", e);
            }
        }
    }
    ok
}
