//! Scripts: every file concatenated into one `main.js`.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

use super::isolate::{isolate, isolate_all};
use super::{OutputFile, PipelineContext, RunReport, read_sources, write_outputs};
use crate::asset::concat::{ConcatInput, concat};
use crate::asset::minify::minify_js;
use crate::paths::CategoryKind;
use crate::utils::path::{to_slash, with_min_suffix};

const KIND: CategoryKind = CategoryKind::Scripts;

const BUNDLE_NAME: &str = "main.js";

pub(super) fn run(ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let category = ctx.category(KIND);
    let files = read_sources(category)?;

    let decoded = isolate(KIND, &files, |file| {
        let source = std::str::from_utf8(&file.content).context("script is not valid utf-8")?;
        Ok((file.name(), source.to_string()))
    });
    let failed = decoded.failed.len();
    if decoded.ok.is_empty() {
        return Ok(RunReport::new(KIND, 0, failed));
    }

    let rel = bundle_rel(ctx.mode.build);
    let bundled = isolate_all(KIND, &to_slash(&rel), || {
        let inputs: Vec<_> = decoded
            .ok
            .iter()
            .map(|(name, content)| ConcatInput {
                name: name.as_str(),
                content: content.as_str(),
            })
            .collect();
        let joined = concat(&inputs, ctx.mode.dev)?;
        let code = if ctx.mode.build {
            minify_js(&joined.code)?
        } else {
            joined.code
        };

        let mut outputs = vec![OutputFile::new(&rel, code)];
        if let Some(map) = joined.map {
            outputs.push(OutputFile::new(map_rel(&rel), map));
        }
        Ok(outputs)
    });
    let Ok(outputs) = bundled else {
        return Ok(RunReport::new(KIND, 0, files.len()));
    };

    write_outputs(&category.output, &outputs)?;
    ctx.reload.reload();
    Ok(RunReport::new(KIND, 1, failed))
}

fn bundle_rel(build: bool) -> PathBuf {
    let rel = PathBuf::from(BUNDLE_NAME);
    if build { with_min_suffix(&rel) } else { rel }
}

/// The map describes the concatenation; minification is not tracked.
fn map_rel(bundle: &Path) -> PathBuf {
    Path::new("maps").join(format!("{}.map", to_slash(bundle)))
}
