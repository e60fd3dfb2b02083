//! Images: raster and SVG optimisation in build mode, copies otherwise.
//!
//! No isolation: the first file that fails aborts the run.

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::{OutputFile, PipelineContext, RunReport, SourceFile, extension, read_sources, write_outputs};
use crate::config::ImagesConfig;
use crate::image::raster::{self, RasterKind};
use crate::image::svg::optimize_svg;
use crate::paths::CategoryKind;

const KIND: CategoryKind = CategoryKind::Images;

pub(super) fn run(ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let category = ctx.category(KIND);
    let files = read_sources(category)?;

    let outputs = if ctx.mode.build {
        files
            .par_iter()
            .map(|file| optimize(file, &ctx.config.images))
            .collect::<Result<Vec<_>>>()?
    } else {
        files
            .into_iter()
            .map(|file| OutputFile::new(file.rel, file.content))
            .collect()
    };

    let written = write_outputs(&category.output, &outputs)?;
    ctx.reload.reload();
    Ok(RunReport::new(KIND, written, 0))
}

fn optimize(file: &SourceFile, config: &ImagesConfig) -> Result<OutputFile> {
    let ext = extension(&file.rel).unwrap_or_default();
    let content = match RasterKind::from_extension(&ext) {
        Some(kind) => raster::optimize(&file.content, kind, config),
        None => optimize_svg(&file.content, &config.svg),
    }
    .with_context(|| format!("failed to optimize {}", file.name()))?;
    Ok(OutputFile::new(&file.rel, content))
}
