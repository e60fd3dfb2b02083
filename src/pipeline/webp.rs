//! WebP siblings of raster images, written next to the `images` output.

use anyhow::{Context, Result};
use rayon::prelude::*;

use super::{OutputFile, PipelineContext, RunReport, read_sources, write_outputs};
use crate::image::webp::to_webp;
use crate::paths::CategoryKind;

const KIND: CategoryKind = CategoryKind::Imagewebp;

pub(super) fn run(ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let category = ctx.category(KIND);
    let files = read_sources(category)?;

    let outputs = if ctx.mode.build {
        let config = &ctx.config.images.webp;
        files
            .par_iter()
            .map(|file| {
                let content = to_webp(&file.content, config)
                    .with_context(|| format!("failed to convert {}", file.name()))?;
                Ok(OutputFile::new(file.rel.with_extension("webp"), content))
            })
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
