//! Favicons: the base icon set generated from `images/favicons/*`.

use anyhow::Result;

use super::{OutputFile, PipelineContext, RunReport, read_sources, write_outputs};
use crate::image::favicon;
use crate::paths::CategoryKind;

const KIND: CategoryKind = CategoryKind::Favicons;

pub(super) fn run(ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let category = ctx.category(KIND);
    let files = read_sources(category)?;
    if files.is_empty() {
        return Ok(RunReport::new(KIND, 0, 0));
    }

    let sources: Vec<_> = files.into_iter().map(|f| f.content).collect();
    let outputs: Vec<_> = favicon::generate(&sources, &ctx.config.favicons)?
        .into_iter()
        .map(|icon| OutputFile::new(icon.name, icon.content))
        .collect();

    let written = write_outputs(&category.output, &outputs)?;
    ctx.reload.reload();
    Ok(RunReport::new(KIND, written, 0))
}
