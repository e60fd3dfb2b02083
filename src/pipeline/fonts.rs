//! Fonts: copied unchanged.

use anyhow::Result;

use super::{OutputFile, PipelineContext, RunReport, read_sources, write_outputs};
use crate::paths::CategoryKind;

const KIND: CategoryKind = CategoryKind::Fonts;

pub(super) fn run(ctx: &PipelineContext<'_>) -> Result<RunReport> {
    let category = ctx.category(KIND);
    let outputs: Vec<_> = read_sources(category)?
        .into_iter()
        .map(|file| OutputFile::new(file.rel, file.content))
        .collect();
    let written = write_outputs(&category.output, &outputs)?;
    ctx.reload.reload();
    Ok(RunReport::new(KIND, written, 0))
}
