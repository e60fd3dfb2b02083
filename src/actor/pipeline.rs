//! Pipeline Actor
//!
//! Re-runs categories requested by the FsActor. Each batch runs on the
//! blocking pool and the actor does not wait for it, so a new batch may
//! overlap one still running; the last write wins.

use std::sync::Arc;

use anyhow::Result;
use rayon::prelude::*;
use tokio::sync::mpsc;

use super::messages::PipelineMsg;
use crate::config::KilnConfig;
use crate::core::Mode;
use crate::logger::{status_error, status_success};
use crate::paths::{CategoryKind, PathTable};
use crate::pipeline::{self, PipelineContext, RunReport};
use crate::reload::ReloadHandle;

/// Pipeline Actor - runs category pipelines on demand
pub struct PipelineActor {
    rx: mpsc::Receiver<PipelineMsg>,
    config: Arc<KilnConfig>,
    table: Arc<PathTable>,
    mode: Mode,
    reload: ReloadHandle,
}

impl PipelineActor {
    pub fn new(
        rx: mpsc::Receiver<PipelineMsg>,
        config: Arc<KilnConfig>,
        table: Arc<PathTable>,
        mode: Mode,
        reload: ReloadHandle,
    ) -> Self {
        Self {
            rx,
            config,
            table,
            mode,
            reload,
        }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                PipelineMsg::Run(categories) => self.spawn_batch(categories),
                PipelineMsg::Shutdown => {
                    crate::debug!("pipeline"; "shutting down");
                    break;
                }
            }
        }
    }

    fn spawn_batch(&self, categories: Vec<CategoryKind>) {
        let config = Arc::clone(&self.config);
        let table = Arc::clone(&self.table);
        let reload = self.reload.clone();
        let mode = self.mode;

        tokio::spawn(async move {
            let batch = tokio::task::spawn_blocking(move || {
                let ctx = PipelineContext {
                    config: &config,
                    table: &table,
                    mode,
                    reload: &reload,
                };
                run_batch(&categories, &ctx)
            })
            .await;

            match batch {
                Ok(results) => report(&results),
                Err(e) => status_error("pipeline task panicked", &e.to_string()),
            }
        });
    }
}

/// Run categories in parallel, keeping request order in the results.
pub fn run_batch(
    categories: &[CategoryKind],
    ctx: &PipelineContext<'_>,
) -> Vec<(CategoryKind, Result<RunReport>)> {
    categories
        .par_iter()
        .map(|&kind| (kind, pipeline::run(kind, ctx)))
        .collect()
}

/// One status block for a finished batch.
fn report(results: &[(CategoryKind, Result<RunReport>)]) {
    match summarize(results) {
        Ok(message) => status_success(&message),
        Err((summary, detail)) => status_error(&summary, &detail),
    }
}

/// `Ok("rebuilt: ...")` or `Err((summary, detail))`.
fn summarize(results: &[(CategoryKind, Result<RunReport>)]) -> Result<String, (String, String)> {
    let mut failed = Vec::new();
    let mut detail = Vec::new();
    for (kind, result) in results {
        match result {
            Ok(report) if report.is_clean() => {}
            Ok(report) => {
                failed.push(kind.name());
                detail.push(format!("{kind}: {} file(s) failed", report.failed));
            }
            Err(e) => {
                failed.push(kind.name());
                detail.push(format!("{e:#}"));
            }
        }
    }

    if failed.is_empty() {
        let names: Vec<_> = results.iter().map(|(kind, _)| kind.name()).collect();
        Ok(format!("rebuilt: {}", names.join(", ")))
    } else {
        Err((format!("failed: {}", failed.join(", ")), detail.join("\n")))
    }
}
