//! kiln - a static asset pipeline for front-end source trees.

#![allow(dead_code)]

mod actor;
mod asset;
mod cli;
mod config;
mod core;
mod css;
mod embed;
mod image;
mod logger;
mod orchestrator;
mod paths;
mod pipeline;
mod reload;
mod utils;

use std::sync::Arc;

use anyhow::{Result, bail};
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::KilnConfig;
use paths::{CategoryKind, PathTable};
use pipeline::PipelineContext;
use reload::ReloadHandle;

fn main() -> Result<()> {
    // Before any blocking operation
    core::setup_shutdown_handler()?;

    let cli = Cli::parse();

    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = Arc::new(KilnConfig::load(&cli)?);
    let table = Arc::new(PathTable::new(config.source_root(), config.build_root())?);
    let mode = cli.mode();
    debug!(
        "kiln";
        "mode {}, source {}, build {}",
        mode,
        table.source_root().display(),
        table.build_root().display()
    );

    match &cli.command {
        Some(Commands::Clean) => {
            let removed = orchestrator::clean(table.build_root())?;
            log!("clean"; "removed {} entr(ies) from {}", removed, table.build_root().display());
            Ok(())
        }
        Some(Commands::Once { categories }) => {
            let ok = if categories.is_empty() {
                build_once(&config, &table, mode, &CategoryKind::ALL, true)?
            } else {
                let mut categories = categories.clone();
                categories.sort();
                categories.dedup();
                build_once(&config, &table, mode, &categories, false)?
            };
            if !ok {
                bail!("some pipelines failed");
            }
            Ok(())
        }
        Some(Commands::Watch) => cli::watch::watch(config, table, mode, cli.sync),
        None => {
            // Pipeline failures are logged; the watch loop starts regardless.
            build_once(&config, &table, mode, &CategoryKind::ALL, true)?;
            cli::watch::watch(config, table, mode, cli.sync)
        }
    }
}

/// Run categories once without live reload. `Ok(false)` if any failed.
fn build_once(
    config: &KilnConfig,
    table: &PathTable,
    mode: core::Mode,
    categories: &[CategoryKind],
    clean_first: bool,
) -> Result<bool> {
    let reload = ReloadHandle::disabled();
    let ctx = PipelineContext {
        config,
        table,
        mode,
        reload: &reload,
    };
    orchestrator::build(categories, clean_first, &ctx)
}
