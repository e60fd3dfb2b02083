//! Actor Coordinator - Wires up the Watch Actor System
//!
//! The Coordinator is a thin orchestrator that:
//! - Creates communication channels
//! - Wires up actors
//! - Runs them concurrently

mod runtime;

use std::net::IpAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel::Receiver;
use tokio::sync::mpsc;

use super::fs::FsActor;
use super::messages::{PipelineMsg, WsMsg};
use super::pipeline::PipelineActor;
use super::ws::WsActor;
use crate::config::KilnConfig;
use crate::core::Mode;
use crate::paths::PathTable;
use crate::reload::ReloadHandle;

const CHANNEL_BUFFER: usize = 32;

/// Coordinator - wires up and runs the actor system.
pub struct Coordinator {
    config: Arc<KilnConfig>,
    table: Arc<PathTable>,
    mode: Mode,
    ws: Option<(IpAddr, u16)>,
    shutdown_rx: Option<Receiver<()>>,
}

impl Coordinator {
    pub fn new(config: Arc<KilnConfig>, table: Arc<PathTable>, mode: Mode) -> Self {
        Self {
            config,
            table,
            mode,
            ws: None,
            shutdown_rx: None,
        }
    }

    /// Enable live reload on this interface and base port.
    pub fn with_ws_port(mut self, interface: IpAddr, port: u16) -> Self {
        self.ws = Some((interface, port));
        self
    }

    /// Set shutdown signal receiver.
    pub fn with_shutdown_signal(mut self, rx: Receiver<()>) -> Self {
        self.shutdown_rx = Some(rx);
        self
    }

    /// Run the actor system until shutdown.
    ///
    /// Fails only if the watcher cannot be created.
    pub async fn run(mut self) -> Result<()> {
        let (pipeline_tx, pipeline_rx) = mpsc::channel::<PipelineMsg>(CHANNEL_BUFFER);
        let (ws_tx, ws_rx) = mpsc::channel::<WsMsg>(CHANNEL_BUFFER);

        let mut reload = ReloadHandle::disabled();
        if let Some((interface, port)) = self.ws {
            match crate::reload::server::start_ws_server_with_channel(interface, port, ws_tx.clone()) {
                Ok(actual_port) => {
                    crate::cli::serve::set_actual_ws_port(actual_port);
                    crate::debug!("reload"; "ws://{}:{}", interface, actual_port);
                    reload = ReloadHandle::new(ws_tx.clone());
                }
                Err(e) => {
                    crate::log!("reload"; "websocket server failed: {}", e);
                }
            }
        }

        let fs_actor = FsActor::new(
            Arc::clone(&self.table),
            self.config.watch.debounce(),
            pipeline_tx.clone(),
        )
        .context("failed to start file watcher")?;

        let pipeline_actor = PipelineActor::new(
            pipeline_rx,
            Arc::clone(&self.config),
            Arc::clone(&self.table),
            self.mode,
            reload,
        );
        let ws_actor = WsActor::new(ws_rx);

        crate::log!("watch"; "watching {} for changes", self.table.source_root().display());
        let shutdown_rx = self.shutdown_rx.take();
        runtime::run_actors(
            fs_actor,
            pipeline_actor,
            ws_actor,
            pipeline_tx,
            ws_tx,
            shutdown_rx,
        )
        .await;

        crate::debug!("actor"; "stopped");
        Ok(())
    }
}
