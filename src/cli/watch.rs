//! Watch loop entry: optional local server and tunnel, then the actor system.

use std::sync::Arc;

use anyhow::{Context, Result};
use crossbeam::channel;

use crate::actor::Coordinator;
use crate::cli::serve::{self, tunnel};
use crate::config::KilnConfig;
use crate::core::{Mode, register_shutdown};
use crate::paths::PathTable;

/// Worker threads for the watch actors; pipelines run on the blocking pool.
const RUNTIME_WORKERS: usize = 2;

/// Watch the source tree until Ctrl+C.
///
/// With `sync`, also serve the build root with live reload and start the
/// tunnel. Fails only if the watcher or runtime cannot be created.
pub fn watch(config: Arc<KilnConfig>, table: Arc<PathTable>, mode: Mode, sync: bool) -> Result<()> {
    let (shutdown_tx, shutdown_rx) = channel::bounded::<()>(1);
    register_shutdown(shutdown_tx);

    let mut server_thread = None;
    let mut tunnel_child = None;
    if sync {
        let bound = serve::bind_server(&config.serve, table.build_root())?;
        match tunnel::spawn(&config.serve, bound.addr().port()) {
            Ok(child) => tunnel_child = child,
            Err(e) => crate::log!("tunnel"; "{:#}", e),
        }
        server_thread = Some(bound.spawn());
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(RUNTIME_WORKERS)
        .enable_all()
        .build()
        .context("failed to create tokio runtime")?;

    let mut coordinator = Coordinator::new(Arc::clone(&config), table, mode)
        .with_shutdown_signal(shutdown_rx);
    if sync {
        coordinator = coordinator.with_ws_port(config.serve.interface, config.serve.ws_port);
    }
    let result = runtime.block_on(coordinator.run());

    tunnel::stop(tunnel_child);
    if let Some(handle) = server_thread
        && handle.is_finished()
    {
        let _ = handle.join();
    }
    result
}
