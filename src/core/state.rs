//! Process-wide shutdown state.
//!
//! One-shot commands register nothing, so Ctrl+C exits at once. The watch
//! loop registers its shutdown channel (and the asset server when `--sync`
//! is on) so Ctrl+C stops the actors and unblocks `recv()` instead.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};

use anyhow::anyhow;
use crossbeam::channel::Sender;
use tiny_http::Server;

/// Things to notify when shutdown is requested.
struct Registry {
    requested: AtomicBool,
    actors: OnceLock<Sender<()>>,
    server: OnceLock<Arc<Server>>,
}

static REGISTRY: Registry = Registry {
    requested: AtomicBool::new(false),
    actors: OnceLock::new(),
    server: OnceLock::new(),
};

/// Install the Ctrl+C handler. Call once, before anything blocks.
pub fn setup_shutdown_handler() -> anyhow::Result<()> {
    ctrlc::set_handler(|| {
        if !request_shutdown() {
            std::process::exit(0);
        }
    })
    .map_err(|e| anyhow!("failed to set Ctrl+C handler: {e}"))
}

/// Mark shutdown and notify whatever is registered.
///
/// Returns `false` when no watch loop is listening.
pub fn request_shutdown() -> bool {
    REGISTRY.requested.store(true, Ordering::SeqCst);

    let Some(tx) = REGISTRY.actors.get() else {
        return false;
    };
    crate::log!("watch"; "shutting down...");
    let _ = tx.send(());

    if let Some(server) = REGISTRY.server.get() {
        server.unblock();
    }
    true
}

/// Register the watch loop's shutdown channel.
pub fn register_shutdown(tx: Sender<()>) {
    let _ = REGISTRY.actors.set(tx);
}

/// Register the asset server so its accept loop can be unblocked.
pub fn register_server(server: Arc<Server>) {
    let _ = REGISTRY.server.set(server);
}

/// Relaxed: a pipeline may finish one more file after Ctrl+C.
pub fn is_shutdown() -> bool {
    REGISTRY.requested.load(Ordering::Relaxed)
}
