//! Local asset server with live reload support.
//!
//! Serves the build root over `tiny_http`. HTML responses get the live reload
//! client injected; the WebSocket side lives in `crate::reload`.

mod content;
mod lifecycle;
mod path;
mod response;
pub mod tunnel;

use crate::log;
use anyhow::Result;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU16, Ordering};
use std::thread::{self, JoinHandle};
use tiny_http::{Request, Server};

use crate::config::ServeConfig;

/// WebSocket port the live reload client connects to, 0 while unset.
/// Updated by the coordinator after the WebSocket server binds.
static ACTUAL_WS_PORT: AtomicU16 = AtomicU16::new(0);

/// Record the bound WebSocket port.
pub fn set_actual_ws_port(port: u16) {
    ACTUAL_WS_PORT.store(port, Ordering::Relaxed);
}

fn actual_ws_port() -> Option<u16> {
    let port = ACTUAL_WS_PORT.load(Ordering::Relaxed);
    (port != 0).then_some(port)
}

/// Request worker threads.
const WORKERS: usize = 4;

/// Bound server ready to accept requests.
pub struct BoundServer {
    server: Arc<Server>,
    addr: SocketAddr,
    root: PathBuf,
}

/// Bind the HTTP server without starting the request loop.
pub fn bind_server(config: &ServeConfig, root: &Path) -> Result<BoundServer> {
    let (server, addr) = lifecycle::bind_with_retry(config.interface, config.port)?;
    let server = Arc::new(server);
    lifecycle::register_for_shutdown(&server);

    log!("serve"; "http://{}", addr);

    Ok(BoundServer {
        server,
        addr,
        root: root.to_path_buf(),
    })
}

impl BoundServer {
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Run the request loop on a background thread.
    pub fn spawn(self) -> JoinHandle<()> {
        thread::spawn(move || {
            if let Err(e) = self.run() {
                log!("serve"; "error: {e:#}");
            }
        })
    }

    /// Run the request loop until the server is unblocked.
    pub fn run(self) -> Result<()> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(WORKERS)
            .thread_name(|i| format!("kiln-serve-{i}"))
            .build()?;
        let root = Arc::new(self.root);

        for request in self.server.incoming_requests() {
            let root = Arc::clone(&root);
            pool.spawn(move || {
                if let Err(e) = handle_request(request, &root) {
                    log!("serve"; "request error: {e}");
                }
            });
        }
        Ok(())
    }
}

/// Handle a single HTTP request.
fn handle_request(request: Request, root: &Path) -> Result<()> {
    if crate::core::is_shutdown() {
        return response::respond_unavailable(request);
    }

    let ws_port = actual_ws_port();
    if let Some(port) = ws_port
        && request.url() == crate::embed::serve::LIVERELOAD_URL
    {
        return response::respond_livereload_js(request, port);
    }

    if let Some(path) = path::resolve_path(request.url(), root) {
        return response::respond_file(request, &path, ws_port);
    }

    response::respond_not_found(request, root, ws_port)
}
