//! Public tunnel to the local server.
//!
//! Spawns `serve.tunnel_command` with `{port}` and `{name}` substituted. A
//! missing executable is a warning, never an error.

use std::process::{Child, Command, Stdio};

use anyhow::{Context, Result};

use crate::config::ServeConfig;
use crate::log;

/// Expand placeholders in the configured command.
pub fn command_line(config: &ServeConfig, port: u16) -> Vec<String> {
    let port = port.to_string();
    config
        .tunnel_command
        .iter()
        .map(|arg| arg.replace("{port}", &port).replace("{name}", &config.tunnel))
        .collect()
}

/// Start the tunnel in the background.
///
/// Returns `Ok(None)` when the tunnel is disabled or its program is not on
/// `PATH`.
pub fn spawn(config: &ServeConfig, port: u16) -> Result<Option<Child>> {
    if config.tunnel.is_empty() {
        return Ok(None);
    }
    let args = command_line(config, port);
    let Some((program, rest)) = args.split_first() else {
        return Ok(None);
    };

    let Ok(resolved) = which::which(program) else {
        log!("tunnel"; "`{}` not found on PATH, tunnel disabled", program);
        return Ok(None);
    };

    let child = Command::new(&resolved)
        .args(rest)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
        .with_context(|| format!("failed to start tunnel `{program}`"))?;

    log!("tunnel"; "{} (pid {})", config.tunnel, child.id());
    Ok(Some(child))
}

/// Stop a running tunnel.
pub fn stop(child: Option<Child>) {
    if let Some(mut child) = child {
        let _ = child.kill();
        let _ = child.wait();
    }
}
