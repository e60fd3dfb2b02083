use std::time::Duration;

use crossbeam::channel::{Receiver, TryRecvError};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::actor::fs::FsActor;
use crate::actor::messages::{PipelineMsg, WsMsg};
use crate::actor::pipeline::PipelineActor;
use crate::actor::ws::WsActor;

/// Poll interval for the crossbeam shutdown channel.
const SHUTDOWN_POLL: Duration = Duration::from_millis(100);

/// How long each actor may take to drain after `Shutdown`.
const DRAIN_GRACE: Duration = Duration::from_millis(500);

/// Run all actors until shutdown is signalled or one of them exits.
pub(super) async fn run_actors(
    fs: FsActor,
    pipeline: PipelineActor,
    ws: WsActor,
    pipeline_tx: mpsc::Sender<PipelineMsg>,
    ws_tx: mpsc::Sender<WsMsg>,
    shutdown_rx: Option<Receiver<()>>,
) {
    let mut fs_task = tokio::spawn(fs.run());
    let mut pipeline_task = tokio::spawn(pipeline.run());
    let mut ws_task = tokio::spawn(ws.run());

    let signalled = tokio::select! {
        _ = &mut fs_task => false,
        _ = &mut pipeline_task => false,
        _ = &mut ws_task => false,
        signalled = wait_for_shutdown(shutdown_rx) => signalled,
    };
    if !signalled {
        crate::debug!("actor"; "an actor exited, stopping the rest");
    }

    // Pipeline first so an in-flight rebuild can still broadcast.
    let _ = pipeline_tx.send(PipelineMsg::Shutdown).await;
    drain(pipeline_task).await;
    let _ = ws_tx.send(WsMsg::Shutdown).await;
    drain(ws_task).await;
    fs_task.abort();
}

/// Resolves `true` once the signal arrives, `false` if the sender is gone.
/// Without a receiver it never resolves.
async fn wait_for_shutdown(rx: Option<Receiver<()>>) -> bool {
    let Some(rx) = rx else {
        return std::future::pending().await;
    };
    loop {
        match rx.try_recv() {
            Ok(()) => {
                crate::debug!("actor"; "shutdown signal received");
                return true;
            }
            Err(TryRecvError::Disconnected) => return false,
            Err(TryRecvError::Empty) => tokio::time::sleep(SHUTDOWN_POLL).await,
        }
    }
}

async fn drain<T>(task: JoinHandle<T>) {
    if task.is_finished() {
        return;
    }
    let _ = tokio::time::timeout(DRAIN_GRACE, task).await;
}
