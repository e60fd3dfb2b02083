//! FileSystem Actor
//!
//! Watches the source root and sends debounced category re-runs to the
//! PipelineActor.
//!
//! ```text
//! Watcher → Debouncer (pure timing) → route (path → categories) → PipelineMsg
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use rustc_hash::FxHashMap;
use tokio::sync::mpsc;

use super::messages::PipelineMsg;
use crate::paths::{CategoryKind, PathTable};

// Pure timing and deduplication.
mod debouncer;
// Shared fs event types.
mod types;

use debouncer::Debouncer;
use types::ChangeKind;

/// FileSystem Actor - watches for file changes
pub struct FsActor {
    /// Channel to receive notify events (sync -> async bridge)
    notify_rx: std::sync::mpsc::Receiver<notify::Result<notify::Event>>,
    /// Watcher handle (must be kept alive)
    watcher: RecommendedWatcher,
    /// Channel to send messages to PipelineActor
    pipeline_tx: mpsc::Sender<PipelineMsg>,
    /// Debouncer state
    debouncer: Debouncer,
    /// Category globs for routing
    table: Arc<PathTable>,
}

impl FsActor {
    /// Create the watcher on the source root.
    ///
    /// Events buffer in the channel until [`FsActor::run`] starts.
    pub fn new(
        table: Arc<PathTable>,
        debounce: Duration,
        pipeline_tx: mpsc::Sender<PipelineMsg>,
    ) -> notify::Result<Self> {
        // Create sync channel for notify (it doesn't support async)
        let (notify_tx, notify_rx) = std::sync::mpsc::channel();

        let mut watcher = notify::recommended_watcher(move |res| {
            let _ = notify_tx.send(res);
        })?;
        watcher.watch(table.source_root(), RecursiveMode::Recursive)?;
        crate::debug!("watch"; "watching {}", table.source_root().display());

        Ok(Self {
            notify_rx,
            watcher,
            pipeline_tx,
            debouncer: Debouncer::new(debounce),
            table,
        })
    }

    /// Run the actor event loop
    pub async fn run(self) {
        let notify_rx = self.notify_rx;
        let pipeline_tx = self.pipeline_tx;
        let table = self.table;
        let mut debouncer = self.debouncer;
        // Dropping the watcher stops events
        let _watcher = self.watcher;

        let (async_tx, mut async_rx) = mpsc::channel::<notify::Event>(64);

        // Spawn a thread to poll notify events and send to async channel
        std::thread::spawn(move || {
            while let Ok(result) = notify_rx.recv() {
                match result {
                    Ok(event) => {
                        if async_tx.blocking_send(event).is_err() {
                            break; // Receiver dropped
                        }
                    }
                    Err(e) => crate::log!("watch"; "notify error: {}", e),
                }
            }
        });

        loop {
            tokio::select! {
                biased;
                Some(event) = async_rx.recv() => debouncer.add_event(&event),
                _ = tokio::time::sleep(debouncer.sleep_duration()) => {
                    if process_changes(&mut debouncer, &pipeline_tx, &table).await.is_err() {
                        break;
                    }
                }
            }
        }
    }
}

/// Process debounced file changes
///
/// Returns `Err(())` if PipelineActor shut down
async fn process_changes(
    debouncer: &mut Debouncer,
    pipeline_tx: &mpsc::Sender<PipelineMsg>,
    table: &PathTable,
) -> Result<(), ()> {
    let Some(changes) = debouncer.take_if_ready() else {
        return Ok(());
    };

    log_changes(&changes, table.source_root());

    let categories = route_changes(changes.keys().map(PathBuf::as_path), table);
    if categories.is_empty() {
        return Ok(());
    }

    pipeline_tx
        .send(PipelineMsg::Run(categories))
        .await
        .map_err(|_| ())
}

/// Categories to re-run for a set of changed paths, in table order.
///
/// A views change also re-runs styles: the purge reference set changed.
pub fn route_changes<'a>(
    paths: impl IntoIterator<Item = &'a Path>,
    table: &PathTable,
) -> Vec<CategoryKind> {
    let mut categories: Vec<CategoryKind> = paths
        .into_iter()
        .flat_map(|path| table.categories_for(path))
        .collect();
    if categories.contains(&CategoryKind::Views) {
        categories.push(CategoryKind::Styles);
    }
    categories.sort_unstable();
    categories.dedup();
    categories
}

fn log_changes(changes: &FxHashMap<PathBuf, ChangeKind>, source_root: &Path) {
    for (path, kind) in changes {
        let rel = path.strip_prefix(source_root).unwrap_or(path);
        crate::debug!("watch"; "{}: {}", kind.label(), rel.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn table(dir: &TempDir) -> PathTable {
        PathTable::new(&dir.path().join("source"), &dir.path().join("build")).unwrap()
    }

    #[test]
    fn test_route_single_category() {
        let dir = TempDir::new().unwrap();
        let table = table(&dir);
        let path = dir.path().join("source/scripts/app.js");
        assert_eq!(route_changes([path.as_path()], &table), [CategoryKind::Scripts]);
    }

    #[test]
    fn test_views_also_rerun_styles() {
        let dir = TempDir::new().unwrap();
        let table = table(&dir);
        let view = dir.path().join("source/views/index.html");
        let sheet = dir.path().join("source/styles/app.scss");
        assert_eq!(
            route_changes([view.as_path(), sheet.as_path()], &table),
            [CategoryKind::Views, CategoryKind::Styles]
        );
    }

    #[test]
    fn test_image_routes_to_both_image_categories() {
        let dir = TempDir::new().unwrap();
        let table = table(&dir);
        let a = dir.path().join("source/images/a.png");
        let b = dir.path().join("source/images/b.png");
        assert_eq!(
            route_changes([a.as_path(), b.as_path()], &table),
            [CategoryKind::Images, CategoryKind::Imagewebp]
        );
    }

    #[test]
    fn test_unmatched_paths_ignored() {
        let dir = TempDir::new().unwrap();
        let table = table(&dir);
        let notes = dir.path().join("source/notes.md");
        assert!(route_changes([notes.as_path()], &table).is_empty());
    }

    #[test]
    fn test_missing_source_root_is_error() {
        let dir = TempDir::new().unwrap();
        let (tx, _rx) = mpsc::channel(1);
        let result = FsActor::new(Arc::new(table(&dir)), Duration::from_millis(10), tx);
        assert!(result.is_err());
    }
}
