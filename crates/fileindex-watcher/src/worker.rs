//! The change watcher.
//!
//! Ties a `FileWatcher` to an `IndexService` through a single queue.
//! One worker owns the service and handles queued commands strictly in
//! arrival order, so a pattern reload and a rebuild can never interleave.

use crate::config::WatchConfig;
use crate::error::{Result, WatchError};
use crate::service::IndexService;
use crate::watcher::{FileChange, FileWatcher};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

enum Command {
    Change(FileChange),
    Recreate,
    Shutdown,
}

/// Keeps the index file up to date while it runs.
///
/// Must be started from within a Tokio runtime; the worker runs on the
/// runtime's blocking pool since every step is file I/O.
pub struct ChangeWatcher {
    commands: UnboundedSender<Command>,
    watcher: Option<FileWatcher>,
    worker: Option<JoinHandle<()>>,
}

impl ChangeWatcher {
    /// Starts watching `config.root`.
    ///
    /// The ignore list is loaded and the index is written once before any
    /// file system change is processed. Changes that arrive in the meantime
    /// are queued behind that first build.
    pub fn start(config: WatchConfig) -> Result<Self> {
        let service = IndexService::new(config)?;
        let (tx, rx) = unbounded_channel();

        let events = tx.clone();
        let watcher = FileWatcher::new(service.event_filter(), move |change| {
            if events.send(Command::Change(change)).is_err() {
                warn!("Failed to queue file change, index worker has stopped");
            }
        })?;

        let worker = tokio::task::spawn_blocking(move || run(service, rx));

        Ok(Self {
            commands: tx,
            watcher: Some(watcher),
            worker: Some(worker),
        })
    }

    /// Queues a full rebuild, as if the tree had changed.
    pub fn recreate(&self) -> Result<()> {
        self.commands
            .send(Command::Recreate)
            .map_err(|_| WatchError::WorkerStopped)
    }

    /// Stops watching and waits for queued work to finish.
    pub async fn shutdown(mut self) {
        self.watcher.take();
        let _ = self.commands.send(Command::Shutdown);

        if let Some(worker) = self.worker.take() {
            if let Err(e) = worker.await {
                warn!("Index worker ended abnormally: {}", e);
            }
        }
        info!("Stopped watching");
    }
}

impl Drop for ChangeWatcher {
    fn drop(&mut self) {
        if self.worker.is_some() {
            self.watcher.take();
            let _ = self.commands.send(Command::Shutdown);
        }
    }
}

fn run(mut service: IndexService, mut commands: UnboundedReceiver<Command>) {
    service.startup();

    while let Some(command) = commands.blocking_recv() {
        match command {
            Command::Change(change) => {
                service.handle(&change);
            }
            Command::Recreate => {
                debug!("Forced index recreation");
                service.recreate();
            }
            Command::Shutdown => break,
        }
    }

    debug!("Index worker finished");
}
