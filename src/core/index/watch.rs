//! File system watcher feeding the debounced change path of the index.

use std::{
    path::PathBuf,
    sync::mpsc as std_mpsc,
    thread,
    time::Duration,
};

use anyhow::{Context, Result};
use notify::{Config as NotifyConfig, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::{runtime::Handle, sync::mpsc};
use tokio_util::sync::CancellationToken;

use super::service::TranslationIndex;

const POLL_INTERVAL: Duration = Duration::from_millis(250);

impl TranslationIndex {
    /// Watch the project root and forward changes of translation files to
    /// [`document_changed`](Self::document_changed).
    ///
    /// Must be called from within a tokio runtime. The watcher stops when the index is
    /// disposed or `stop` is cancelled.
    pub fn watch(&self, stop: CancellationToken) -> Result<()> {
        let handle = Handle::try_current().context("Watching requires a tokio runtime")?;
        let root = self.root().to_path_buf();

        let (watch_tx, watch_rx) = std_mpsc::channel();
        let mut watcher = RecommendedWatcher::new(watch_tx, NotifyConfig::default())
            .context("Failed to create file watcher")?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .with_context(|| format!("Failed to watch {}", root.display()))?;

        let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();
        let thread_stop = stop.clone();
        thread::spawn(move || forward_events(watcher, watch_rx, tx, thread_stop));

        let index = self.clone();
        let disposed = self.shutdown_token();
        handle.spawn(async move {
            loop {
                tokio::select! {
                    _ = stop.cancelled() => break,
                    _ = disposed.cancelled() => break,
                    changed = rx.recv() => {
                        let Some(path) = changed else { break };
                        index.document_changed(&path);
                    }
                }
            }
            stop.cancel();
        });
        tracing::debug!("watching {}", root.display());
        Ok(())
    }
}

fn forward_events(
    watcher: RecommendedWatcher,
    events: std_mpsc::Receiver<notify::Result<Event>>,
    tx: mpsc::UnboundedSender<PathBuf>,
    stop: CancellationToken,
) {
    // Dropping the watcher ends the subscription.
    let _watcher = watcher;
    while !stop.is_cancelled() {
        match events.recv_timeout(POLL_INTERVAL) {
            Ok(Ok(event)) => {
                for path in event.paths {
                    if tx.send(path).is_err() {
                        return;
                    }
                }
            }
            Ok(Err(e)) => tracing::warn!("watcher error: {}", e),
            Err(std_mpsc::RecvTimeoutError::Timeout) => continue,
            Err(std_mpsc::RecvTimeoutError::Disconnected) => return,
        }
    }
}
