//! The long-lived translation index.
//!
//! Readers load the current [`CacheSnapshot`] without locking. Rebuilds run off to the
//! side and are published with a single pointer swap, so a reader sees either the old
//! snapshot or the new one, never a mix.
//!
//! Every refresh request takes a new generation number. Inside a tokio runtime requests
//! are handed to one worker task that always builds the latest generation, so a burst
//! of requests collapses into a single rebuild. A build whose generation has been
//! superseded is cancelled between files, and its result is discarded if it finishes
//! anyway. Without a runtime, `refresh` builds on the calling thread.

use std::{
    path::{Path, PathBuf},
    sync::{
        Arc, Mutex, MutexGuard, PoisonError, Weak,
        atomic::{AtomicBool, AtomicU64, Ordering},
    },
    time::Duration,
};

use arc_swap::ArcSwap;
use tokio::{
    runtime::Handle,
    sync::{Notify, watch},
    task::JoinHandle,
};
use tokio_util::sync::CancellationToken;

use super::{
    builder::{BuildRequest, build_snapshot},
    snapshot::CacheSnapshot,
};
use crate::config::Config;
use crate::core::{
    data::Framework,
    namespace::{ConfiguredModules, KeyUsage, ModuleGraph, collect_usages},
    scanner::TranslationScanner,
};

/// Lifecycle of a [`TranslationIndex`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    Uninitialized,
    /// The first build is running.
    Initializing,
    Ready,
    /// A rebuild is running; queries are served from the previous snapshot.
    Refreshing,
    Disposed,
}

/// Called after every published snapshot, outside the build lock, so it may edit files
/// or rebuild the index itself.
pub type RefreshSignal = Arc<dyn Fn(&CacheSnapshot) + Send + Sync>;

pub struct TranslationIndexBuilder {
    root: PathBuf,
    config: Option<Config>,
    modules: Option<Box<dyn ModuleGraph>>,
    refresh_signal: Option<RefreshSignal>,
}

impl TranslationIndexBuilder {
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Module graph used to partition the index. Defaults to [`ConfiguredModules`].
    pub fn module_graph(mut self, modules: impl ModuleGraph + 'static) -> Self {
        self.modules = Some(Box::new(modules));
        self
    }

    pub fn refresh_signal(
        mut self,
        signal: impl Fn(&CacheSnapshot) + Send + Sync + 'static,
    ) -> Self {
        self.refresh_signal = Some(Arc::new(signal));
        self
    }

    pub fn build(self) -> TranslationIndex {
        let config = self.config.unwrap_or_default();
        let modules = self
            .modules
            .unwrap_or_else(|| Box::new(ConfiguredModules::new(&config)));
        let (built, _) = watch::channel(0);

        TranslationIndex {
            inner: Arc::new(Inner {
                scanner: TranslationScanner::new(&self.root, &config),
                root: self.root,
                config,
                modules,
                refresh_signal: self.refresh_signal,
                current: ArcSwap::new(CacheSnapshot::empty()),
                state: Mutex::new(IndexState::Uninitialized),
                initialized: AtomicBool::new(false),
                requested: AtomicU64::new(0),
                published: AtomicU64::new(0),
                completed: AtomicU64::new(0),
                built,
                build_lock: Mutex::new(()),
                in_flight: Mutex::new(None),
                shutdown: CancellationToken::new(),
                wake: Arc::new(Notify::new()),
                worker_started: AtomicBool::new(false),
                debounce: Mutex::new(None),
            }),
        }
    }
}

/// Shared handle to the index of one project. Cheap to clone.
#[derive(Clone)]
pub struct TranslationIndex {
    inner: Arc<Inner>,
}

struct Inner {
    root: PathBuf,
    config: Config,
    scanner: TranslationScanner,
    modules: Box<dyn ModuleGraph>,
    refresh_signal: Option<RefreshSignal>,
    current: ArcSwap<CacheSnapshot>,
    /// Also serializes publication against disposal.
    state: Mutex<IndexState>,
    initialized: AtomicBool,
    /// Latest requested generation.
    requested: AtomicU64,
    published: AtomicU64,
    /// Latest generation built so far. Only written under `build_lock`.
    completed: AtomicU64,
    /// Latest generation whose build has finished, published or not.
    built: watch::Sender<u64>,
    /// Held by builds and by file edits, so an edit never overlaps a scan.
    build_lock: Mutex<()>,
    in_flight: Mutex<Option<CancellationToken>>,
    shutdown: CancellationToken,
    wake: Arc<Notify>,
    worker_started: AtomicBool,
    debounce: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for Inner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl TranslationIndex {
    pub fn builder(root: impl Into<PathBuf>) -> TranslationIndexBuilder {
        TranslationIndexBuilder {
            root: root.into(),
            config: None,
            modules: None,
            refresh_signal: None,
        }
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    /// The current snapshot. Hold it for the duration of one query.
    pub fn snapshot(&self) -> Arc<CacheSnapshot> {
        self.inner.current.load_full()
    }

    pub fn state(&self) -> IndexState {
        *lock(&self.inner.state)
    }

    /// Number of snapshots published so far.
    pub fn published_count(&self) -> u64 {
        self.inner.published.load(Ordering::SeqCst)
    }

    pub fn framework(&self) -> Framework {
        self.snapshot().framework()
    }

    pub fn available_locales(&self) -> Vec<String> {
        self.snapshot().available_locales()
    }

    /// Returns true if `path` is a file a rebuild would parse. Needs no file system
    /// access, so deleted files are classified too.
    pub fn is_translation_file(&self, path: &Path) -> bool {
        self.inner.scanner.is_translation_file(path)
    }

    /// Source locations whose translation call resolves to `key`.
    pub fn find_usages(&self, key: &str) -> Vec<KeyUsage> {
        collect_usages(&self.inner.root, &self.inner.config)
            .into_iter()
            .filter(|usage| usage.refers_to(key))
            .collect()
    }

    /// Start the index. Only the first call has an effect.
    pub fn initialize(&self) {
        if self
            .inner
            .initialized
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        {
            let mut state = lock(&self.inner.state);
            if *state != IndexState::Uninitialized {
                return;
            }
            *state = IndexState::Initializing;
        }
        self.refresh();
    }

    /// Request a rebuild.
    ///
    /// Blocks until the rebuild is published when no tokio runtime is running on this
    /// thread. Otherwise the request is coalesced onto the background worker and this
    /// returns immediately; await [`settled`](Self::settled) to observe the result.
    pub fn refresh(&self) {
        if self.state() == IndexState::Disposed {
            return;
        }
        let generation = self.inner.request_generation();
        match Handle::try_current() {
            Ok(handle) => {
                self.ensure_worker(&handle);
                self.inner.wake.notify_one();
            }
            Err(_) => {
                self.inner.run_build(generation);
            }
        }
    }

    /// Rebuild on the calling thread and publish before returning.
    ///
    /// Returns true if the rebuild was published.
    pub fn rebuild_now(&self) -> bool {
        if self.state() == IndexState::Disposed {
            return false;
        }
        let generation = self.inner.request_generation();
        self.inner.run_build(generation)
    }

    /// React to a change of `path` on disk. Returns true if it triggered a refresh.
    pub fn invalidate_file(&self, path: &Path) -> bool {
        if !self.is_translation_file(path) {
            return false;
        }
        tracing::debug!("invalidated {}", path.display());
        self.refresh();
        true
    }

    /// Debounced variant of [`invalidate_file`](Self::invalidate_file) for change
    /// notifications: the refresh runs once no change has arrived for the configured
    /// quiet period. Without a runtime the refresh runs immediately.
    pub fn document_changed(&self, path: &Path) -> bool {
        if !self.is_translation_file(path) {
            return false;
        }
        let Ok(handle) = Handle::try_current() else {
            self.refresh();
            return true;
        };

        let delay = Duration::from_millis(self.inner.config.debounce_millis);
        let shutdown = self.inner.shutdown.clone();
        let weak = Arc::downgrade(&self.inner);

        let mut pending = lock(&self.inner.debounce);
        if let Some(previous) = pending.take() {
            previous.abort();
        }
        *pending = Some(handle.spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {}
                _ = tokio::time::sleep(delay) => {
                    if let Some(inner) = weak.upgrade() {
                        TranslationIndex { inner }.refresh();
                    }
                }
            }
        }));
        true
    }

    /// Resolves once the latest requested rebuild has finished, or the index is
    /// disposed.
    pub async fn settled(&self) {
        let mut built = self.inner.built.subscribe();
        loop {
            let target = self.inner.requested.load(Ordering::SeqCst);
            if *built.borrow_and_update() >= target || self.state() == IndexState::Disposed {
                return;
            }
            if built.changed().await.is_err() {
                return;
            }
        }
    }

    /// Cancelled when the index is disposed.
    pub(crate) fn shutdown_token(&self) -> CancellationToken {
        self.inner.shutdown.clone()
    }

    /// Run `edit` while no rebuild is scanning.
    pub(crate) fn with_build_lock<T>(&self, edit: impl FnOnce() -> T) -> T {
        let _guard = lock(&self.inner.build_lock);
        edit()
    }

    /// Stop all background work and drop the data. Safe to call repeatedly.
    pub fn dispose(&self) {
        {
            let mut state = lock(&self.inner.state);
            *state = IndexState::Disposed;
            self.inner.current.store(CacheSnapshot::empty());
        }
        self.inner.initialized.store(false, Ordering::SeqCst);
        self.inner.shutdown.cancel();
        if let Some(pending) = lock(&self.inner.debounce).take() {
            pending.abort();
        }
        self.inner.built.send_modify(|_| {});
        tracing::debug!("index for {} disposed", self.inner.root.display());
    }

    fn ensure_worker(&self, handle: &Handle) {
        if self
            .inner
            .worker_started
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            return;
        }
        let weak = Arc::downgrade(&self.inner);
        let wake = Arc::clone(&self.inner.wake);
        let shutdown = self.inner.shutdown.clone();
        handle.spawn(run_worker(weak, wake, shutdown));
    }
}

/// Builds the latest requested generation each time it is woken.
async fn run_worker(inner: Weak<Inner>, wake: Arc<Notify>, shutdown: CancellationToken) {
    let mut last_built = 0;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            _ = wake.notified() => {}
        }

        loop {
            let Some(strong) = inner.upgrade() else {
                return;
            };
            let target = strong.requested.load(Ordering::SeqCst);
            if target <= last_built || shutdown.is_cancelled() {
                break;
            }
            let result = tokio::task::spawn_blocking(move || strong.run_build(target)).await;
            if let Err(e) = result {
                tracing::warn!("rebuild task failed: {}", e);
            }
            last_built = target;
        }
    }
    tracing::debug!("index worker stopped");
}

impl Inner {
    /// Take a new generation number and cancel the build it supersedes.
    fn request_generation(&self) -> u64 {
        let generation = self.requested.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(in_flight) = lock(&self.in_flight).take() {
            in_flight.cancel();
        }
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.requested.load(Ordering::SeqCst) == generation && !self.shutdown.is_cancelled()
    }

    /// Build `generation` and publish it if it is still the latest request.
    fn run_build(&self, generation: u64) -> bool {
        let published = {
            let _guard = lock(&self.build_lock);
            let published = self.build_locked(generation);
            self.completed.fetch_max(generation, Ordering::SeqCst);
            published
        };

        if let (Some(snapshot), Some(signal)) = (&published, &self.refresh_signal) {
            signal(snapshot);
        }
        self.built.send_modify(|built| *built = (*built).max(generation));
        published.is_some()
    }

    fn build_locked(&self, generation: u64) -> Option<Arc<CacheSnapshot>> {
        // A synchronous rebuild may already have built what the worker was woken for.
        if !self.is_current(generation) || self.completed.load(Ordering::SeqCst) >= generation {
            return None;
        }

        let cancel = self.shutdown.child_token();
        *lock(&self.in_flight) = Some(cancel.clone());
        {
            let mut state = lock(&self.state);
            if *state == IndexState::Ready {
                *state = IndexState::Refreshing;
            }
        }

        let request = BuildRequest {
            root: &self.root,
            config: &self.config,
            modules: &*self.modules,
            generation,
        };
        let snapshot = build_snapshot(&request, &cancel);
        self.publish(generation, snapshot)
    }

    fn publish(
        &self,
        generation: u64,
        snapshot: Option<CacheSnapshot>,
    ) -> Option<Arc<CacheSnapshot>> {
        let snapshot = {
            let mut state = lock(&self.state);
            let snapshot = snapshot?;
            if *state == IndexState::Disposed || !self.is_current(generation) {
                tracing::debug!("generation {} superseded, discarded", generation);
                return None;
            }
            let snapshot = Arc::new(snapshot);
            self.current.store(Arc::clone(&snapshot));
            self.published.fetch_add(1, Ordering::SeqCst);
            *state = IndexState::Ready;
            snapshot
        };

        tracing::info!(
            "published generation {}: {} files, {} keys",
            generation,
            snapshot.files().len(),
            snapshot.data().translations.len()
        );
        Some(snapshot)
    }
}
