//! Hot reload of the resolver configuration file.
//!
//! # Data Flow
//! ```text
//! notify event (modify/create, any number per save)
//!     → unit signal over an mpsc channel
//!     → debounce task waits for `debounce` of quiet
//!     → load_with_env (parse, env overlay, validate)
//!     → forwarded only if valid and different from the last config
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::config::loader::load_with_env;
use crate::config::schema::ResolverConfig;

/// Quiet period after the last file event before reloading.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Emits one validated `ResolverConfig` per effective change of the file.
pub struct ConfigWatcher {
    path: PathBuf,
    current: ResolverConfig,
    debounce: Duration,
    update_tx: mpsc::UnboundedSender<ResolverConfig>,
}

/// Keeps the file watch and debounce task alive; dropping it stops both.
pub struct WatchHandle {
    _watcher: RecommendedWatcher,
    task: JoinHandle<()>,
}

impl Drop for WatchHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

impl ConfigWatcher {
    /// `current` is the config already in use, as loaded from `path`.
    pub fn new(
        path: &Path,
        current: ResolverConfig,
    ) -> (Self, mpsc::UnboundedReceiver<ResolverConfig>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();
        (
            Self {
                path: path.to_path_buf(),
                current,
                debounce: DEFAULT_DEBOUNCE,
                update_tx,
            },
            update_rx,
        )
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    /// Start watching. Must be called inside a Tokio runtime.
    pub fn run(self) -> Result<WatchHandle, notify::Error> {
        let (event_tx, event_rx) = mpsc::unbounded_channel::<()>();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) if event.kind.is_modify() || event.kind.is_create() => {
                    let _ = event_tx.send(());
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Config watch error"),
            },
            Config::default(),
        )?;
        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;
        tracing::info!(path = ?self.path, debounce_ms = self.debounce.as_millis() as u64, "Config watcher started");

        let task = tokio::spawn(self.forward(event_rx));
        Ok(WatchHandle {
            _watcher: watcher,
            task,
        })
    }

    async fn forward(mut self, mut events: mpsc::UnboundedReceiver<()>) {
        while events.recv().await.is_some() {
            let mut closed = false;
            loop {
                match tokio::time::timeout(self.debounce, events.recv()).await {
                    Ok(Some(())) => continue,
                    Ok(None) => {
                        closed = true;
                        break;
                    }
                    Err(_) => break,
                }
            }

            match load_with_env(Some(&self.path)) {
                Ok(config) if config == self.current => {
                    tracing::debug!("Config file touched but unchanged");
                }
                Ok(config) => {
                    tracing::info!("Config file changed, forwarding reload");
                    self.current = config.clone();
                    if self.update_tx.send(config).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Rejected config change, keeping current configuration");
                }
            }

            if closed {
                return;
            }
        }
    }
}
