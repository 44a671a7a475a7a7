//! Positions file watcher for hot reload.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::careers::JobRegistry;

/// A watcher that reloads the job registry when its positions file changes.
pub struct PositionsWatcher {
    path: PathBuf,
    registry: Arc<JobRegistry>,
}

impl PositionsWatcher {
    /// Create a new PositionsWatcher.
    pub fn new(path: &Path, registry: Arc<JobRegistry>) -> Self {
        Self {
            path: path.to_path_buf(),
            registry,
        }
    }

    /// Start watching the file in a background thread.
    ///
    /// The returned watcher must be kept alive for as long as reloads are wanted.
    pub fn run(self) -> Result<RecommendedWatcher, notify::Error> {
        let path = self.path.clone();
        let registry = self.registry;

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    if event.kind.is_modify() || event.kind.is_create() {
                        tracing::info!("Positions file change detected, reloading...");
                        if let Err(e) = registry.reload_from(&path) {
                            tracing::error!(
                                error = %e,
                                "Failed to reload positions. Keeping current registry."
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(Duration::from_secs(2)),
        )?;

        watcher.watch(&self.path, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Positions watcher started");
        Ok(watcher)
    }
}
