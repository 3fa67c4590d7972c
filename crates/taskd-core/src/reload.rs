use std::{
    path::{Path, PathBuf},
    time::{Duration, SystemTime},
};

use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

use crate::{
    error::{ConfigError, CoreError},
    loader,
    registry::Registry,
};

/// How often the config file is checked by default.
pub const DEFAULT_CHECK_EVERY: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct ReloadConfig {
    /// Period between two modification-time checks.
    pub check_every: Duration,
}

impl Default for ReloadConfig {
    fn default() -> Self {
        Self {
            check_every: DEFAULT_CHECK_EVERY,
        }
    }
}

/// Result of one modification-time check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReloadOutcome {
    /// File not modified since the last successful load.
    Unchanged,
    /// A new snapshot was published.
    Reloaded,
    /// Stat, read or validation failed; the previous snapshot stays published.
    Failed,
}

/// Sole writer of a [`Registry`]: follows the config file and republishes it when it changes.
pub struct ReloadController {
    path: PathBuf,
    cfg: ReloadConfig,
    registry: Registry,
    /// Modification time observed before the last successful load.
    loaded_mtime: SystemTime,
}

impl ReloadController {
    /// Load the config once and build the controller around it.
    ///
    /// An error here means the agent has no usable config and must not start serving.
    pub async fn start(path: impl AsRef<Path>, cfg: ReloadConfig) -> Result<Self, CoreError> {
        let path = path.as_ref().to_path_buf();

        let loaded_mtime = modified(&path).await.map_err(|source| {
            CoreError::Config(ConfigError::Io {
                path: path.clone(),
                source,
            })
        })?;
        let snapshot = loader::load_from_path(&path).await?;

        info!(
            target: "taskd.core.reload",
            path = %path.display(),
            tasks = snapshot.len(),
            "initial config loaded"
        );
        Ok(Self {
            registry: Registry::from_snapshot(snapshot),
            loaded_mtime,
            path,
            cfg,
        })
    }

    /// Read handle to the published registry.
    pub fn registry(&self) -> Registry {
        self.registry.clone()
    }

    /// Check the file once and reload it if it is newer than the last successful load.
    ///
    /// Failures are logged and leave the published registry untouched.
    pub async fn check_now(&mut self) -> ReloadOutcome {
        let mtime = match modified(&self.path).await {
            Ok(mtime) => mtime,
            Err(source) => {
                let err = CoreError::ReloadIo {
                    path: self.path.clone(),
                    source,
                };
                warn!(target: "taskd.core.reload", error = %err, "config check failed; keeping current tasks");
                return ReloadOutcome::Failed;
            }
        };

        if mtime <= self.loaded_mtime {
            trace!(target: "taskd.core.reload", "config unchanged");
            return ReloadOutcome::Unchanged;
        }

        match loader::load_from_path(&self.path).await {
            Ok(snapshot) => {
                let tasks = snapshot.len();
                self.registry.publish(snapshot);
                self.loaded_mtime = mtime;
                info!(target: "taskd.core.reload", path = %self.path.display(), tasks, "config reloaded");
                ReloadOutcome::Reloaded
            }
            Err(err) => {
                error!(
                    target: "taskd.core.reload",
                    path = %self.path.display(),
                    error = %err,
                    "failed to reload config; keeping current tasks"
                );
                ReloadOutcome::Failed
            }
        }
    }

    /// Run the periodic check until `cancel` fires.
    ///
    /// The controller moves into the task, so once the handle resolves nothing writes to the registry anymore.
    pub fn spawn(mut self, cancel: CancellationToken) -> JoinHandle<()> {
        tokio::spawn(async move {
            let period = self.cfg.check_every.max(Duration::from_millis(1));
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            debug!(target: "taskd.core.reload", every_ms = period.as_millis() as u64, "reload loop started");
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = ticker.tick() => {
                        self.check_now().await;
                    }
                }
            }
            debug!(target: "taskd.core.reload", "reload loop stopped");
        })
    }
}

async fn modified(path: &Path) -> std::io::Result<SystemTime> {
    tokio::fs::metadata(path).await?.modified()
}
