use std::path::PathBuf;

use thiserror::Error;

use taskd_model::ValidationError;

/// The config document could not be turned into a registry.
///
/// Any of these aborts the whole load; nothing is published.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config document: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid task: {0}")]
    Validation(#[from] ValidationError),

    #[error("duplicate task name: {0}")]
    DuplicateTask(String),
}

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("config load failed: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to stat {}: {source}", path.display())]
    ReloadIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
