use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoggerError {
    #[error("unknown log format {0:?} (expected text, json or journald)")]
    UnknownFormat(String),
    #[error("journald output needs Linux and the `journald` feature")]
    JournaldUnavailable,
    #[error("a global logger is already installed")]
    AlreadyInstalled,
    #[error("failed to install logger: {0}")]
    Install(String),
    #[error("bad log filter {directive:?}: {reason}")]
    BadFilter { directive: String, reason: String },
}
