mod config;
mod error;
mod format;
mod install;

pub use config::LoggerConfig;
pub use error::LoggerError;
pub use format::LoggerFormat;

/// Install the global `tracing` subscriber described by `cfg`.
///
/// Can only succeed once per process.
pub fn logger_init(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    install::install(cfg)?;
    tracing::debug!(target: "taskd.observe", format = %cfg.format, filter = %cfg.level, "logger installed");
    Ok(())
}
