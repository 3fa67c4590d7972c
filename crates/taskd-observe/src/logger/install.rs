use time::{UtcOffset, format_description::well_known::Rfc3339};
use tracing_subscriber::{
    EnvFilter, fmt, fmt::time::OffsetTime, layer::SubscriberExt, util::SubscriberInitExt,
    util::TryInitError,
};

use crate::logger::{config::LoggerConfig, error::LoggerError, format::LoggerFormat};

/// Build the filter + output layer for `cfg` and make it the global default.
pub(crate) fn install(cfg: &LoggerConfig) -> Result<(), LoggerError> {
    let base = tracing_subscriber::registry().with(filter(&cfg.level)?);

    let installed = match cfg.format {
        LoggerFormat::Text => base
            .with(
                fmt::layer()
                    .with_ansi(cfg.use_color)
                    .with_target(cfg.with_targets)
                    .with_timer(local_rfc3339()),
            )
            .try_init(),
        LoggerFormat::Json => base
            .with(
                fmt::layer()
                    .json()
                    .with_ansi(false)
                    .with_target(cfg.with_targets)
                    .with_current_span(false)
                    .with_timer(local_rfc3339()),
            )
            .try_init(),
        LoggerFormat::Journald => {
            #[cfg(all(target_os = "linux", feature = "journald"))]
            {
                let journald = tracing_journald::layer()
                    .map_err(|e| LoggerError::Install(format!("journald: {e}")))?;
                base.with(journald).try_init()
            }

            #[cfg(not(all(target_os = "linux", feature = "journald")))]
            {
                drop(base);
                return Err(LoggerError::JournaldUnavailable);
            }
        }
    };
    installed.map_err(init_error)
}

pub(crate) fn filter(directive: &str) -> Result<EnvFilter, LoggerError> {
    EnvFilter::try_new(directive).map_err(|e| LoggerError::BadFilter {
        directive: directive.to_string(),
        reason: e.to_string(),
    })
}

/// RFC3339 timestamps in the host's local offset, UTC when it can't be determined.
fn local_rfc3339() -> OffsetTime<Rfc3339> {
    let offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);
    OffsetTime::new(offset, Rfc3339)
}

fn init_error(e: TryInitError) -> LoggerError {
    let msg = e.to_string();
    if msg.contains("global default") {
        LoggerError::AlreadyInstalled
    } else {
        LoggerError::Install(msg)
    }
}
