use crate::logger::{error::LoggerError, format::LoggerFormat};

#[derive(Debug, Clone)]
pub struct LoggerConfig {
    pub format: LoggerFormat,
    /// `EnvFilter` directive, e.g. `info` or `taskd=debug,warn`.
    pub level: String,
    pub with_targets: bool,
    pub use_color: bool,
}

impl LoggerConfig {
    /// Check the level directive without installing anything.
    pub fn validate(&self) -> Result<(), LoggerError> {
        crate::logger::install::filter(&self.level).map(|_| ())
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        let use_color = cfg!(test) || atty::is(atty::Stream::Stdout);
        Self {
            format: LoggerFormat::Text,
            level: "info".to_string(),
            with_targets: true,
            use_color,
        }
    }
}
