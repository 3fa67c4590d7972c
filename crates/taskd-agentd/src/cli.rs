use std::{path::PathBuf, time::Duration};

use clap::Parser;

use taskd_model::parse_duration;
use taskd_observe::LoggerFormat;

/// On-host agent serving the output of configured shell tasks.
#[derive(Debug, Parser)]
#[command(name = "taskd-agentd", version)]
pub struct Args {
    /// Task definitions document (YAML).
    #[arg(long, default_value = "/etc/taskd/client-config.yaml")]
    pub config: PathBuf,

    /// Log output: text, json or journald.
    #[arg(long, default_value = "text")]
    pub log_format: LoggerFormat,

    /// Log filter directive, e.g. `info` or `taskd=debug,warn`.
    #[arg(long, default_value = "info")]
    pub log_level: String,

    /// How often the config file is checked for changes.
    #[arg(long, default_value = "1m", value_parser = parse_duration)]
    pub reload_every: Duration,
}
