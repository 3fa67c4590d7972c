use std::{fmt, time::Duration};

use thiserror::Error;

use crate::duration::DurationParseError;

/// Duration-valued field of a task entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurationField {
    Interval,
    Splice,
    Timeout,
}

impl DurationField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DurationField::Interval => "interval",
            DurationField::Splice => "splice",
            DurationField::Timeout => "timeout",
        }
    }
}

impl fmt::Display for DurationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A task entry that can't be turned into a runnable [`Task`](crate::Task).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task idx={index} has no name")]
    EmptyName { index: usize },

    #[error("{task}.{field}: {source}")]
    InvalidDuration {
        task: String,
        field: DurationField,
        #[source]
        source: DurationParseError,
    },

    #[error("{task}.{field} too small (min {min:?}): {value}")]
    TooSmall {
        task: String,
        field: DurationField,
        value: String,
        min: Duration,
    },

    #[error("{task}.timeout ({timeout:?}) > {task}.interval ({interval:?})")]
    TimeoutExceedsInterval {
        task: String,
        timeout: Duration,
        interval: Duration,
    },
}

impl ValidationError {
    /// Name of the offending task, when the entry had one.
    pub fn task(&self) -> Option<&str> {
        match self {
            ValidationError::EmptyName { .. } => None,
            ValidationError::InvalidDuration { task, .. }
            | ValidationError::TooSmall { task, .. }
            | ValidationError::TimeoutExceedsInterval { task, .. } => Some(task),
        }
    }
}
