use std::time::Duration;

use thiserror::Error;

/// Underlying cause of a failed execution.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExecError {
    #[error("spawn failed: {0}")]
    Spawn(String),
    #[error("wait failed: {0}")]
    Wait(String),
    #[error("non-zero exit code: {code}")]
    NonZeroExit { code: i32 },
    #[error("killed by signal {signal}")]
    KilledBySignal { signal: i32 },
    #[error("timed out after {timeout:?}")]
    Timeout { timeout: Duration },
}

impl From<std::io::Error> for ExecError {
    fn from(e: std::io::Error) -> Self {
        ExecError::Wait(e.to_string())
    }
}
