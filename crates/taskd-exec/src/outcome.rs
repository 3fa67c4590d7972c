use std::{fmt, time::Duration};

use crate::error::ExecError;

/// Classification of an execution result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// Command exited with status 0 before its deadline.
    None,
    /// Deadline reached; the process group was killed.
    Timeout,
    /// Command ran to completion but exited non-zero (or died from a signal).
    NonZeroExit,
    /// Command could not be launched.
    SpawnFailure,
}

impl FailureKind {
    /// Short stable label for logs.
    pub fn as_label(&self) -> &'static str {
        match self {
            FailureKind::None => "none",
            FailureKind::Timeout => "timeout",
            FailureKind::NonZeroExit => "non_zero_exit",
            FailureKind::SpawnFailure => "spawn_failure",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_label())
    }
}

/// Everything observed during one execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecOutcome {
    /// Captured stdout (lossy UTF-8).
    pub output: String,
    /// Captured stderr (lossy UTF-8).
    pub stderr: String,
    pub failure: FailureKind,
    /// Cause of the failure; `None` on success.
    pub error: Option<ExecError>,
    /// Wall-clock time from invocation to result.
    pub elapsed: Duration,
}

impl ExecOutcome {
    pub(crate) fn success(output: String, stderr: String, elapsed: Duration) -> Self {
        Self {
            output,
            stderr,
            failure: FailureKind::None,
            error: None,
            elapsed,
        }
    }

    pub(crate) fn failed(
        failure: FailureKind,
        error: ExecError,
        output: String,
        stderr: String,
        elapsed: Duration,
    ) -> Self {
        Self {
            output,
            stderr,
            failure,
            error: Some(error),
            elapsed,
        }
    }

    #[inline]
    pub fn is_success(&self) -> bool {
        self.failure == FailureKind::None
    }

    /// `Ok(output)` on success, the cause otherwise.
    pub fn into_result(self) -> Result<String, ExecError> {
        match self.error {
            None => Ok(self.output),
            Some(err) => Err(err),
        }
    }
}
