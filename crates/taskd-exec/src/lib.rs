//! Bounded execution of task commands.
//!
//! [`ShellExecutor`] runs a [`Task`](taskd_model::Task) in its own process group under the task's deadline
//! and reports an [`ExecOutcome`] instead of failing: callers always get the captured output plus a [`FailureKind`].

mod error;
pub use error::ExecError;

mod outcome;
pub use outcome::{ExecOutcome, FailureKind};

mod shell;
pub use shell::{DEFAULT_GRACE, ExecConfig, ShellExecutor};

pub mod util;

pub mod prelude {
    pub use crate::error::ExecError;
    pub use crate::outcome::{ExecOutcome, FailureKind};
    pub use crate::shell::{ExecConfig, ShellExecutor};
}
