//! Hot-reloadable task registry.
//!
//! - [`loader`] turns a config document into a validated [`Snapshot`];
//! - [`Registry`] publishes the current snapshot to concurrent readers;
//! - [`ReloadController`] owns the write side and follows the config file on disk.

pub mod error;
pub use error::{ConfigError, CoreError};

pub mod loader;

mod registry;
pub use registry::{Registry, Snapshot};

mod reload;
pub use reload::{DEFAULT_CHECK_EVERY, ReloadConfig, ReloadController, ReloadOutcome};

pub use taskd_model::{Settings, Task, TaskDef};
