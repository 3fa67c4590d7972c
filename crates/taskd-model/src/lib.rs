//! Domain model of the agent: task definitions, global settings and the
//! duration grammar used by the config document.

pub mod duration;
pub use duration::{DurationParseError, parse_duration};

mod error;
pub use error::{DurationField, ValidationError};

mod settings;
pub use settings::{DEFAULT_PORT, Settings};

mod task;
pub use task::{DEFAULT_TIMEOUT, MIN_INTERVAL, MIN_SPLICE, Task, TaskDef};
