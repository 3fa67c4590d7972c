use serde::{Deserialize, Serialize};

pub const DEFAULT_PORT: u16 = 8080;

/// Agent-wide options stored next to the task list.
///
/// Reloaded together with the tasks, in the same validation pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// TCP port the request front end listens on.
    pub port: u16,
    /// Whether task output should be served compressed.
    #[serde(alias = "compressOutput")]
    pub gzip: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            gzip: true,
        }
    }
}
