//! Config document loading.
//!
//! The document is YAML with an optional `settings` object and a `tasks` list:
//!
//! ```yaml
//! settings:
//!   port: 8080
//!   gzip: false
//! tasks:
//!   - name: ping
//!     cmd: echo ok
//!     interval: 1m
//!     timeout: 30s
//! ```
//!
//! Loading is all-or-nothing: the first invalid entry aborts the load with that error.
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use taskd_model::{Settings, TaskDef};

use crate::{error::ConfigError, registry::Snapshot};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct Document {
    settings: Settings,
    tasks: Vec<TaskDef>,
}

/// Parse and validate a config document.
pub fn load_from_str(text: &str) -> Result<Snapshot, ConfigError> {
    let doc: Document = serde_yaml::from_str(text)?;
    build(doc)
}

/// Same as [`load_from_str`], for raw bytes.
pub fn load_from_slice(bytes: &[u8]) -> Result<Snapshot, ConfigError> {
    let doc: Document = serde_yaml::from_slice(bytes)?;
    build(doc)
}

/// Read, parse and validate the config document at `path`.
pub async fn load_from_path(path: impl AsRef<Path>) -> Result<Snapshot, ConfigError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let snapshot = load_from_slice(&bytes)?;
    debug!(target: "taskd.core.loader", path = %path.display(), tasks = snapshot.len(), "config loaded");
    Ok(snapshot)
}

fn build(doc: Document) -> Result<Snapshot, ConfigError> {
    let tasks = doc
        .tasks
        .iter()
        .enumerate()
        .map(|(idx, def)| def.validate(idx))
        .collect::<Result<Vec<_>, _>>()?;
    Snapshot::new(doc.settings, tasks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use taskd_model::{DEFAULT_PORT, DEFAULT_TIMEOUT, ValidationError};

    #[test]
    fn loads_settings_and_tasks() {
        let snapshot = load_from_str(
            r#"
settings:
  port: 3132
  gzip: false
tasks:
  - name: ping
    cmd: echo ok
  - name: disk
    cmd: df -h
    interval: 1m
    splice: 10s
  - name: slow
    command: sleep 5
    timeout: 200ms
"#,
        )
        .unwrap();

        assert_eq!(snapshot.settings().port, 3132);
        assert!(!snapshot.settings().gzip);
        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["disk", "ping", "slow"]);

        assert_eq!(snapshot.get("ping").unwrap().timeout(), DEFAULT_TIMEOUT);
        assert_eq!(snapshot.get("disk").unwrap().timeout(), Duration::from_secs(60));
        assert_eq!(
            snapshot.get("disk").unwrap().splice(),
            Some(Duration::from_secs(10))
        );
        assert_eq!(
            snapshot.get("slow").unwrap().timeout(),
            Duration::from_millis(200)
        );
    }

    #[test]
    fn settings_default_when_absent() {
        let snapshot = load_from_str("tasks:\n  - name: a\n    cmd: 'true'\n").unwrap();
        assert_eq!(snapshot.settings().port, DEFAULT_PORT);
        assert!(snapshot.settings().gzip);
    }

    #[test]
    fn compress_output_spelling_sets_gzip() {
        let snapshot =
            load_from_str("settings:\n  port: 1\n  compressOutput: false\ntasks: []\n").unwrap();
        assert_eq!(snapshot.settings().port, 1);
        assert!(!snapshot.settings().gzip);
    }

    #[test]
    fn empty_task_list_is_valid() {
        let snapshot = load_from_str("settings:\n  port: 1\ntasks: []\n").unwrap();
        assert!(snapshot.is_empty());
    }

    #[test]
    fn duplicate_names_fail_the_load() {
        let err = load_from_str(
            "tasks:\n  - {name: a, cmd: 'echo 1'}\n  - {name: a, cmd: 'echo 2'}\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTask(name) if name == "a"));
    }

    #[test]
    fn first_invalid_entry_aborts_everything() {
        let err = load_from_str(
            r#"
tasks:
  - name: good
    cmd: 'true'
  - name: bad
    cmd: 'true'
    interval: 1s
    timeout: 2s
  - name: ""
    cmd: 'true'
"#,
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::TimeoutExceedsInterval { task, .. }) if task == "bad"
        ));
    }

    #[test]
    fn nameless_entry_reports_its_index() {
        let err = load_from_str("tasks:\n  - {name: a, cmd: x}\n  - {cmd: y}\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ValidationError::EmptyName { index: 1 })
        ));
    }

    #[test]
    fn malformed_documents_are_parse_errors() {
        assert!(matches!(load_from_str("tasks: [\n"), Err(ConfigError::Parse(_))));
        assert!(matches!(
            load_from_str("tasks:\n  - name: a\n    cmd: x\n    retries: 3\n"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(load_from_str("unknown: 1\n"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn byte_input_matches_text_input() {
        let text = "tasks:\n  - {name: a, cmd: 'echo a', timeout: 1s}\n";
        assert_eq!(load_from_slice(text.as_bytes()).unwrap(), load_from_str(text).unwrap());
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_from_path(dir.path().join("nope.yaml")).await.unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[tokio::test]
    async fn loads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.yaml");
        std::fs::write(&path, "tasks:\n  - {name: ping, cmd: echo ok}\n").unwrap();

        let snapshot = load_from_path(&path).await.unwrap();
        assert_eq!(snapshot.get("ping").unwrap().command(), "echo ok");
    }
}
