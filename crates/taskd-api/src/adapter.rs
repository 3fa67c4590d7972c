use async_trait::async_trait;
use tracing::debug;

use taskd_core::Registry;
use taskd_exec::{FailureKind, ShellExecutor};

use crate::{error::ApiError, handler::ApiHandler};

/// Adapter that bridges the task [`Registry`] and a [`ShellExecutor`] to `ApiHandler`.
///
/// Every request looks the task up in the snapshot published at that moment,
/// so a reload never affects a request that already found its task.
#[derive(Clone, Debug)]
pub struct AgentAdapter {
    registry: Registry,
    executor: ShellExecutor,
}

impl AgentAdapter {
    pub fn new(registry: Registry, executor: ShellExecutor) -> Self {
        Self { registry, executor }
    }
}

#[async_trait]
impl ApiHandler for AgentAdapter {
    async fn list_tasks(&self) -> Vec<String> {
        self.registry.list_names()
    }

    async fn run_task(&self, name: &str, request_id: &str) -> Result<String, ApiError> {
        let task = self.registry.lookup(name).ok_or_else(|| {
            debug!(target: "taskd.api", id = request_id, task = name, "task not found");
            ApiError::TaskNotFound(name.to_string())
        })?;

        let outcome = self.executor.execute(&task, request_id).await;
        match outcome.failure {
            FailureKind::None => Ok(outcome.output),
            FailureKind::Timeout => Err(ApiError::Timeout(name.to_string())),
            kind => Err(ApiError::ExecFailed {
                task: name.to_string(),
                kind,
                reason: outcome
                    .error
                    .map(|e| e.to_string())
                    .unwrap_or_else(|| kind.to_string()),
            }),
        }
    }
}
