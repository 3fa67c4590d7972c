use async_trait::async_trait;

use crate::error::ApiError;

/// Backend of the request front end.
///
/// This trait abstracts the backend implementation, allowing users to:
/// - Use the provided `AgentAdapter` (registry lookup + shell execution)
/// - Implement custom handlers with additional logic (auth, caching, etc.)
#[async_trait]
pub trait ApiHandler: Send + Sync + 'static {
    /// Names of all runnable tasks.
    async fn list_tasks(&self) -> Vec<String>;

    /// Run task `name` and return its stdout.
    ///
    /// `request_id` identifies the caller in logs.
    async fn run_task(&self, name: &str, request_id: &str) -> Result<String, ApiError>;
}
