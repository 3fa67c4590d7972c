use thiserror::Error;

use taskd_exec::FailureKind;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Task {0} Not Found")]
    TaskNotFound(String),

    #[error("task {0} timed out")]
    Timeout(String),

    #[error("task {task} failed ({kind}): {reason}")]
    ExecFailed {
        task: String,
        kind: FailureKind,
        reason: String,
    },
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        use axum::http::StatusCode;

        match self {
            ApiError::TaskNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()).into_response(),
            // Failure details stay in the agent log; the caller only gets the status.
            ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT.into_response(),
            ApiError::ExecFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        }
    }
}
