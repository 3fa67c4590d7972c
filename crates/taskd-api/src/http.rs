use std::sync::Arc;

use axum::{
    Router,
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
};
use tracing::debug;

use crate::handler::ApiHandler;

/// Header carrying the caller context id, echoed on every response.
pub const X_REQUEST_ID: &str = "x-request-id";

/// HTTP API service builder.
pub struct HttpApi<H> {
    handler: Arc<H>,
}

impl<H> HttpApi<H>
where
    H: ApiHandler,
{
    /// Create new HTTP API with the given handler.
    pub fn new(handler: Arc<H>) -> Self {
        Self { handler }
    }

    /// Build axum router with mounted endpoints.
    ///
    /// Routes:
    /// - GET /ping - Liveness probe
    /// - GET /exec - Task names, one per line
    /// - GET /exec/{task} - Run task, respond with its stdout
    pub fn router(self) -> Router {
        Router::new()
            .route("/ping", get(ping))
            .route("/exec", get(list_tasks::<H>))
            .route("/exec/{task}", get(run_task::<H>))
            .with_state(self.handler)
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// GET /ping
async fn ping(headers: HeaderMap) -> Response {
    let rid = request_id(&headers);
    tagged((StatusCode::OK, "/ping ok").into_response(), &rid)
}

/// GET /exec
async fn list_tasks<H>(State(handler): State<Arc<H>>, headers: HeaderMap) -> Response
where
    H: ApiHandler,
{
    let rid = request_id(&headers);
    let body: String = handler
        .list_tasks()
        .await
        .into_iter()
        .map(|name| name + "\n")
        .collect();
    tagged((StatusCode::OK, body).into_response(), &rid)
}

/// GET /exec/{task}
async fn run_task<H>(
    State(handler): State<Arc<H>>,
    Path(task): Path<String>,
    headers: HeaderMap,
) -> Response
where
    H: ApiHandler,
{
    let rid = request_id(&headers);
    let response = match handler.run_task(&task, &rid).await {
        Ok(output) => (StatusCode::OK, output).into_response(),
        Err(err) => {
            debug!(target: "taskd.api.http", id = %rid, task = %task, error = %err, "request failed");
            err.into_response()
        }
    };
    tagged(response, &rid)
}

// ============================================================================
// Request ids
// ============================================================================

/// Reuse the caller's id when it sent one, otherwise mint a 32-char hex id.
fn request_id(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().simple().to_string())
}

fn tagged(mut response: Response, rid: &str) -> Response {
    if let Ok(value) = HeaderValue::from_str(rid) {
        response.headers_mut().insert(X_REQUEST_ID, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    use async_trait::async_trait;
    use taskd_exec::FailureKind;

    use crate::error::ApiError;

    /// Canned backend: task name decides the result.
    struct Fake;

    #[async_trait]
    impl ApiHandler for Fake {
        async fn list_tasks(&self) -> Vec<String> {
            vec!["ok".into(), "slow".into(), "broken".into()]
        }

        async fn run_task(&self, name: &str, request_id: &str) -> Result<String, ApiError> {
            match name {
                "ok" => Ok(format!("ran with {request_id}\n")),
                "slow" => Err(ApiError::Timeout(name.into())),
                "broken" => Err(ApiError::ExecFailed {
                    task: name.into(),
                    kind: FailureKind::NonZeroExit,
                    reason: "exit code: 1".into(),
                }),
                _ => Err(ApiError::TaskNotFound(name.into())),
            }
        }
    }

    async fn serve() -> String {
        let app = HttpApi::new(Arc::new(Fake)).router();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}")
    }

    #[tokio::test]
    async fn ping_responds() {
        let base = serve().await;
        let resp = reqwest::get(format!("{base}/ping")).await.unwrap();

        assert_eq!(resp.status().as_u16(), 200);
        let rid = resp.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap().to_string();
        assert_eq!(rid.len(), 32);
        assert!(rid.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(resp.text().await.unwrap(), "/ping ok");
    }

    #[tokio::test]
    async fn exec_lists_task_names() {
        let base = serve().await;
        let resp = reqwest::get(format!("{base}/exec")).await.unwrap();

        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.text().await.unwrap(), "ok\nslow\nbroken\n");
    }

    #[tokio::test]
    async fn caller_request_id_is_echoed_and_forwarded() {
        let base = serve().await;
        let resp = reqwest::Client::new()
            .get(format!("{base}/exec/ok"))
            .header(X_REQUEST_ID, "abc123")
            .send()
            .await
            .unwrap();

        assert_eq!(resp.status().as_u16(), 200);
        assert_eq!(resp.headers().get(X_REQUEST_ID).unwrap().to_str().unwrap(), "abc123");
        assert_eq!(resp.text().await.unwrap(), "ran with abc123\n");
    }

    #[tokio::test]
    async fn status_codes_follow_failure_kind() {
        let base = serve().await;

        let resp = reqwest::get(format!("{base}/exec/missing")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 404);
        assert!(resp.headers().get(X_REQUEST_ID).is_some());
        assert_eq!(resp.text().await.unwrap(), "Task missing Not Found");

        let resp = reqwest::get(format!("{base}/exec/slow")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 504);
        assert_eq!(resp.text().await.unwrap(), "");

        let resp = reqwest::get(format!("{base}/exec/broken")).await.unwrap();
        assert_eq!(resp.status().as_u16(), 500);
        assert_eq!(resp.text().await.unwrap(), "");
    }
}
