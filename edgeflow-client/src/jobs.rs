//! Job-related API endpoints

use crate::error::Result;
use crate::{Job, JobId, SchedulerClient};
use reqwest::StatusCode;
use std::time::Duration;
use tracing::debug;

/// What the scheduler answered to a readiness probe
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    /// HTTP status of the probe response
    pub status: u16,
    /// Job carried by the probe response, if it happened to contain one
    ///
    /// `GET /jobs/next` hands the job out as a side effect, so the caller
    /// should process it rather than drop it.
    pub job: Option<Job>,
}

impl SchedulerClient {
    // =============================================================================
    // Readiness
    // =============================================================================

    /// Probe the scheduler with a bounded timeout
    ///
    /// Any HTTP response counts as "reachable", whatever its status. Only
    /// connection-level failures (refused, DNS, timeout) are errors.
    ///
    /// # Arguments
    /// * `timeout` - Upper bound for this single attempt
    pub async fn probe(&self, timeout: Duration) -> Result<ProbeOutcome> {
        let url = self.endpoint(&["jobs", "next"])?;
        let response = self.client.get(url).timeout(timeout).send().await?;

        let status = response.status();
        let job = if status == StatusCode::OK {
            // Body content is not validated here; anything that is not a job
            // is simply ignored.
            Self::parse_job(response).await.ok()
        } else {
            None
        };

        Ok(ProbeOutcome {
            status: status.as_u16(),
            job,
        })
    }

    // =============================================================================
    // Job Lifecycle
    // =============================================================================

    /// Request the next available job
    ///
    /// # Returns
    /// `Some(job)` on `200 OK`, `None` for any other status (the scheduler
    /// answers `204 No Content` when its queue is empty).
    ///
    /// # Errors
    /// [`ClientError::RequestFailed`](crate::ClientError::RequestFailed) when the
    /// scheduler cannot be reached, [`ClientError::ParseError`](crate::ClientError::ParseError)
    /// when a `200` body is not a job record.
    pub async fn next_job(&self) -> Result<Option<Job>> {
        let url = self.endpoint(&["jobs", "next"])?;
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            debug!("No job available (status {})", status);
            return Ok(None);
        }

        Self::parse_job(response).await.map(Some)
    }

    /// Report that a job's output has been produced
    ///
    /// # Arguments
    /// * `job_id` - The ID of the job that completed; sent as one escaped
    ///   path segment whatever characters it contains
    pub async fn complete_job(&self, job_id: &JobId) -> Result<()> {
        let url = self.endpoint(&["jobs", job_id.as_str(), "complete"])?;
        let response = self.client.post(url).send().await?;

        self.handle_empty_response(response).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ClientError;
    use axum::{
        Json, Router,
        extract::{Path, State},
        http::StatusCode as AxumStatus,
        routing::{get, post},
    };
    use std::sync::{Arc, Mutex};

    /// Serve `router` on an ephemeral port and return its base URL
    async fn spawn_stub(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    /// A base URL nothing is listening on
    async fn closed_port() -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_next_job_returns_job_on_ok() {
        let router = Router::new().route(
            "/jobs/next",
            get(|| async { Json(serde_json::json!({"id": "1", "imagePath": "a.png"})) }),
        );
        let client = SchedulerClient::new(spawn_stub(router).await);

        let job = client.next_job().await.unwrap();
        assert_eq!(job, Some(Job::new("1", "a.png")));
    }

    #[tokio::test]
    async fn test_next_job_none_on_no_content() {
        let router = Router::new().route("/jobs/next", get(|| async { AxumStatus::NO_CONTENT }));
        let client = SchedulerClient::new(spawn_stub(router).await);

        assert_eq!(client.next_job().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_next_job_none_on_server_error() {
        let router = Router::new().route(
            "/jobs/next",
            get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "boom") }),
        );
        let client = SchedulerClient::new(spawn_stub(router).await);

        assert_eq!(client.next_job().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_next_job_malformed_body_is_parse_error() {
        let router = Router::new().route("/jobs/next", get(|| async { "{\"id\": \"1\"}" }));
        let client = SchedulerClient::new(spawn_stub(router).await);

        let err = client.next_job().await.unwrap_err();
        assert!(matches!(err, ClientError::ParseError(_)));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn test_next_job_unreachable_is_transport_error() {
        let client = SchedulerClient::new(closed_port().await);

        let err = client.next_job().await.unwrap_err();
        assert!(matches!(err, ClientError::RequestFailed(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_complete_job_posts_to_job_path() {
        let completed = Completions::default();
        let client = SchedulerClient::new(spawn_stub(recording_router(&completed)).await);

        client.complete_job(&JobId::from("42")).await.unwrap();

        assert_eq!(*completed.lock().unwrap(), vec!["42".to_string()]);
    }

    type Completions = Arc<Mutex<Vec<String>>>;

    async fn record_completion(
        State(seen): State<Completions>,
        Path(id): Path<String>,
    ) -> AxumStatus {
        seen.lock().unwrap().push(id);
        AxumStatus::OK
    }

    /// Stub that records the decoded `{id}` of every completion it receives
    fn recording_router(completed: &Completions) -> Router {
        Router::new()
            .route("/jobs/{id}/complete", post(record_completion))
            .with_state(Arc::clone(completed))
    }

    #[tokio::test]
    async fn test_complete_job_escapes_reserved_characters() {
        let completed = Completions::default();
        let client = SchedulerClient::new(spawn_stub(recording_router(&completed)).await);

        let ids = ["job#1", "job?x=1", "a%2Fb", "with space", "50%"];
        for id in ids {
            client.complete_job(&JobId::from(id)).await.unwrap();
        }

        assert_eq!(*completed.lock().unwrap(), ids.map(String::from).to_vec());
    }

    #[tokio::test]
    async fn test_base_url_path_prefix_is_kept() {
        let completed = Completions::default();
        let router = Router::new().nest("/api", recording_router(&completed));
        let base = format!("{}/api/", spawn_stub(router).await);
        let client = SchedulerClient::new(base);

        client.complete_job(&JobId::from("7")).await.unwrap();

        assert_eq!(*completed.lock().unwrap(), vec!["7".to_string()]);
    }

    #[tokio::test]
    async fn test_invalid_base_url_is_reported() {
        let client = SchedulerClient::new("scheduler without scheme");

        let err = client.complete_job(&JobId::from("1")).await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));

        let err = client.next_job().await.unwrap_err();
        assert!(matches!(err, ClientError::InvalidUrl(_)));
    }

    #[tokio::test]
    async fn test_complete_job_error_status() {
        let router = Router::new().route(
            "/jobs/{id}/complete",
            post(|| async { (AxumStatus::SERVICE_UNAVAILABLE, "down") }),
        );
        let client = SchedulerClient::new(spawn_stub(router).await);

        let err = client.complete_job(&JobId::from("1")).await.unwrap_err();
        assert!(matches!(err, ClientError::ApiError { status: 503, .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_probe_accepts_any_status() {
        let router = Router::new().route("/jobs/next", get(|| async { AxumStatus::NOT_FOUND }));
        let client = SchedulerClient::new(spawn_stub(router).await);

        let outcome = client.probe(Duration::from_secs(2)).await.unwrap();
        assert_eq!(outcome.status, 404);
        assert_eq!(outcome.job, None);
    }

    #[tokio::test]
    async fn test_probe_keeps_dequeued_job() {
        let router = Router::new().route(
            "/jobs/next",
            get(|| async { Json(serde_json::json!({"id": 9, "imagePath": "/in/9.png"})) }),
        );
        let client = SchedulerClient::new(spawn_stub(router).await);

        let outcome = client.probe(Duration::from_secs(2)).await.unwrap();
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.job, Some(Job::new("9", "/in/9.png")));
    }

    #[tokio::test]
    async fn test_probe_ignores_unparseable_body() {
        let router = Router::new().route("/jobs/next", get(|| async { "not json" }));
        let client = SchedulerClient::new(spawn_stub(router).await);

        let outcome = client.probe(Duration::from_secs(2)).await.unwrap();
        assert_eq!(outcome.status, 200);
        assert_eq!(outcome.job, None);
    }

    #[tokio::test]
    async fn test_probe_times_out() {
        let router = Router::new().route(
            "/jobs/next",
            get(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                AxumStatus::NO_CONTENT
            }),
        );
        let client = SchedulerClient::new(spawn_stub(router).await);

        let err = client.probe(Duration::from_millis(50)).await.unwrap_err();
        assert!(err.is_timeout());
        assert!(err.is_transport());
    }
}
