//! Edgeflow HTTP Client
//!
//! A small, type-safe HTTP client for the job scheduler API consumed by
//! edgeflow workers.
//!
//! # Example
//!
//! ```no_run
//! use edgeflow_client::SchedulerClient;
//!
//! #[tokio::main]
//! async fn main() -> edgeflow_client::Result<()> {
//!     let client = SchedulerClient::new("http://scheduler:8080");
//!
//!     if let Some(job) = client.next_job().await? {
//!         println!("Got job {} for {}", job.id, job.image_path.display());
//!         client.complete_job(&job.id).await?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod error;
mod jobs;

// Re-export commonly used types
pub use edgeflow_core::domain::job::{Job, JobId};
pub use error::{ClientError, Result};
pub use jobs::ProbeOutcome;

use reqwest::{Client, Url};

/// HTTP client for the scheduler API
///
/// Covers the three calls a worker makes:
/// - Readiness probe against the job endpoint
/// - Fetching the next job
/// - Reporting job completion
#[derive(Debug, Clone)]
pub struct SchedulerClient {
    /// Base URL of the scheduler (e.g., "http://scheduler:8080")
    base_url: String,
    /// HTTP client instance
    client: Client,
}

impl SchedulerClient {
    /// Create a new scheduler client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the scheduler API (e.g., "http://scheduler:8080")
    ///
    /// # Example
    /// ```
    /// use edgeflow_client::SchedulerClient;
    ///
    /// let client = SchedulerClient::new("http://scheduler:8080");
    /// ```
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Create a new scheduler client with a custom HTTP client
    ///
    /// This allows you to configure proxies, TLS settings, default timeouts, etc.
    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Get the base URL of the scheduler
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // URL Building
    // =============================================================================

    /// Resolve an endpoint below the base URL
    ///
    /// Each segment is percent-encoded on its own, so opaque values such as
    /// job ids always stay a single path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ClientError::InvalidUrl(format!("{}: {}", self.base_url, e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                ClientError::InvalidUrl(format!("{}: cannot be a base", self.base_url))
            })?
            .pop_if_empty()
            .extend(segments);

        Ok(url)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle a response that only needs to be acknowledged
    ///
    /// Any non-success status becomes [`ClientError::ApiError`]; the body is
    /// only read to enrich the error message.
    async fn handle_empty_response(&self, response: reqwest::Response) -> Result<()> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        Ok(())
    }

    /// Parse a `200 OK` body into a job
    async fn parse_job(response: reqwest::Response) -> Result<Job> {
        let body = response.text().await?;
        serde_json::from_str(&body)
            .map_err(|e| ClientError::ParseError(format!("Invalid job payload: {}", e)))
    }
}
