//! Jobs repository
//!
//! Handles communication with the scheduler for job-related operations:
//! - Probing readiness
//! - Fetching the next job
//! - Reporting completion

use async_trait::async_trait;
use edgeflow_client::{Job, JobId, ProbeOutcome, Result, SchedulerClient};
use std::time::Duration;

/// Repository trait for job-related operations with the scheduler
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Makes one readiness attempt bounded by `timeout`
    ///
    /// Any response, whatever its status, means the scheduler is reachable.
    async fn probe(&self, timeout: Duration) -> Result<ProbeOutcome>;

    /// Fetches the next job, or `None` if there is no work right now
    async fn next_job(&self) -> Result<Option<Job>>;

    /// Tells the scheduler that a job's output has been produced
    ///
    /// # Arguments
    /// * `job_id` - The ID of the job that completed
    async fn complete_job(&self, job_id: &JobId) -> Result<()>;
}

/// HTTP implementation of JobRepository
pub struct HttpJobRepository {
    client: SchedulerClient,
}

impl HttpJobRepository {
    /// Creates a new HTTP job repository
    pub fn new(client: SchedulerClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobRepository for HttpJobRepository {
    async fn probe(&self, timeout: Duration) -> Result<ProbeOutcome> {
        self.client.probe(timeout).await
    }

    async fn next_job(&self) -> Result<Option<Job>> {
        self.client.next_job().await
    }

    async fn complete_job(&self, job_id: &JobId) -> Result<()> {
        self.client.complete_job(job_id).await
    }
}
