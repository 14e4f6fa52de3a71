//! Job poller
//!
//! Runs the worker's main loop: poll for a job, process it, report
//! completion. One job is handled at a time.
//!
//! Every failure is logged by class and followed by one poll interval of
//! waiting; nothing short of shutdown ends the loop.

use edgeflow_core::domain::job::{Job, JobId};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::error::WorkerError;
use crate::repository::JobRepository;
use crate::scheduler::pause;
use crate::service::{ProcessedJob, ProcessingService};

/// Counters accumulated over the lifetime of the loop
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct LoopStats {
    pub processed: u64,
    pub idle_polls: u64,
    pub transport_failures: u64,
    pub processing_failures: u64,
}

/// Result of one successful cycle
#[derive(Debug)]
enum Cycle {
    /// A job was processed and reported; poll again right away
    Processed(JobId),
    /// No job was available
    Idle,
}

/// Job poller that continuously polls for and processes jobs
pub struct JobPoller {
    config: Config,
    repository: Arc<dyn JobRepository>,
    processing: Arc<dyn ProcessingService>,
}

impl JobPoller {
    /// Creates a new job poller
    pub fn new(
        config: Config,
        repository: Arc<dyn JobRepository>,
        processing: Arc<dyn ProcessingService>,
    ) -> Self {
        Self {
            config,
            repository,
            processing,
        }
    }

    /// Runs the loop until `shutdown` is cancelled
    ///
    /// `pending` is processed before the first poll; it carries a job that
    /// was handed out during readiness probing.
    ///
    /// Shutdown is honoured between cycles and during waits; a job that is
    /// already being processed is allowed to finish.
    pub async fn run(&self, shutdown: CancellationToken, mut pending: Option<Job>) -> LoopStats {
        info!(
            "Starting job poller (interval: {:?})",
            self.config.poll_interval
        );

        let mut stats = LoopStats::default();

        while !shutdown.is_cancelled() {
            let outcome = match pending.take() {
                Some(job) => self.process_and_report(job).await.map(Cycle::Processed),
                None => self.poll_once().await,
            };

            match outcome {
                Ok(Cycle::Processed(job_id)) => {
                    stats.processed += 1;
                    info!(job_id = %job_id, "Job completed");
                    continue;
                }
                Ok(Cycle::Idle) => {
                    stats.idle_polls += 1;
                    debug!("No job available");
                }
                Err(WorkerError::Transport(e)) => {
                    stats.transport_failures += 1;
                    warn!("Transport failure talking to scheduler: {}", e);
                }
                Err(WorkerError::Processing(e)) => {
                    stats.processing_failures += 1;
                    error!("Processing failure: {}", e);
                }
            }

            if !pause(self.config.poll_interval, &shutdown).await {
                break;
            }
        }

        info!(
            processed = stats.processed,
            idle_polls = stats.idle_polls,
            transport_failures = stats.transport_failures,
            processing_failures = stats.processing_failures,
            "Job poller stopped"
        );

        stats
    }

    /// Performs a single poll cycle
    async fn poll_once(&self) -> Result<Cycle, WorkerError> {
        match self.repository.next_job().await? {
            Some(job) => self.process_and_report(job).await.map(Cycle::Processed),
            None => Ok(Cycle::Idle),
        }
    }

    /// Processes a job and reports its completion
    async fn process_and_report(&self, job: Job) -> Result<JobId, WorkerError> {
        info!(job_id = %job.id, "Starting job");

        let processed: ProcessedJob = self.processing.process(&job).await?;
        debug!(
            job_id = %job.id,
            backend = processed.backend,
            width = processed.width,
            height = processed.height,
            "Wrote {}",
            processed.output_path.display()
        );

        self.repository.complete_job(&job.id).await?;

        Ok(job.id)
    }
}
