//! Readiness prober
//!
//! Blocks startup until the scheduler answers anything at all. Attempts are
//! unbounded and spaced by the poll interval.

use edgeflow_core::domain::job::Job;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::Config;
use crate::repository::JobRepository;
use crate::scheduler::pause;

/// How the probing phase ended
#[derive(Debug)]
pub enum Readiness {
    /// The scheduler responded
    Ready {
        /// Number of probe attempts, including the successful one
        attempts: u32,
        /// Job handed out by the probe response, to be processed first
        pending: Option<Job>,
    },
    /// Shutdown was requested before the scheduler responded
    Cancelled,
}

/// Probe the scheduler until it responds or shutdown is requested
pub async fn wait_until_ready(
    repository: &dyn JobRepository,
    config: &Config,
    shutdown: &CancellationToken,
) -> Readiness {
    info!("Waiting for scheduler at {}", config.scheduler_url);

    let mut attempts = 0u32;

    loop {
        if shutdown.is_cancelled() {
            return Readiness::Cancelled;
        }

        attempts += 1;

        match repository.probe(config.probe_timeout).await {
            Ok(outcome) => {
                info!(
                    "Scheduler reachable after {} attempt(s) (status {})",
                    attempts, outcome.status
                );
                return Readiness::Ready {
                    attempts,
                    pending: outcome.job,
                };
            }
            Err(e) => {
                warn!(
                    "Scheduler not ready (attempt {}): {}. Retrying in {:?}",
                    attempts, e, config.poll_interval
                );
            }
        }

        if !pause(config.poll_interval, shutdown).await {
            return Readiness::Cancelled;
        }
    }
}
