//! Scheduler layer for the worker
//!
//! This layer waits for the scheduler to come up, then polls it for jobs
//! and drives each one through processing and completion reporting.

pub mod poller;
pub mod readiness;

#[cfg(test)]
mod testing;

pub use poller::JobPoller;
pub use readiness::{Readiness, wait_until_ready};

use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Sleep for `interval` unless shutdown is requested first
///
/// Returns `false` if the worker should stop.
pub(crate) async fn pause(interval: Duration, shutdown: &CancellationToken) -> bool {
    if shutdown.is_cancelled() {
        return false;
    }

    tokio::select! {
        biased;
        _ = shutdown.cancelled() => false,
        _ = tokio::time::sleep(interval) => true,
    }
}
