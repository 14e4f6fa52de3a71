//! Failure classes of the poll → process → report cycle
//!
//! Both classes are recoverable: the run loop logs them, waits one poll
//! interval and carries on. They are kept apart for diagnostics only.

use edgeflow_client::{ClientError, JobId};
use edgeflow_imaging::ImagingError;
use std::path::PathBuf;
use thiserror::Error;

/// A failed cycle
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The scheduler could not be reached or did not acknowledge a request
    #[error("transport failure: {0}")]
    Transport(#[source] ClientError),

    /// The job payload or the image pipeline failed
    #[error("processing failure: {0}")]
    Processing(#[from] ProcessingError),
}

impl From<ClientError> for WorkerError {
    fn from(err: ClientError) -> Self {
        if err.is_transport() {
            Self::Transport(err)
        } else {
            Self::Processing(ProcessingError::InvalidPayload(err))
        }
    }
}

/// Errors raised while interpreting a job or producing its output
#[derive(Debug, Error)]
pub enum ProcessingError {
    #[error("malformed job payload: {0}")]
    InvalidPayload(#[source] ClientError),

    #[error("job id {0:?} cannot be used as an output file name")]
    InvalidJobId(JobId),

    #[error("failed to load image {}: {source}", .path.display())]
    Load {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("image processing failed: {0}")]
    Device(#[from] ImagingError),

    #[error("failed to create output directory {}: {source}", .path.display())]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("processing task aborted: {0}")]
    Aborted(#[from] tokio::task::JoinError),
}
