//! Processing service
//!
//! Turns a job into an edge image on disk:
//! - Load the referenced image as 8-bit grayscale
//! - Denoise with the fixed 5×5 Gaussian
//! - Detect edges on the accelerated or host backend, chosen per job
//! - Write `{id}_edges.png` into the output directory
//!
//! Image work is CPU-bound and runs on the blocking pool.

use async_trait::async_trait;
use edgeflow_core::domain::job::{Job, JobId};
use edgeflow_imaging::{CANNY_THRESHOLDS, EdgeBackend, denoise};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use crate::error::ProcessingError;
use crate::service::device::DeviceProbe;

/// Service trait for processing a single job
#[async_trait]
pub trait ProcessingService: Send + Sync {
    /// Produces the job's output file
    ///
    /// # Returns
    /// Where the output was written and how it was produced
    async fn process(&self, job: &Job) -> Result<ProcessedJob, ProcessingError>;
}

/// Outcome of a successful pipeline run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessedJob {
    pub output_path: PathBuf,
    /// Name of the backend that ran edge detection
    pub backend: &'static str,
    pub width: u32,
    pub height: u32,
}

/// Denoise → edge detect → write pipeline
pub struct EdgePipeline {
    output_dir: PathBuf,
    probe: Arc<dyn DeviceProbe>,
    host: Arc<dyn EdgeBackend>,
    accelerated: Arc<dyn EdgeBackend>,
}

impl EdgePipeline {
    /// Creates a new pipeline
    ///
    /// # Arguments
    /// * `output_dir` - Directory edge images are written to
    /// * `probe` - Queried once per job to pick a backend
    /// * `host` - Backend used when acceleration is unavailable
    /// * `accelerated` - Backend used when acceleration is available
    pub fn new(
        output_dir: impl Into<PathBuf>,
        probe: Arc<dyn DeviceProbe>,
        host: Arc<dyn EdgeBackend>,
        accelerated: Arc<dyn EdgeBackend>,
    ) -> Self {
        Self {
            output_dir: output_dir.into(),
            probe,
            host,
            accelerated,
        }
    }

    /// Deterministic output location for a job
    pub fn output_path(&self, job_id: &JobId) -> PathBuf {
        self.output_dir.join(format!("{}_edges.png", job_id))
    }

    /// Picks the backend for the next job
    fn select_backend(&self) -> Arc<dyn EdgeBackend> {
        if self.probe.acceleration_available() {
            Arc::clone(&self.accelerated)
        } else {
            Arc::clone(&self.host)
        }
    }
}

#[async_trait]
impl ProcessingService for EdgePipeline {
    async fn process(&self, job: &Job) -> Result<ProcessedJob, ProcessingError> {
        if !job.id.is_path_safe() {
            return Err(ProcessingError::InvalidJobId(job.id.clone()));
        }

        let backend = self.select_backend();
        info!(
            job_id = %job.id,
            backend = backend.name(),
            "Processing {}",
            job.image_path.display()
        );

        let input = job.image_path.clone();
        let output_dir = self.output_dir.clone();
        let output_path = self.output_path(&job.id);

        tokio::task::spawn_blocking(move || {
            run_pipeline(&input, &output_dir, output_path, backend.as_ref())
        })
        .await?
    }
}

fn run_pipeline(
    input: &Path,
    output_dir: &Path,
    output_path: PathBuf,
    backend: &dyn EdgeBackend,
) -> Result<ProcessedJob, ProcessingError> {
    let img = image::open(input)
        .map_err(|source| ProcessingError::Load {
            path: input.to_path_buf(),
            source,
        })?
        .to_luma8();
    debug!(width = img.width(), height = img.height(), "Loaded image");

    let denoised = denoise(&img)?;
    let edges = backend.detect_edges(&denoised, CANNY_THRESHOLDS)?;

    std::fs::create_dir_all(output_dir).map_err(|source| ProcessingError::OutputDir {
        path: output_dir.to_path_buf(),
        source,
    })?;
    edges
        .save(&output_path)
        .map_err(|source| ProcessingError::Write {
            path: output_path.clone(),
            source,
        })?;

    Ok(ProcessedJob {
        output_path,
        backend: backend.name(),
        width: edges.width(),
        height: edges.height(),
    })
}
