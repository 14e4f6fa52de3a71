//! Edgeflow Worker
//!
//! A single-job-at-a-time worker that turns images into edge maps for an
//! external job scheduler.
//!
//! Architecture:
//! - Configuration: Load settings from the environment, fail fast if invalid
//! - Repositories: HTTP communication with the scheduler
//! - Services: Device selection and the denoise → edge detect → write pipeline
//! - Scheduler: Readiness probing and the poll/process/report loop
//!
//! The worker waits for the scheduler to answer, then polls it for jobs
//! forever. Failures are logged and retried after one poll interval; only
//! SIGTERM/SIGINT stop it.

mod config;
mod error;
mod repository;
mod scheduler;
mod service;
mod shutdown;

use anyhow::{Context, Result};
use edgeflow_client::SchedulerClient;
use edgeflow_imaging::{AcceleratedBackend, EdgeBackend, HostBackend};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::repository::{HttpJobRepository, JobRepository};
use crate::scheduler::{JobPoller, Readiness};
use crate::service::{AcceleratorMode, DeviceProbe, EdgePipeline, SystemDeviceProbe};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "edgeflow_worker=info,edgeflow_client=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Edgeflow Worker");

    // Load configuration before touching the network
    let config = Config::from_env().context("Invalid worker configuration")?;
    info!(
        "Loaded configuration: scheduler_url={}, output_dir={}, poll_interval={}s, \
         accelerator={:?}",
        config.scheduler_url,
        config.output_dir.display(),
        config.poll_interval_secs(),
        config.accelerator
    );

    prepare_output_dir(&config);

    let shutdown = shutdown::install_shutdown_handler();

    let client = SchedulerClient::new(config.scheduler_url.clone());
    let repository: Arc<dyn JobRepository> = Arc::new(HttpJobRepository::new(client));

    let pipeline = Arc::new(build_pipeline(&config));

    info!("Services initialized");

    let pending = match scheduler::wait_until_ready(repository.as_ref(), &config, &shutdown).await
    {
        Readiness::Ready { attempts, pending } => {
            if pending.is_some() {
                info!("Readiness probe after {} attempt(s) returned a job", attempts);
            }
            pending
        }
        Readiness::Cancelled => {
            info!("Shutdown requested before scheduler became ready");
            return Ok(());
        }
    };

    let poller = JobPoller::new(config, repository, pipeline);

    info!("Starting job polling loop");
    poller.run(shutdown, pending).await;

    info!("Edgeflow Worker stopped");
    Ok(())
}

/// Create the output directory up front
///
/// Failure is not fatal: the pipeline retries the creation for every job
/// and reports it as a processing failure.
fn prepare_output_dir(config: &Config) {
    match std::fs::create_dir_all(&config.output_dir) {
        Ok(()) => info!("Output directory ready: {}", config.output_dir.display()),
        Err(e) => error!(
            "Failed to create output directory {}: {}",
            config.output_dir.display(),
            e
        ),
    }
}

/// Assemble the processing pipeline and its backends
///
/// If the accelerated context cannot be created, acceleration is disabled
/// for the lifetime of the process.
fn build_pipeline(config: &Config) -> EdgePipeline {
    let host: Arc<dyn EdgeBackend> = Arc::new(HostBackend::new());

    let (accelerated, mode): (Arc<dyn EdgeBackend>, AcceleratorMode) =
        match AcceleratedBackend::new() {
            Ok(backend) => {
                info!("Accelerated context ready ({} threads)", backend.threads());
                (Arc::new(backend), config.accelerator)
            }
            Err(e) => {
                warn!("Accelerated context unavailable, using host path only: {}", e);
                (Arc::clone(&host), AcceleratorMode::Off)
            }
        };

    let probe: Arc<dyn DeviceProbe> = Arc::new(SystemDeviceProbe::new(mode));

    EdgePipeline::new(config.output_dir.clone(), probe, host, accelerated)
}
