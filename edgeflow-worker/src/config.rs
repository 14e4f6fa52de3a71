//! Worker configuration
//!
//! Resolved once at startup from the environment and passed by value to
//! every component. Nothing reads the environment after this point.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Duration;

use crate::service::AcceleratorMode;

pub const DEFAULT_SCHEDULER_URL: &str = "http://scheduler:8080";
pub const DEFAULT_OUTPUT_DIR: &str = "/data/output";
pub const DEFAULT_POLL_INTERVAL_MS: &str = "1000";
pub const DEFAULT_PROBE_TIMEOUT_MS: &str = "3000";

/// Worker configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Scheduler base URL (e.g., "http://scheduler:8080")
    pub scheduler_url: String,

    /// Directory edge images are written to
    pub output_dir: PathBuf,

    /// Wait between empty polls and after any failure
    pub poll_interval: Duration,

    /// Upper bound for a single readiness probe attempt
    pub probe_timeout: Duration,

    /// Whether the accelerated edge path may be used
    pub accelerator: AcceleratorMode,
}

impl Config {
    /// Creates configuration from environment variables
    ///
    /// Expected environment variables:
    /// - SCHEDULER_URL (optional, default: http://scheduler:8080)
    /// - OUTPUT_DIR (optional, default: /data/output)
    /// - WORKER_PULL_INTERVAL (optional, milliseconds, default: 1000)
    /// - PROBE_TIMEOUT_MS (optional, milliseconds, default: 3000)
    /// - EDGEFLOW_ACCELERATOR (optional, `auto` or `off`, default: auto)
    ///
    /// Malformed values fail startup; they are never replaced by defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let scheduler_url =
            lookup("SCHEDULER_URL").unwrap_or_else(|| DEFAULT_SCHEDULER_URL.to_string());

        let output_dir = lookup("OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));

        let poll_interval = parse_millis(
            "WORKER_PULL_INTERVAL",
            &lookup("WORKER_PULL_INTERVAL").unwrap_or_else(|| DEFAULT_POLL_INTERVAL_MS.to_string()),
        )?;

        let probe_timeout = parse_millis(
            "PROBE_TIMEOUT_MS",
            &lookup("PROBE_TIMEOUT_MS").unwrap_or_else(|| DEFAULT_PROBE_TIMEOUT_MS.to_string()),
        )?;

        let accelerator = match lookup("EDGEFLOW_ACCELERATOR") {
            Some(raw) => raw
                .parse::<AcceleratorMode>()
                .with_context(|| format!("Invalid EDGEFLOW_ACCELERATOR: {:?}", raw))?,
            None => AcceleratorMode::default(),
        };

        let config = Self {
            scheduler_url,
            output_dir,
            poll_interval,
            probe_timeout,
            accelerator,
        };
        config.validate()?;
        Ok(config)
    }

    /// Poll interval in seconds
    pub fn poll_interval_secs(&self) -> f64 {
        self.poll_interval.as_secs_f64()
    }

    /// Validates the configuration
    pub fn validate(&self) -> Result<()> {
        if self.scheduler_url.is_empty() {
            anyhow::bail!("scheduler_url cannot be empty");
        }

        if !self.scheduler_url.starts_with("http://") && !self.scheduler_url.starts_with("https://")
        {
            anyhow::bail!("scheduler_url must start with http:// or https://");
        }

        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.probe_timeout.is_zero() {
            anyhow::bail!("probe_timeout must be greater than 0");
        }

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scheduler_url: DEFAULT_SCHEDULER_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            poll_interval: Duration::from_millis(1000),
            probe_timeout: Duration::from_millis(3000),
            accelerator: AcceleratorMode::default(),
        }
    }
}

/// Parse a strictly positive integer number of milliseconds
fn parse_millis(name: &str, raw: &str) -> Result<Duration> {
    let millis: u64 = raw.trim().parse().with_context(|| {
        format!(
            "{} must be a positive integer (milliseconds), got {:?}",
            name, raw
        )
    })?;

    if millis == 0 {
        anyhow::bail!("{} must be greater than 0", name);
    }

    Ok(Duration::from_millis(millis))
}
