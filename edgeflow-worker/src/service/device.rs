//! Device service
//!
//! Answers, per job, whether the accelerated edge path may be used.
//! The query is cheap and never cached: availability can change between jobs.

use std::str::FromStr;
use tracing::debug;

/// Service trait for accelerator discovery
pub trait DeviceProbe: Send + Sync {
    /// Whether hardware acceleration is usable right now
    fn acceleration_available(&self) -> bool;
}

/// Operator override for the accelerated path
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AcceleratorMode {
    /// Use acceleration whenever the host supports it
    #[default]
    Auto,
    /// Always use the host path
    Off,
}

impl FromStr for AcceleratorMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "off" => Ok(Self::Off),
            other => anyhow::bail!("expected `auto` or `off`, got `{}`", other),
        }
    }
}

/// Standard implementation of DeviceProbe
///
/// The accelerated context spreads work across hardware threads, so it is
/// only worth selecting when the host exposes more than one.
pub struct SystemDeviceProbe {
    mode: AcceleratorMode,
}

impl SystemDeviceProbe {
    pub fn new(mode: AcceleratorMode) -> Self {
        Self { mode }
    }
}

impl DeviceProbe for SystemDeviceProbe {
    fn acceleration_available(&self) -> bool {
        if self.mode == AcceleratorMode::Off {
            return false;
        }

        let threads = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        debug!(threads, "Queried accelerator availability");

        threads >= 2
    }
}
