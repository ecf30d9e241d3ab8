//! Output configuration.
//!
//! `ThreadConfig` is handed to the output thread at construction and never
//! changes afterwards. `OutputSettings` wraps it with what the binary needs
//! and is loaded from a TOML file.

use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};
use log::{info, warn};

use crate::error::{DmxError, Result};
use crate::output::timing_probe::TimingMode;

/// Mark-after-break in microseconds. Protocol constant, not configurable.
pub const DMX_MAB_US: u64 = 16;
pub const DEFAULT_BREAK_US: u64 = 100;
pub const DEFAULT_FRAME_GAP_US: u64 = 100;

/// Sleep primitive used for every pause the worker takes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SleepStrategy {
    /// Plain `thread::sleep`; granularity is whatever the OS scheduler gives.
    #[default]
    Os,
    /// `spin_sleep::SpinSleeper`: sleeps most of the interval, spins the rest.
    Spin,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThreadConfig {
    pub break_time_us: u64,
    pub frame_gap_us: u64,
    pub sleep_strategy: SleepStrategy,
    /// Skips the probe and uses this verdict instead
    pub force_timing: Option<TimingMode>,
    /// CPU core to pin the worker to
    pub core: Option<usize>,
    /// Spawn the worker at maximum OS priority
    pub realtime: bool,
}

impl Default for ThreadConfig {
    fn default() -> Self {
        Self {
            break_time_us: DEFAULT_BREAK_US,
            frame_gap_us: DEFAULT_FRAME_GAP_US,
            sleep_strategy: SleepStrategy::Os,
            force_timing: None,
            core: None,
            realtime: false,
        }
    }
}

impl ThreadConfig {
    pub fn new(break_time_us: u64, frame_gap_us: u64) -> Self {
        Self {
            break_time_us,
            frame_gap_us,
            ..Self::default()
        }
    }

    #[inline]
    pub fn break_time(&self) -> Duration {
        Duration::from_micros(self.break_time_us)
    }

    #[inline]
    pub fn mark_after_break(&self) -> Duration {
        Duration::from_micros(DMX_MAB_US)
    }

    #[inline]
    pub fn frame_gap(&self) -> Duration {
        Duration::from_micros(self.frame_gap_us)
    }
}

/// Settings for the `uart_dmx` binary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub device: PathBuf,
    pub thread: ThreadConfig,
    /// Where to write one CSV row per telemetry flush
    pub telemetry_csv: Option<PathBuf>,
    pub run_secs: u64,
    /// Rate at which the demo producer submits frames
    pub refresh_hz: u32,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyUSB0"),
            thread: ThreadConfig::default(),
            telemetry_csv: None,
            run_secs: 10,
            refresh_hz: 40,
        }
    }
}

impl OutputSettings {
    /// Parses settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| DmxError::Config(e.to_string()))
    }

    /// Loads settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load(path: &Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match Self::from_toml(&content) {
                    Ok(settings) => {
                        info!("Loaded output settings from {}", path.display());
                        return settings;
                    }
                    Err(e) => warn!("Failed to parse {}: {}", path.display(), e),
                },
                Err(e) => warn!("Failed to read {}: {}", path.display(), e),
            }
        }

        info!("Using default output settings");
        Self::default()
    }
}
