//! # UART DMX512 output
//!
//! Drives one DMX512 universe over a UART-class serial adapter, framing every
//! packet as break → mark-after-break → slots.
//!
//! ## Key Architecture
//! - **Timing probe:** one 1 ms sleep decides whether break/MAB pauses can be trusted.
//! - **Frame buffer:** producers replace the latest frame under a lock; the worker snapshots it.
//! - **Transmit loop:** one packet per cycle, failures counted and skipped, fixed frame gap.
//! - **Telemetry:** counters flushed to the log at most once per second.

pub mod config;
pub mod dmx;
pub mod error;
pub mod output;
pub mod utils;
pub mod widget;

pub use config::{OutputSettings, SleepStrategy, ThreadConfig};
pub use dmx::DmxFrame;
pub use error::{DmxError, Result};
pub use output::{DmxOutputThread, TimingMode};
pub use widget::UartWidget;
