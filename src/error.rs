//! Error types for the DMX output path.
//!
//! Only setup-time failures travel through these types to a caller. Per-cycle
//! transmit failures are counted by the transmit loop and never escalated.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DmxError {
    /// Underlying device I/O failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serial port refused a line operation
    #[error("serial error: {0}")]
    Serial(#[from] serialport::Error),

    /// Operation needs an open device
    #[error("device not open")]
    DeviceNotOpen,

    /// Device could not be prepared for output
    #[error("setup failed: {0}")]
    Setup(String),

    /// Worker thread could not be spawned
    #[error("failed to spawn output thread: {0}")]
    Spawn(String),

    /// Channel outside 1..=512
    #[error("invalid DMX channel: {0}")]
    InvalidChannel(u16),

    /// Settings file could not be read or parsed
    #[error("config error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DmxError>;
