//! Serial device seam.
//!
//! The output worker only needs four operations from the adapter. Every call
//! may fail and may block; the worker never retries any of them.

use crate::dmx::DmxFrame;
use crate::error::Result;

pub mod tty;

pub use tty::TtyWidget;

pub trait UartWidget: Send + Sync {
    fn is_open(&self) -> bool;

    /// Opens and prepares the device. Called once, before the worker starts.
    fn setup_output(&self) -> Result<()>;

    /// Asserts (`true`) or releases (`false`) the break condition on the line.
    fn set_break(&self, asserted: bool) -> Result<()>;

    /// Sends the start code and slot data of `frame`.
    fn write(&self, frame: &DmxFrame) -> Result<()>;
}
