//! tty.rs
//! `UartWidget` over a serial device (e.g. `/dev/ttyAMA0`, `/dev/ttyUSB0`, `COM3`).
//! - the line runs at the DMX512 rate: 250 kbaud, 8 data bits, no parity, 2 stop bits
//! - break is driven with the port's own break control

use parking_lot::Mutex;
use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use std::{
    io::Write,
    path::{Path, PathBuf},
    time::Duration,
};
use log::info;

use crate::dmx::{DmxFrame, DMX_NULL_START, DMX_UNIVERSE_SIZE};
use crate::error::{DmxError, Result};
use crate::widget::UartWidget;

/// DMX512 line rate.
pub const DMX_BAUD_RATE: u32 = 250_000;
/// A full 513-byte packet takes ~23 ms at 250 kbaud.
const WRITE_TIMEOUT: Duration = Duration::from_millis(100);

pub struct TtyWidget {
    path: PathBuf,
    port: Mutex<Option<Box<dyn SerialPort>>>,
}

impl TtyWidget {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            port: Mutex::new(None),
        }
    }

    /// Adopts a port opened elsewhere and switches it to the DMX line settings.
    pub fn with_port(path: impl Into<PathBuf>, mut port: Box<dyn SerialPort>) -> Result<Self> {
        let path = path.into();
        configure_dmx_line(port.as_mut())
            .map_err(|e| DmxError::Setup(format!("{}: {}", path.display(), e)))?;
        Ok(Self {
            path,
            port: Mutex::new(Some(port)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Releases the device. A later `setup_output` reopens it.
    pub fn close(&self) {
        if self.port.lock().take().is_some() {
            info!("Closed {}", self.path.display());
        }
    }
}

impl UartWidget for TtyWidget {
    fn is_open(&self) -> bool {
        self.port.lock().is_some()
    }

    fn setup_output(&self) -> Result<()> {
        let setup_failed = |e: serialport::Error| DmxError::Setup(format!("{}: {}", self.path.display(), e));

        let mut port = serialport::new(self.path.to_string_lossy(), DMX_BAUD_RATE)
            .timeout(WRITE_TIMEOUT)
            .open()
            .map_err(setup_failed)?;
        configure_dmx_line(port.as_mut()).map_err(setup_failed)?;

        info!("Opened {} for DMX output at {} baud", self.path.display(), DMX_BAUD_RATE);
        *self.port.lock() = Some(port);
        Ok(())
    }

    fn set_break(&self, asserted: bool) -> Result<()> {
        let guard = self.port.lock();
        let port = (*guard).as_ref().ok_or(DmxError::DeviceNotOpen)?;
        if asserted {
            port.set_break()?;
        } else {
            port.clear_break()?;
        }
        Ok(())
    }

    fn write(&self, frame: &DmxFrame) -> Result<()> {
        let mut packet = [0u8; DMX_UNIVERSE_SIZE + 1];
        let len = frame.len();
        packet[0] = DMX_NULL_START;
        packet[1..=len].copy_from_slice(frame.as_slice());

        let mut guard = self.port.lock();
        let port = (*guard).as_mut().ok_or(DmxError::DeviceNotOpen)?;
        port.write_all(&packet[..=len])?;
        Ok(())
    }
}

/// 250 kbaud 8N2, no flow control.
pub fn configure_dmx_line(port: &mut dyn SerialPort) -> serialport::Result<()> {
    port.set_baud_rate(DMX_BAUD_RATE)?;
    port.set_data_bits(DataBits::Eight)?;
    port.set_parity(Parity::None)?;
    port.set_stop_bits(StopBits::Two)?;
    port.set_flow_control(FlowControl::None)?;
    Ok(())
}
