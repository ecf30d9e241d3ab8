// Output side: timing probe, transmit worker, telemetry
// and the thread that owns them.

pub mod clock;
pub mod telemetry;
pub mod thread;
pub mod timing_probe;
pub mod transmit_loop;

pub use clock::{Clock, OsClock, SpinClock};
pub use telemetry::{ErrorCounters, Telemetry, TelemetryReport, TransmitStep};
pub use thread::DmxOutputThread;
pub use timing_probe::TimingMode;
pub use transmit_loop::{CycleOutcome, TransmitLoop};
