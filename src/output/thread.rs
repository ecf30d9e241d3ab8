//! thread.rs
//! Owner of the DMX output worker.
//! - `start`: prepares the device, spawns the worker (optionally pinned, max priority)
//! - `write_dmx`: hands a frame to the worker, never waits on it
//! - `stop`: requests termination and joins; also run on drop
//!
//! The worker probes sleep granularity once, before its first cycle, unless the
//! config forces a verdict.

use crossbeam::channel::Sender;
use std::{
    sync::{Arc, OnceLock},
    thread::{self, JoinHandle},
};
use thread_priority::{ThreadBuilderExt, ThreadPriority};
use log::{error, info, warn};

use crate::config::ThreadConfig;
use crate::dmx::{DmxFrame, SharedOutput};
use crate::error::{DmxError, Result};
use crate::output::{
    clock::Clock,
    telemetry::TelemetryReport,
    timing_probe::{self, TimingMode},
    transmit_loop::TransmitLoop,
};
use crate::widget::UartWidget;

const THREAD_NAME: &str = "uart-dmx-output";

pub struct DmxOutputThread {
    shared: Arc<SharedOutput>,
    timing: Arc<OnceLock<TimingMode>>,
    handle: Option<JoinHandle<()>>,
}

impl DmxOutputThread {
    /// Starts output on `widget` with the clock picked by `config.sleep_strategy`.
    pub fn start(widget: Arc<dyn UartWidget>, config: ThreadConfig) -> Result<Self> {
        let clock = config.sleep_strategy.clock();
        Self::start_with(widget, config, clock, None)
    }

    /// Like `start`, with an explicit clock and an optional telemetry observer.
    pub fn start_with(
        widget: Arc<dyn UartWidget>,
        config: ThreadConfig,
        clock: Box<dyn Clock>,
        reports: Option<Sender<TelemetryReport>>,
    ) -> Result<Self> {
        if !widget.is_open() {
            widget.setup_output()?;
        }

        let shared = Arc::new(SharedOutput::new());
        let timing = Arc::new(OnceLock::new());

        let worker = {
            let shared = shared.clone();
            let timing = timing.clone();
            let config = config.clone();

            move || {
                if let Some(core) = config.core {
                    pin_to_core(core);
                }

                let mode = match config.force_timing {
                    Some(forced) => {
                        info!("Granularity for UART thread forced to {}", forced);
                        forced
                    }
                    None => timing_probe::measure(&clock),
                };
                let _ = timing.set(mode);

                let mut tx_loop = TransmitLoop::new(widget, shared, config, mode, clock);
                if let Some(sink) = reports {
                    tx_loop = tx_loop.with_report_sink(sink);
                }
                tx_loop.run();
            }
        };

        let builder = thread::Builder::new().name(THREAD_NAME.to_string());
        let spawned = if config.realtime {
            builder.spawn_with_priority(ThreadPriority::Max, move |priority| {
                if let Err(e) = priority {
                    warn!("[{}] could not raise priority: {:?}", THREAD_NAME, e);
                }
                worker()
            })
        } else {
            builder.spawn(worker)
        };
        let handle = spawned.map_err(|e| DmxError::Spawn(e.to_string()))?;

        info!(
            "DMX output started: break {}us, frame gap {}us",
            config.break_time_us, config.frame_gap_us
        );

        Ok(Self {
            shared,
            timing,
            handle: Some(handle),
        })
    }

    /// Replaces the frame sent from the next cycle on. Always succeeds.
    pub fn write_dmx(&self, frame: &DmxFrame) -> bool {
        self.shared.frame.write_frame(frame);
        true
    }

    /// Requests termination and waits for the worker to exit.
    /// Returns false if the worker panicked or was already stopped.
    pub fn stop(&mut self) -> bool {
        self.shared.terminate.request();
        match self.handle.take() {
            Some(handle) => {
                let joined = handle.join().is_ok();
                if joined {
                    info!("DMX output stopped");
                } else {
                    error!("DMX output thread panicked");
                }
                joined
            }
            None => false,
        }
    }

    /// Probe verdict; `Unknown` until the worker has run its probe.
    pub fn timing_mode(&self) -> TimingMode {
        self.timing.get().copied().unwrap_or_default()
    }

    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }
}

impl Drop for DmxOutputThread {
    fn drop(&mut self) {
        if self.handle.is_some() {
            self.stop();
        }
    }
}

fn pin_to_core(core: usize) {
    let core_ids = core_affinity::get_core_ids().unwrap_or_default();
    match core_ids.get(core) {
        Some(core_id) => {
            if core_affinity::set_for_current(*core_id) {
                info!("[{}] pinned to core {}", THREAD_NAME, core);
            } else {
                error!("[{}] failed to pin to core {}", THREAD_NAME, core);
            }
        }
        None => error!("Core {} not found among available system cores", core),
    }
}
