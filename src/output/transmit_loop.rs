//! transmit_loop.rs
//! The DMX output worker: one framed packet per cycle.
//!
//! Cycle order:
//! 1. check termination (exit without sending)
//! 2. snapshot the latest frame
//! 3. break on → [break pause] → break off → [mark-after-break pause] → write slots
//! 4. frame gap pause
//! 5. telemetry tick
//!
//! Pauses in step 3 only run when the timing probe said `Good`. A failing step in 3
//! is counted and skips the rest of step 3 only; steps 4 and 5 always run.

use std::sync::Arc;
use crossbeam::channel::Sender;
use log::debug;

use crate::config::ThreadConfig;
use crate::dmx::{DmxFrame, SharedOutput};
use crate::error::DmxError;
use crate::output::{
    clock::Clock,
    telemetry::{ErrorCounters, Telemetry, TelemetryReport, TransmitStep},
    timing_probe::TimingMode,
};
use crate::widget::UartWidget;

/// Result of one pass through the loop.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Termination was requested; nothing was sent.
    Terminated,
    /// Cycle ran to the end; carries the report if telemetry flushed.
    Completed(Option<TelemetryReport>),
}

pub struct TransmitLoop<C: Clock> {
    widget: Arc<dyn UartWidget>,
    shared: Arc<SharedOutput>,
    config: ThreadConfig,
    timing: TimingMode,
    clock: C,
    frame: DmxFrame,
    telemetry: Telemetry,
}

impl<C: Clock> TransmitLoop<C> {
    pub fn new(
        widget: Arc<dyn UartWidget>,
        shared: Arc<SharedOutput>,
        config: ThreadConfig,
        timing: TimingMode,
        clock: C,
    ) -> Self {
        let telemetry = Telemetry::new(clock.now());
        Self {
            widget,
            shared,
            config,
            timing,
            clock,
            frame: DmxFrame::new(),
            telemetry,
        }
    }

    pub fn with_report_sink(mut self, sink: Sender<TelemetryReport>) -> Self {
        self.telemetry = self.telemetry.with_sink(sink);
        self
    }

    #[inline]
    pub fn timing_mode(&self) -> TimingMode {
        self.timing
    }

    /// Counters accumulated since the last telemetry flush.
    #[inline]
    pub fn counters(&self) -> ErrorCounters {
        self.telemetry.counters()
    }

    /// Runs cycles until termination is requested.
    pub fn run(&mut self) {
        let mut cycles: u64 = 0;
        while self.run_cycle() != CycleOutcome::Terminated {
            cycles += 1;
        }
        debug!("[TransmitLoop] stopped after {} cycles", cycles);
    }

    pub fn run_cycle(&mut self) -> CycleOutcome {
        if self.shared.terminate.is_set() {
            return CycleOutcome::Terminated;
        }

        self.shared.frame.snapshot_into(&mut self.frame);

        let outcome = self.transmit();
        self.telemetry.record(outcome);

        // remainder of the frame time; bounds the output rate
        self.clock.sleep(self.config.frame_gap());

        CycleOutcome::Completed(self.telemetry.tick(self.clock.now()))
    }

    fn transmit(&self) -> Result<(), TransmitStep> {
        self.widget
            .set_break(true)
            .map_err(|e| step_failed(TransmitStep::BreakStart, e))?;
        self.pause(self.config.break_time());

        self.widget
            .set_break(false)
            .map_err(|e| step_failed(TransmitStep::BreakStop, e))?;
        self.pause(self.config.mark_after_break());

        self.widget
            .write(&self.frame)
            .map_err(|e| step_failed(TransmitStep::Write, e))
    }

    #[inline]
    fn pause(&self, duration: std::time::Duration) {
        if self.timing.allows_pauses() {
            self.clock.sleep(duration);
        }
    }
}

fn step_failed(step: TransmitStep, err: DmxError) -> TransmitStep {
    debug!("[TransmitLoop] {:?} failed: {}", step, err);
    step
}
