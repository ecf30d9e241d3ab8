//! telemetry.rs
//! Per-cycle failure accounting for the output worker.
//! - counts break start/stop failures, write failures and frames sent
//! - flushes at most once per second: one log line, optional report to an observer
//! - all four counters reset together on every flush

use crossbeam::channel::Sender;
use serde::Serialize;
use std::time::{Duration, Instant};
use log::{debug, info};

/// Minimum time between two flushes.
pub const PRINT_INTERVAL: Duration = Duration::from_secs(1);

/// Transmit step that cut a cycle short.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransmitStep {
    BreakStart,
    BreakStop,
    Write,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ErrorCounters {
    pub break_start_failures: u64,
    pub break_stop_failures: u64,
    pub write_failures: u64,
    pub frames_sent: u64,
}

impl ErrorCounters {
    pub fn record_failure(&mut self, step: TransmitStep) {
        match step {
            TransmitStep::BreakStart => self.break_start_failures += 1,
            TransmitStep::BreakStop => self.break_stop_failures += 1,
            TransmitStep::Write => self.write_failures += 1,
        }
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        *self == Self::default()
    }
}

/// What one flush reported.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TelemetryReport {
    pub elapsed_ms: u64,
    pub frames_sent: u64,
    pub break_start_failures: u64,
    pub break_stop_failures: u64,
    pub write_failures: u64,
}

pub struct Telemetry {
    counters: ErrorCounters,
    last_flush: Instant,
    sink: Option<Sender<TelemetryReport>>,
}

impl Telemetry {
    pub fn new(now: Instant) -> Self {
        Self {
            counters: ErrorCounters::default(),
            last_flush: now,
            sink: None,
        }
    }

    /// Also deliver every flush to `sink`. Delivery never blocks; reports are
    /// dropped while the observer lags.
    pub fn with_sink(mut self, sink: Sender<TelemetryReport>) -> Self {
        self.sink = Some(sink);
        self
    }

    #[inline]
    pub fn counters(&self) -> ErrorCounters {
        self.counters
    }

    /// Accounts for one cycle's transmit outcome.
    pub fn record(&mut self, outcome: Result<(), TransmitStep>) {
        match outcome {
            Ok(()) => self.counters.frames_sent += 1,
            Err(step) => self.counters.record_failure(step),
        }
    }

    /// Flushes when more than `PRINT_INTERVAL` has passed since the last flush.
    pub fn tick(&mut self, now: Instant) -> Option<TelemetryReport> {
        let since_last = now.saturating_duration_since(self.last_flush);
        if since_last <= PRINT_INTERVAL {
            return None;
        }

        let c = self.counters;
        info!(
            "UART thread frames {}, errors: start break {}, stop break {}, write {}",
            c.frames_sent, c.break_start_failures, c.break_stop_failures, c.write_failures
        );

        let report = TelemetryReport {
            elapsed_ms: since_last.as_millis() as u64,
            frames_sent: c.frames_sent,
            break_start_failures: c.break_start_failures,
            break_stop_failures: c.break_stop_failures,
            write_failures: c.write_failures,
        };

        if let Some(sink) = &self.sink {
            if let Err(e) = sink.try_send(report.clone()) {
                debug!("[Telemetry] report not delivered: {:?}", e);
            }
        }

        self.counters = ErrorCounters::default();
        self.last_flush = now;
        Some(report)
    }
}
