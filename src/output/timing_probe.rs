//! timing_probe.rs
//! One-shot check of sleep granularity, run once before the first transmit cycle.
//!
//! If a 1 ms sleep comes back within 3 ms, in-process break and
//! mark-after-break pauses are trusted (`Good`). Otherwise they are skipped for
//! the whole session and break timing is left to the write path (`Bad`).

use serde::{Deserialize, Serialize};
use std::{fmt, time::Duration};
use log::info;

use crate::output::clock::Clock;

pub const PROBE_SLEEP: Duration = Duration::from_millis(1);
/// A probe sleep longer than this makes the clock untrustworthy.
pub const GRANULARITY_THRESHOLD: Duration = Duration::from_millis(3);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimingMode {
    #[default]
    Unknown,
    Good,
    Bad,
}

impl TimingMode {
    /// Break and mark-after-break pauses only run under `Good`.
    #[inline]
    pub fn allows_pauses(self) -> bool {
        self == TimingMode::Good
    }
}

impl fmt::Display for TimingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TimingMode::Unknown => "UNKNOWN",
            TimingMode::Good => "GOOD",
            TimingMode::Bad => "BAD",
        };
        f.write_str(name)
    }
}

/// Verdict for one observed probe interval.
///
/// Compares the whole `Duration`, not whole milliseconds: 3.5 ms is already `Bad`.
pub fn classify(elapsed: Duration) -> TimingMode {
    if elapsed > GRANULARITY_THRESHOLD {
        TimingMode::Bad
    } else {
        TimingMode::Good
    }
}

/// Sleeps `PROBE_SLEEP` on `clock` and classifies how long it really took.
pub fn measure<C: Clock + ?Sized>(clock: &C) -> TimingMode {
    let before = clock.now();
    clock.sleep(PROBE_SLEEP);
    let elapsed = clock.now().saturating_duration_since(before);

    let mode = classify(elapsed);
    info!("Granularity for UART thread is {} ({}us for a 1ms sleep)", mode, elapsed.as_micros());
    mode
}
