//! clock.rs
//! Time source and sleep primitive for the output worker.
//! - `OsClock`: `thread::sleep`, granularity at the mercy of the scheduler
//! - `SpinClock`: `SpinSleeper`, sleeps coarse then spins the remainder
//!
//! The timing probe measures whichever clock the worker will actually use.

use spin_sleep::{SpinSleeper, SpinStrategy};
use std::{
    thread,
    time::{Duration, Instant},
};

use crate::config::SleepStrategy;

pub trait Clock: Send {
    fn now(&self) -> Instant;
    fn sleep(&self, duration: Duration);
}

impl<C: Clock + ?Sized> Clock for Box<C> {
    #[inline]
    fn now(&self) -> Instant {
        (**self).now()
    }

    #[inline]
    fn sleep(&self, duration: Duration) {
        (**self).sleep(duration)
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct OsClock;

impl Clock for OsClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, duration: Duration) {
        thread::sleep(duration);
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SpinClock {
    sleeper: SpinSleeper,
}

impl SpinClock {
    pub fn new() -> Self {
        Self {
            sleeper: SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread),
        }
    }
}

impl Default for SpinClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SpinClock {
    #[inline]
    fn now(&self) -> Instant {
        Instant::now()
    }

    #[inline]
    fn sleep(&self, duration: Duration) {
        self.sleeper.sleep(duration);
    }
}

impl SleepStrategy {
    pub fn clock(self) -> Box<dyn Clock> {
        match self {
            SleepStrategy::Os => Box::new(OsClock),
            SleepStrategy::Spin => Box::new(SpinClock::new()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn both_clocks_sleep_at_least_the_request() {
        for clock in [SleepStrategy::Os.clock(), SleepStrategy::Spin.clock()] {
            let start = clock.now();
            clock.sleep(Duration::from_micros(500));
            assert!(clock.now() - start >= Duration::from_micros(500));
        }
    }
}
