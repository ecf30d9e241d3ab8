//! Shared test doubles: a scriptable serial widget and a simulated clock.
#![allow(dead_code)]

use parking_lot::Mutex;
use std::{
    collections::VecDeque,
    sync::Arc,
    thread,
    time::{Duration, Instant},
};

use uart_dmx::{
    dmx::DmxFrame,
    error::{DmxError, Result},
    output::Clock,
    widget::UartWidget,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    BreakOn,
    BreakOff,
    Write(Vec<u8>),
}

/// Widget that records every call and fails the ones scripted to fail.
#[derive(Default)]
pub struct MockWidget {
    open: Mutex<bool>,
    setups: Mutex<u32>,
    fail_setup: bool,
    calls: Mutex<Vec<Call>>,
    break_on_failures: Mutex<VecDeque<bool>>,
    break_off_failures: Mutex<VecDeque<bool>>,
    write_failures: Mutex<VecDeque<bool>>,
    write_delay: Mutex<Duration>,
}

impl MockWidget {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn already_open() -> Arc<Self> {
        let w = Self::default();
        *w.open.lock() = true;
        Arc::new(w)
    }

    pub fn failing_setup() -> Arc<Self> {
        Arc::new(Self {
            fail_setup: true,
            ..Self::default()
        })
    }

    /// Next `n` break-on calls fail.
    pub fn fail_break_on(&self, n: usize) {
        self.break_on_failures.lock().extend(std::iter::repeat(true).take(n));
    }

    pub fn fail_break_off(&self, n: usize) {
        self.break_off_failures.lock().extend(std::iter::repeat(true).take(n));
    }

    pub fn fail_writes(&self, n: usize) {
        self.write_failures.lock().extend(std::iter::repeat(true).take(n));
    }

    /// Makes every write block for `delay` of real time.
    pub fn set_write_delay(&self, delay: Duration) {
        *self.write_delay.lock() = delay;
    }

    pub fn setups(&self) -> u32 {
        *self.setups.lock()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn writes(&self) -> Vec<Vec<u8>> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::Write(data) => Some(data.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    fn scripted_failure(queue: &Mutex<VecDeque<bool>>) -> bool {
        queue.lock().pop_front().unwrap_or(false)
    }
}

impl UartWidget for MockWidget {
    fn is_open(&self) -> bool {
        *self.open.lock()
    }

    fn setup_output(&self) -> Result<()> {
        *self.setups.lock() += 1;
        if self.fail_setup {
            return Err(DmxError::Setup("mock device missing".into()));
        }
        *self.open.lock() = true;
        Ok(())
    }

    fn set_break(&self, asserted: bool) -> Result<()> {
        let (call, queue) = if asserted {
            (Call::BreakOn, &self.break_on_failures)
        } else {
            (Call::BreakOff, &self.break_off_failures)
        };
        self.calls.lock().push(call);
        if Self::scripted_failure(queue) {
            return Err(DmxError::Io(std::io::Error::other("break ioctl failed")));
        }
        Ok(())
    }

    fn write(&self, frame: &DmxFrame) -> Result<()> {
        let delay = *self.write_delay.lock();
        if !delay.is_zero() {
            thread::sleep(delay);
        }
        self.calls.lock().push(Call::Write(frame.as_slice().to_vec()));
        if Self::scripted_failure(&self.write_failures) {
            return Err(DmxError::Io(std::io::Error::other("short write")));
        }
        Ok(())
    }
}

/// Clock that never really sleeps: each sleep advances simulated time by the
/// requested duration (or a fixed override) and is logged.
#[derive(Clone)]
pub struct SimClock {
    inner: Arc<Mutex<SimState>>,
}

struct SimState {
    now: Instant,
    sleeps: Vec<Duration>,
    sleep_takes: Option<Duration>,
}

impl SimClock {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(SimState {
                now: Instant::now(),
                sleeps: Vec::new(),
                sleep_takes: None,
            })),
        }
    }

    /// Every sleep takes `takes`, whatever was requested.
    pub fn with_sleep_taking(takes: Duration) -> Self {
        let clock = Self::new();
        clock.inner.lock().sleep_takes = Some(takes);
        clock
    }

    /// Requested durations, in order.
    pub fn sleeps(&self) -> Vec<Duration> {
        self.inner.lock().sleeps.clone()
    }

    pub fn clear_sleeps(&self) {
        self.inner.lock().sleeps.clear();
    }
}

impl Clock for SimClock {
    fn now(&self) -> Instant {
        self.inner.lock().now
    }

    fn sleep(&self, duration: Duration) {
        let mut s = self.inner.lock();
        let advance = s.sleep_takes.unwrap_or(duration);
        s.now += advance;
        s.sleeps.push(duration);
    }
}
