//! # UART DMX output driver
//!
//! Opens a serial adapter, starts the DMX output thread and feeds it a moving
//! channel chase for a fixed time.
//!
//! Usage: `uart_dmx [settings.toml]` (default `uart_dmx.toml`, defaults if missing).
//! Log level via `RUST_LOG`, e.g. `RUST_LOG=info`.

use crossbeam::channel::bounded;
use spin_sleep::{SpinSleeper, SpinStrategy};
use std::{
    env,
    path::PathBuf,
    process::ExitCode,
    sync::Arc,
    time::{Duration, Instant},
};
use log::{error, info};

use uart_dmx::{
    config::OutputSettings,
    dmx::{DmxFrame, DMX_UNIVERSE_SIZE},
    output::DmxOutputThread,
    utils::export::spawn_report_exporter,
    widget::{TtyWidget, UartWidget},
};

const DEFAULT_SETTINGS_PATH: &str = "uart_dmx.toml";
const REPORT_QUEUE: usize = 64;
/// Channels lit by the chase at any time.
const CHASE_WIDTH: usize = 8;

fn main() -> ExitCode {
    env_logger::init();
    info!("=== UART DMX START ===");

    let settings_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_SETTINGS_PATH));
    let settings = OutputSettings::load(&settings_path);

    let tty = Arc::new(TtyWidget::new(&settings.device));
    let widget: Arc<dyn UartWidget> = tty.clone();

    let (report_tx, exporter) = match &settings.telemetry_csv {
        Some(path) => {
            let (tx, rx) = bounded(REPORT_QUEUE);
            (Some(tx), Some(spawn_report_exporter(rx, path.clone())))
        }
        None => (None, None),
    };

    let clock = settings.thread.sleep_strategy.clock();
    let mut output = match DmxOutputThread::start_with(widget, settings.thread.clone(), clock, report_tx) {
        Ok(output) => output,
        Err(e) => {
            error!("Failed to start DMX output on {}: {}", tty.path().display(), e);
            return ExitCode::FAILURE;
        }
    };

    run_chase(&output, &settings);

    info!("Timing mode was {}", output.timing_mode());
    if !output.stop() {
        error!("DMX output thread did not exit cleanly");
    }
    tty.close();
    // the worker held the last report sender; the exporter drains and exits
    if let Some(handle) = exporter {
        let _ = handle.join();
    }

    info!("=== UART DMX FINISHED ===");
    ExitCode::SUCCESS
}

/// Submits a chase frame at `refresh_hz` until `run_secs` have passed.
fn run_chase(output: &DmxOutputThread, settings: &OutputSettings) {
    let period = Duration::from_secs_f64(1.0 / settings.refresh_hz.max(1) as f64);
    let run_for = Duration::from_secs(settings.run_secs);
    let sleeper = SpinSleeper::new(100_000).with_spin_strategy(SpinStrategy::YieldThread);

    info!(
        "[Chase] refreshing at {} Hz for {} seconds",
        settings.refresh_hz, settings.run_secs
    );

    let start = Instant::now();
    let mut next_release = start + period;
    let mut head = 0usize;
    let mut frame = DmxFrame::blackout();
    let mut slots = [0u8; DMX_UNIVERSE_SIZE];

    while start.elapsed() < run_for {
        slots.fill(0);
        for i in 0..CHASE_WIDTH {
            let level = 255 - (i * 255 / CHASE_WIDTH) as u8;
            slots[(head + DMX_UNIVERSE_SIZE - i) % DMX_UNIVERSE_SIZE] = level;
        }
        frame.set_from_slice(&slots);
        output.write_dmx(&frame);
        head = (head + 1) % DMX_UNIVERSE_SIZE;

        let now = Instant::now();
        if now < next_release {
            sleeper.sleep(next_release - now);
        }
        next_release += period;
    }
}
