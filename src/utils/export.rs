//! Telemetry export: one CSV row per flush.
//!
//! The output worker hands reports over a bounded channel with `try_send`, so
//! a slow disk never reaches the transmit cadence. The exporter thread drains
//! the channel, batches flushes, and exits once every sender is gone.

use crossbeam::channel::Receiver;
use csv::Writer;
use std::{
    fs::{create_dir_all, File},
    io::BufWriter,
    path::PathBuf,
    thread::{self, JoinHandle},
};
use log::{debug, error};

use crate::output::telemetry::TelemetryReport;

/// Rows written between two flushes to disk.
const FLUSH_BATCHES: usize = 8;

/// Spawns the exporter writing reports from `rx` into `output_csv`.
pub fn spawn_report_exporter(rx: Receiver<TelemetryReport>, output_csv: PathBuf) -> JoinHandle<()> {
    thread::spawn(move || {
        if let Some(dir) = output_csv.parent().filter(|d| !d.as_os_str().is_empty()) {
            if let Err(e) = create_dir_all(dir) {
                error!("Failed to create export directory {:?}: {}", dir, e);
                return;
            }
        }

        let file = match File::create(&output_csv) {
            Ok(f) => f,
            Err(e) => {
                error!("Failed to create telemetry CSV {:?}: {}", output_csv, e);
                return;
            }
        };
        let mut wtr = Writer::from_writer(BufWriter::new(file));

        let mut rows: u64 = 0;
        let mut pending = 0usize;
        while let Ok(report) = rx.recv() {
            if let Err(e) = wtr.serialize(&report) {
                error!("Failed to write telemetry row: {}", e);
                continue;
            }
            rows += 1;
            pending += 1;
            if pending >= FLUSH_BATCHES {
                wtr.flush().ok();
                pending = 0;
            }
        }

        wtr.flush().ok();
        debug!("[Exporter] wrote {} telemetry rows to {:?}", rows, output_csv);
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossbeam::channel::bounded;

    fn report(frames_sent: u64) -> TelemetryReport {
        TelemetryReport {
            elapsed_ms: 1_004,
            frames_sent,
            break_start_failures: 0,
            break_stop_failures: 2,
            write_failures: 1,
        }
    }

    #[test]
    fn writes_header_and_one_row_per_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("telemetry.csv");

        let (tx, rx) = bounded(16);
        let handle = spawn_report_exporter(rx, path.clone());
        for n in [44, 43, 44] {
            tx.send(report(n)).unwrap();
        }
        drop(tx);
        handle.join().unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "elapsed_ms,frames_sent,break_start_failures,break_stop_failures,write_failures"
        );
        assert_eq!(lines[1], "1004,44,0,2,1");
        assert_eq!(lines.len(), 4);
    }
}
