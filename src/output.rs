//! Output formatting and logging utilities.

use nalgebra::Vector3;
use std::fmt;
use std::fs::File;
use std::io::Write;
use std::time::SystemTime as StdSystemTime;
use tracing_subscriber::{
    fmt::format::Writer, fmt::layer, fmt::time::FormatTime, layer::SubscriberExt,
    util::SubscriberInitExt, Registry,
};

use crate::observables::{MeanObservables, ObservableSnapshot};

/// Species label for every atom in the cluster.
pub const SPECIES: &str = "AR";

/// Custom time formatter that shows only seconds
struct SecondPrecisionTimer;

impl FormatTime for SecondPrecisionTimer {
    fn format_time(&self, w: &mut Writer<'_>) -> fmt::Result {
        let now = StdSystemTime::now();
        let duration = now
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default();

        let total_seconds = duration.as_secs();
        let hours = (total_seconds / 3600) % 24;
        let minutes = (total_seconds / 60) % 60;
        let seconds = total_seconds % 60;

        write!(w, "{:02}:{:02}:{:02}", hours, minutes, seconds)
    }
}

/// Setup log output to file or stdout.
pub fn setup_output(log_path: Option<&String>) {
    match log_path {
        Some(path) => {
            if let Ok(log) = File::create(path) {
                let file_layer = layer()
                    .with_writer(log)
                    .with_timer(SecondPrecisionTimer)
                    .with_ansi(false);
                Registry::default().with(file_layer).init();
            } else {
                eprintln!("Could not create log file: {}", path);
            }
        }
        None => {
            let stdout_layer = layer()
                .with_writer(std::io::stdout)
                .with_timer(SecondPrecisionTimer)
                .with_ansi(true);
            Registry::default().with(stdout_layer).init();
        }
    }
}

/// Writes XYZ-style frames (Jmol-readable): atom count, blank comment line,
/// then one `AR x y z` record per atom. Also used for the one-off initial
/// momentum record, which shares the labeled-vector layout.
pub struct XyzWriter<W: Write> {
    writer: W,
}

impl<W: Write> XyzWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_frame(&mut self, vectors: &[Vector3<f64>]) -> std::io::Result<()> {
        writeln!(self.writer, "{}\n", vectors.len())?;
        for v in vectors {
            writeln!(self.writer, "{} {:.6} {:.6} {:.6}", SPECIES, v.x, v.y, v.z)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

/// Writes the tab-separated `t H T P` table and the final means record.
pub struct ObservableWriter<W: Write> {
    writer: W,
}

impl<W: Write> ObservableWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn write_header(&mut self) -> std::io::Result<()> {
        writeln!(self.writer, "t (ps)\tH (kJ/mol)\tT (K)\tP (atm)")
    }

    pub fn write_snapshot(&mut self, snap: &ObservableSnapshot) -> std::io::Result<()> {
        writeln!(
            self.writer,
            "{:.5}\t{:.5}\t{:.5}\t{:.5}",
            snap.time, snap.hamiltonian, snap.temperature, snap.pressure
        )
    }

    pub fn write_means(&mut self, means: &MeanObservables) -> std::io::Result<()> {
        writeln!(self.writer, "H (kJ/mol)\tT (K)\tP (atm)")?;
        writeln!(
            self.writer,
            "{:.5}\t{:.5}\t{:.5}",
            means.hamiltonian, means.temperature, means.pressure
        )
    }

    pub fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}
