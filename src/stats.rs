//! Wall-clock and size reporting for the CLI front-ends.

use serde::Serialize;
use std::time::Instant;

/// Tracks one encode or decode run.
pub struct CodecStats {
    start_time: Instant,
    pub bytes_in: u64,
    pub bytes_out: u64,
}

/// Snapshot of a finished run, serializable for `--json` output.
#[derive(Debug, Clone, Serialize)]
pub struct StatsSummary {
    pub input_bytes: u64,
    pub output_bytes: u64,
    pub elapsed_ms: u128,
    pub ratio_percent: f64,
}

impl CodecStats {
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
            bytes_in: 0,
            bytes_out: 0,
        }
    }

    pub fn summary(&self) -> StatsSummary {
        let ratio = if self.bytes_in == 0 {
            0.0
        } else {
            self.bytes_out as f64 * 100.0 / self.bytes_in as f64
        };
        StatsSummary {
            input_bytes: self.bytes_in,
            output_bytes: self.bytes_out,
            elapsed_ms: self.start_time.elapsed().as_millis(),
            ratio_percent: ratio,
        }
    }

    pub fn report(&self) {
        let elapsed = self.start_time.elapsed();
        let s = self.summary();
        eprintln!(
            "{} -> {} bytes ({:.2}%) in {:.2?}",
            s.input_bytes, s.output_bytes, s.ratio_percent, elapsed
        );
    }
}

impl Default for CodecStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Periodic progress logging while a stream is being encoded.
///
/// Interval zero keeps it silent; that instance costs two counter bumps per
/// input byte.
#[derive(Debug, Default)]
pub struct LiveStats {
    interval: u64,
    pub bytes_in: u64,
    pub units_out: u64,
}

impl LiveStats {
    pub fn new(interval: u64) -> Self {
        Self {
            interval,
            bytes_in: 0,
            units_out: 0,
        }
    }

    /// A never-logging instance for callers without a progress surface.
    pub fn silent() -> Self {
        Self::new(0)
    }

    /// Call once per input byte with the running output total.
    pub fn tick(&mut self, units_out: u64) {
        self.bytes_in += 1;
        self.units_out = units_out;
        if self.interval > 0 && self.bytes_in % self.interval == 0 {
            eprintln!(
                "[{:>10} bytes in] {} code units out",
                self.bytes_in, self.units_out
            );
        }
    }
}
