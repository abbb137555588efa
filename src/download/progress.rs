//! In-place progress reporting for video transfers.
//!
//! The indicator redraws a single line showing megabytes persisted versus
//! expected, elapsed seconds, and a linear remaining-time estimate. Callers
//! feed it the on-disk file size after each chunk, never an in-memory
//! counter, so the display stays consistent with what a crash would leave
//! behind.

use std::time::{Duration, Instant};

use indicatif::{ProgressBar, ProgressStyle};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Linear remaining-time estimate: `total_expected * elapsed / bytes_so_far`.
///
/// Returns `None` until the first byte has arrived; the projection is
/// undefined at zero and must never divide by it.
#[must_use]
pub fn estimate_remaining(
    total_expected: u64,
    elapsed: Duration,
    bytes_so_far: u64,
) -> Option<Duration> {
    if bytes_so_far == 0 {
        return None;
    }
    #[allow(clippy::cast_precision_loss)]
    let projected = elapsed.as_secs_f64() * (total_expected as f64) / (bytes_so_far as f64);
    Some(Duration::from_secs_f64(projected.max(0.0)))
}

/// One transfer's progress line.
pub struct TransferProgress {
    bar: ProgressBar,
    label: String,
    total_bytes: u64,
    started: Instant,
}

impl TransferProgress {
    /// Creates the progress line for one destination file.
    #[must_use]
    pub fn new(label: &str, total_bytes: u64) -> Self {
        let bar = ProgressBar::new(total_bytes);
        bar.set_style(
            ProgressStyle::with_template("{msg}\n{bar:60} {percent}%")
                .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        let progress = Self {
            bar,
            label: label.to_string(),
            total_bytes,
            started: Instant::now(),
        };
        progress.update(0);
        progress
    }

    /// Redraws from the byte count currently persisted on disk.
    pub fn update(&self, bytes_on_disk: u64) {
        self.bar.set_position(bytes_on_disk.min(self.total_bytes));
        let elapsed = self.started.elapsed();
        let eta = match estimate_remaining(self.total_bytes, elapsed, bytes_on_disk) {
            Some(remaining) => format!(", ~{}s left", remaining.as_secs()),
            None => String::new(),
        };
        #[allow(clippy::cast_precision_loss)]
        self.bar.set_message(format!(
            "{}: {:.2} / {:.2} MB, {}s elapsed{eta}",
            self.label,
            bytes_on_disk as f64 / BYTES_PER_MB,
            self.total_bytes as f64 / BYTES_PER_MB,
            elapsed.as_secs(),
        ));
    }

    /// Forces the final 100% update and releases the line.
    pub fn finish(&self) {
        self.update(self.total_bytes);
        self.bar.finish();
    }
}
