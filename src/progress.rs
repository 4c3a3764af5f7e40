//! Terminal progress bars for a dump session

use indicatif::{ProgressBar, ProgressStyle};
use mpkdump_core::{Acquisition, DumpError, DumpProgress};

const TEMPLATE: &str = "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta})";

fn new_bar(total: usize, label: &'static str) -> ProgressBar {
    let style = ProgressStyle::default_bar()
        .template(TEMPLATE)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("#>-");
    let pb = ProgressBar::new(total as u64);
    pb.set_style(style);
    pb.set_message(label);
    pb
}

/// Renders read and write progress with `indicatif`
pub struct BarProgress {
    bar: Option<ProgressBar>,
}

impl BarProgress {
    /// Create a reporter with no bar shown yet
    pub fn new() -> Self {
        Self { bar: None }
    }

    fn replace(&mut self, bar: ProgressBar) {
        if let Some(old) = self.bar.replace(bar) {
            if !old.is_finished() {
                old.finish();
            }
        }
    }
}

impl Default for BarProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl DumpProgress for BarProgress {
    fn reading(&mut self, total_bytes: usize) {
        self.replace(new_bar(total_bytes, "read"));
    }

    fn read_progress(&mut self, bytes_read: usize) {
        if let Some(pb) = &self.bar {
            pb.set_position(bytes_read as u64);
        }
    }

    fn faulted(&mut self, error: &DumpError) {
        if let Some(pb) = &self.bar {
            pb.abandon_with_message(format!("read stopped: {}", error));
        }
    }

    fn writing(&mut self, total_bytes: usize) {
        self.replace(new_bar(total_bytes, "write"));
    }

    fn write_progress(&mut self, bytes_written: usize) {
        if let Some(pb) = &self.bar {
            pb.set_position(bytes_written as u64);
        }
    }

    fn complete(&mut self, acquisition: &Acquisition) {
        if let Some(pb) = self.bar.take() {
            let msg = if acquisition.is_complete() {
                "done"
            } else {
                "done (truncated)"
            };
            pb.finish_with_message(msg);
        }
    }
}
