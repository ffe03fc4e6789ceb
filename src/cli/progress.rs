//! Console progress display
//!
//! One byte-granular bar for the whole session. The bar is created when
//! the session reports its totals and advanced from the copy loop's chunk
//! callbacks, so it moves within large files rather than jumping per file.

use indicatif::{ProgressBar, ProgressStyle};

use crate::core::session::ProgressObserver;

/// Human-readable byte count, binary units
pub fn format_bytes(bytes: u64) -> String {
    const KIB: f64 = 1024.0;
    const MIB: f64 = KIB * 1024.0;
    const GIB: f64 = MIB * 1024.0;
    let b = bytes as f64;
    if b >= GIB {
        format!("{:.2} GB", b / GIB)
    } else if b >= MIB {
        format!("{:.1} MB", b / MIB)
    } else if b >= KIB {
        format!("{:.0} KB", b / KIB)
    } else {
        format!("{} B", bytes)
    }
}

/// Indicatif-backed observer; inert until totals are known
pub struct ConsoleProgress {
    bar: Option<ProgressBar>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self { bar: None }
    }

    /// Clear the bar so the summary prints on a clean line
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgress {
    fn planned(&mut self, total_bytes: u64, total_files: usize) {
        let bar = ProgressBar::new(total_bytes);
        bar.set_style(
            ProgressStyle::default_bar()
                .template(
                    "[{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({bytes_per_sec}, {eta}) {msg}",
                )
                .unwrap()
                .progress_chars("#>-"),
        );
        bar.set_message(format!("{} files", total_files));
        self.bar = Some(bar);
    }

    fn bytes_copied(&mut self, cumulative: u64) {
        if let Some(bar) = &self.bar {
            bar.set_position(cumulative);
        }
    }

    fn file_started(&mut self, name: &str) {
        if let Some(bar) = &self.bar {
            bar.set_message(name.to_string());
        }
    }
}
