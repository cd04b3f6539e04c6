//! Progress reporting for scans
//!
//! Provides a live spinner fed by job statistics, plus the header and
//! summary printed around each scanned root.

use crate::walker::JobStats;
use console::style;
use humansize::{format_size, BINARY};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::time::Duration;

/// Minimum interval between spinner message refreshes
const REFRESH_INTERVAL: Duration = Duration::from_millis(100);

/// Spinner that displays scan status
pub struct ProgressReporter {
    bar: ProgressBar,
    last_refresh: Option<std::time::Instant>,
}

impl ProgressReporter {
    /// Create a new progress reporter
    pub fn new() -> Self {
        let bar = ProgressBar::new_spinner();

        // Fall back to the default style if the template is rejected
        if let Ok(spinner) = ProgressStyle::default_spinner()
            .template("{spinner:.green} [{elapsed_precise}] {msg}")
        {
            bar.set_style(spinner.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
        }

        bar.enable_steady_tick(REFRESH_INTERVAL);

        Self {
            bar,
            last_refresh: None,
        }
    }

    /// Hidden reporter, for quiet mode
    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            last_refresh: None,
        }
    }

    /// Update the progress display (rate limited)
    pub fn update(&mut self, stats: &JobStats) {
        let now = std::time::Instant::now();
        if let Some(last) = self.last_refresh {
            if now.duration_since(last) < REFRESH_INTERVAL {
                return;
            }
        }
        self.last_refresh = Some(now);
        self.bar.set_message(status_line(stats));
    }

    /// Print a line above the spinner
    pub fn println(&self, line: impl AsRef<str>) {
        if self.bar.is_hidden() {
            println!("{}", line.as_ref());
        } else {
            self.bar.println(line.as_ref());
        }
    }

    /// Finish and clear the progress display
    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }
}

impl Default for ProgressReporter {
    fn default() -> Self {
        Self::new()
    }
}

fn status_line(stats: &JobStats) -> String {
    format!(
        "Scanned: {} | Skipped: {} | Read: {} | Errors: {} | Rate: {}/s",
        format_number(stats.scanned),
        format_number(stats.skipped),
        format_size(stats.total_bytes, BINARY),
        format_number(stats.errors),
        format_size(stats.bytes_per_second() as u64, BINARY),
    )
}

/// Format a number with thousands separators
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let bytes: Vec<_> = s.bytes().rev().collect();

    let chunks: Vec<String> = bytes
        .chunks(3)
        .map(|chunk| chunk.iter().rev().map(|&b| b as char).collect::<String>())
        .collect();

    chunks.into_iter().rev().collect::<Vec<_>>().join(",")
}

/// Print the root being scanned
pub fn print_header(root: &Path) {
    let shown = std::fs::canonicalize(root).unwrap_or_else(|_| root.to_path_buf());
    println!("{}", style(format!("----{}----", shown.display())).cyan().bold());
}

/// Print a summary of one scan
pub fn print_summary(stats: &JobStats, execution: Duration, interrupted: bool) {
    let title = if interrupted {
        style("Scan Interrupted").yellow().bold()
    } else {
        style("Scan Complete").green().bold()
    };

    println!("{}", title);
    println!("{}", style("─".repeat(50)).dim());
    println!("  {} {}", style("Scanned:").bold(), format_number(stats.scanned));
    println!("  {} {}", style("Read:").bold(), format_number(stats.read));
    println!("  {} {}", style("Skipped:").bold(), format_number(stats.skipped));
    println!(
        "  {} {}",
        style("Total Size:").bold(),
        format_size(stats.total_bytes, BINARY)
    );
    println!(
        "  {} {:.3}s ({}/s, {:?} mean per file)",
        style("Read Time:").bold(),
        stats.elapsed_read.as_secs_f64(),
        format_size(stats.bytes_per_second() as u64, BINARY),
        stats.mean_read_time()
    );
    println!(
        "  {} {:.1}s",
        style("Execution:").bold(),
        execution.as_secs_f64()
    );
    if stats.errors > 0 {
        println!(
            "  {} {}",
            style("Errors:").yellow().bold(),
            format_number(stats.errors)
        );
    }
    println!("{}", style(format!("----{}----", stats)).dim());
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0), "0");
        assert_eq!(format_number(999), "999");
        assert_eq!(format_number(1000), "1,000");
        assert_eq!(format_number(1234567), "1,234,567");
    }

    #[test]
    fn test_status_line() {
        let stats = JobStats {
            scanned: 1200,
            skipped: 3,
            errors: 1,
            ..Default::default()
        };
        let line = status_line(&stats);
        assert!(line.starts_with("Scanned: 1,200 | Skipped: 3 |"));
        assert!(line.contains("Errors: 1"));
    }

    #[test]
    fn test_hidden_reporter_rate_limits() {
        let mut reporter = ProgressReporter::hidden();
        reporter.update(&JobStats::default());
        let first = reporter.last_refresh;
        reporter.update(&JobStats::default());
        assert_eq!(reporter.last_refresh, first);
        reporter.finish_and_clear();
    }
}
