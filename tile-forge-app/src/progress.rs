// tile-forge-app/src/progress.rs

use anyhow::Result;
use std::time::{Duration, Instant};
use wfc_core::{CollapseObserver, GenerationStats, WfcError};

/// Trait for reporting the progress of a generation run.
pub trait ProgressReporter: Send {
    /// Called after every collapse with the running count.
    ///
    /// # Returns
    ///
    /// * `Ok(())` if reporting was successful.
    /// * `Err(anyhow::Error)` if an error occurred during reporting.
    fn report(&mut self, collapsed_cells: usize, total_cells: usize) -> Result<()>;

    /// Called when the generation completes successfully.
    fn finish(&mut self, stats: &GenerationStats) -> Result<()>;

    /// Called when the generation fails with an error.
    fn fail(&mut self, error: &WfcError) -> Result<()>;
}

/// A `ProgressReporter` that outputs status updates through the log.
pub struct ConsoleProgressReporter {
    start_time: Instant,
    last_report_time: Instant,
    report_interval: Duration,
    total_cells: usize,
    collapsed_cells: usize,
    reports: usize,
}

impl ConsoleProgressReporter {
    /// Creates a reporter for a grid of `total_cells` cells.
    ///
    /// At most one line is logged per `report_interval`.
    pub fn new(report_interval: Duration, total_cells: usize) -> Self {
        let now = Instant::now();
        Self {
            start_time: now,
            last_report_time: now,
            report_interval,
            total_cells,
            collapsed_cells: 0,
            reports: 0,
        }
    }

    /// Number of progress lines emitted so far.
    pub fn reports(&self) -> usize {
        self.reports
    }

    pub fn collapsed_cells(&self) -> usize {
        self.collapsed_cells
    }

    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs();
        let millis = duration.subsec_millis();
        format!("{secs}.{millis:03}s")
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn report(&mut self, collapsed_cells: usize, total_cells: usize) -> Result<()> {
        let now = Instant::now();
        if now.duration_since(self.last_report_time) >= self.report_interval {
            let percentage = if total_cells > 0 {
                (collapsed_cells as f64 / total_cells as f64) * 100.0
            } else {
                100.0
            };
            log::info!(
                "Progress: Collapsed {}/{} ({:.1}%) | Elapsed: {}",
                collapsed_cells,
                total_cells,
                percentage,
                Self::format_duration(self.start_time.elapsed())
            );
            self.last_report_time = now;
            self.reports += 1;
        }
        Ok(())
    }

    fn finish(&mut self, stats: &GenerationStats) -> Result<()> {
        log::info!(
            "Generation finished: {} cells in {} attempt(s), {} narrowed. Total time: {}",
            stats.collapses,
            stats.attempts,
            stats.narrowed,
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }

    fn fail(&mut self, error: &WfcError) -> Result<()> {
        log::error!(
            "Generation failed: {}. Total time: {}",
            error,
            Self::format_duration(self.start_time.elapsed())
        );
        Ok(())
    }
}

impl CollapseObserver for ConsoleProgressReporter {
    fn on_cell_collapsed(&mut self, _pos: usize, _variant: &str) {
        self.collapsed_cells += 1;
        if let Err(e) = self.report(self.collapsed_cells, self.total_cells) {
            log::warn!("Failed to report progress: {}", e);
        }
    }

    fn on_reset(&mut self) {
        if self.collapsed_cells > 0 {
            log::debug!("Progress reset after {} collapses", self.collapsed_cells);
        }
        self.collapsed_cells = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_console_reporter_basic_flow() {
        let mut reporter = ConsoleProgressReporter::new(Duration::from_millis(50), 100);
        assert!(reporter.report(50, 100).is_ok());
        // Throttled: the interval has not elapsed since creation.
        assert_eq!(reporter.reports(), 0);

        thread::sleep(Duration::from_millis(60));
        assert!(reporter.report(55, 100).is_ok());
        assert_eq!(reporter.reports(), 1);

        assert!(reporter.report(56, 100).is_ok());
        assert_eq!(reporter.reports(), 1);
    }

    #[test]
    fn test_console_reporter_zero_cells() {
        let mut reporter = ConsoleProgressReporter::new(Duration::ZERO, 0);
        assert!(reporter.report(0, 0).is_ok());
        assert_eq!(reporter.reports(), 1);
    }

    #[test]
    fn test_observer_counts_and_resets() {
        let mut reporter = ConsoleProgressReporter::new(Duration::ZERO, 4);
        reporter.on_cell_collapsed(0, "0_0");
        reporter.on_cell_collapsed(3, "4_0");
        assert_eq!(reporter.collapsed_cells(), 2);
        assert_eq!(reporter.reports(), 2);

        reporter.on_reset();
        assert_eq!(reporter.collapsed_cells(), 0);
    }

    #[test]
    fn test_finish_and_fail() {
        let mut reporter = ConsoleProgressReporter::new(Duration::ZERO, 1);
        let stats = GenerationStats {
            collapses: 1,
            narrowed: 0,
            attempts: 1,
            elapsed: Duration::from_millis(3),
        };
        assert!(reporter.finish(&stats).is_ok());
        let error = WfcError::Contradiction { pos: 0, x: 0, y: 0 };
        assert!(reporter.fail(&error).is_ok());
    }
}
