//! Processing counters shared across the pipeline stages.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counters updated by the three stages while they run. Each counter has a
/// single writer stage; relaxed ordering is enough because the summary is
/// only read after all stages have been joined.
#[derive(Debug, Default)]
pub struct PipelineStats {
    pub lines_read: AtomicUsize,
    pub lines_ignored: AtomicUsize,
    pub parse_errors: AtomicUsize,
    pub records_completed: AtomicUsize,
    pub records_written: AtomicUsize,
    pub records_dropped: AtomicUsize,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line_read(&self) {
        self.lines_read.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_line_ignored(&self) {
        self.lines_ignored.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_parse_error(&self) {
        self.parse_errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_record_completed(&self) {
        self.records_completed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_record_written(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_record_dropped(&self) {
        self.records_dropped.fetch_add(1, Ordering::Relaxed);
    }

    /// Snapshot for the end-of-run summary.
    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            lines_read: self.lines_read.load(Ordering::Relaxed),
            lines_ignored: self.lines_ignored.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            records_completed: self.records_completed.load(Ordering::Relaxed),
            records_written: self.records_written.load(Ordering::Relaxed),
            records_dropped: self.records_dropped.load(Ordering::Relaxed),
        }
    }
}

/// Plain snapshot of the counters once the pipeline has finished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatsSummary {
    pub lines_read: usize,
    pub lines_ignored: usize,
    pub parse_errors: usize,
    pub records_completed: usize,
    pub records_written: usize,
    pub records_dropped: usize,
}

impl StatsSummary {
    pub fn format_stats(&self) -> String {
        let mut output = format!(
            "Lines processed: {} total, {} ignored; Records: {} completed, {} written",
            self.lines_read, self.lines_ignored, self.records_completed, self.records_written
        );
        if self.parse_errors > 0 {
            output.push_str(&format!(", {} parse errors", self.parse_errors));
        }
        if self.records_dropped > 0 {
            output.push_str(&format!(", {} dropped", self.records_dropped));
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_accumulate() {
        let stats = PipelineStats::new();
        stats.add_line_read();
        stats.add_line_read();
        stats.add_line_ignored();
        stats.add_record_completed();
        let summary = stats.summary();
        assert_eq!(summary.lines_read, 2);
        assert_eq!(summary.lines_ignored, 1);
        assert_eq!(summary.records_completed, 1);
        assert_eq!(summary.parse_errors, 0);
    }

    #[test]
    fn test_format_stats_hides_zero_error_counts() {
        let summary = StatsSummary {
            lines_read: 10,
            lines_ignored: 4,
            records_completed: 2,
            records_written: 2,
            ..Default::default()
        };
        let text = summary.format_stats();
        assert_eq!(
            text,
            "Lines processed: 10 total, 4 ignored; Records: 2 completed, 2 written"
        );

        let with_errors = StatsSummary {
            parse_errors: 3,
            records_dropped: 1,
            ..summary
        };
        assert!(with_errors.format_stats().ends_with("3 parse errors, 1 dropped"));
    }
}
