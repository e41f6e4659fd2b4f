//! Download state tracking.

use std::path::PathBuf;

/// How a batch job ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchStatus {
    /// The output file was written.
    Saved {
        pages: usize,
        /// Animated images left out of the file.
        skipped_animated: usize,
    },
    /// The output file already existed and skip-existing was on.
    Skipped,
    /// The batch failed; the message says why.
    Failed(String),
}

/// Result of one batch job, reported back to the series pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub min_episode: u32,
    pub max_episode: u32,
    pub path: PathBuf,
    pub status: BatchStatus,
}

impl BatchReport {
    /// Whether the batch's episodes are on disk, written now or earlier.
    pub fn is_complete(&self) -> bool {
        !matches!(self.status, BatchStatus::Failed(_))
    }
}

/// Per-series download state.
#[derive(Debug, Default)]
pub struct SeriesState {
    pub series_name: String,
    pub lang: String,
    pub reports: Vec<BatchReport>,
}

impl SeriesState {
    /// Create a new download state for a series.
    pub fn new(series_name: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            series_name: series_name.into(),
            lang: lang.into(),
            reports: Vec::new(),
        }
    }

    /// Record a finished batch job.
    pub fn record(&mut self, report: BatchReport) {
        self.reports.push(report);
    }

    pub fn saved_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| matches!(r.status, BatchStatus::Saved { .. }))
            .count()
    }

    pub fn skipped_count(&self) -> usize {
        self.reports
            .iter()
            .filter(|r| r.status == BatchStatus::Skipped)
            .count()
    }

    pub fn failed_count(&self) -> usize {
        self.reports.iter().filter(|r| !r.is_complete()).count()
    }

    /// Pages written across every saved batch.
    pub fn pages_written(&self) -> usize {
        self.reports
            .iter()
            .map(|r| match r.status {
                BatchStatus::Saved { pages, .. } => pages,
                _ => 0,
            })
            .sum()
    }

    /// Animated images left out across every saved batch.
    pub fn animated_skipped(&self) -> usize {
        self.reports
            .iter()
            .map(|r| match r.status {
                BatchStatus::Saved {
                    skipped_animated, ..
                } => skipped_animated,
                _ => 0,
            })
            .sum()
    }

    /// Whether at least one batch ran and none of them completed.
    pub fn all_failed(&self) -> bool {
        !self.reports.is_empty() && self.reports.iter().all(|r| !r.is_complete())
    }

    /// Highest episode of the longest run of complete batches, in episode
    /// order, starting at the first batch.
    ///
    /// A failed batch caps the value even when later batches succeeded, so
    /// resuming from it never leaves a gap.
    pub fn last_completed_episode(&self) -> Option<u32> {
        let mut ordered: Vec<&BatchReport> = self.reports.iter().collect();
        ordered.sort_by_key(|r| r.min_episode);

        ordered
            .into_iter()
            .take_while(|r| r.is_complete())
            .map(|r| r.max_episode)
            .max()
    }
}

/// Global statistics across all series.
#[derive(Debug, Default)]
pub struct GlobalState {
    pub batches_saved: u64,
    pub batches_skipped: u64,
    pub batches_failed: u64,
    pub pages_written: u64,
    pub animated_skipped: u64,
    pub series_attempted: u64,
    pub series_processed: u64,
    pub series_up_to_date: u64,
    pub series_failed: u64,
}

impl GlobalState {
    /// Add statistics from a series' download state.
    pub fn add_series_stats(&mut self, state: &SeriesState) {
        self.batches_saved += state.saved_count() as u64;
        self.batches_skipped += state.skipped_count() as u64;
        self.batches_failed += state.failed_count() as u64;
        self.pages_written += state.pages_written() as u64;
        self.animated_skipped += state.animated_skipped() as u64;
        self.series_attempted += 1;
        self.series_processed += 1;
        if state.all_failed() {
            self.series_failed += 1;
        }
    }

    /// Mark a series as failed before any batch ran.
    pub fn mark_series_failed(&mut self) {
        self.series_attempted += 1;
        self.series_failed += 1;
    }

    /// Mark a series that had no new episodes.
    pub fn mark_series_up_to_date(&mut self) {
        self.series_up_to_date += 1;
    }

    /// Whether at least one series was attempted and every one failed.
    ///
    /// Series that were already up to date are not attempts.
    pub fn all_failed(&self) -> bool {
        self.series_attempted > 0 && self.series_failed == self.series_attempted
    }
}
