// file: src/pipeline/progress.rs
// description: progress tracking and statistics reporting for pipeline execution
// reference: uses indicatif for progress bars and tracks processing metrics

use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::atomic::{AtomicUsize, Ordering};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineStats {
    pub sources_read: usize,
    pub sources_failed: usize,
    pub indicators: usize,
    pub occurrences: u64,
    pub lookups: usize,
    pub lookups_failed: usize,
    pub duration_secs: f64,
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn source_success_rate(&self) -> f64 {
        let total = self.sources_read + self.sources_failed;
        if total == 0 {
            return 0.0;
        }
        (self.sources_read as f64 / total as f64) * 100.0
    }

    pub fn lookup_success_rate(&self) -> f64 {
        if self.lookups == 0 {
            return 0.0;
        }
        ((self.lookups - self.lookups_failed) as f64 / self.lookups as f64) * 100.0
    }

    pub fn summary(&self) -> String {
        format!(
            "{} sources read ({} failed), {} distinct indicators from {} matches, {} lookups ({} failed) in {:.2}s",
            self.sources_read,
            self.sources_failed,
            self.indicators,
            self.occurrences,
            self.lookups,
            self.lookups_failed,
            self.duration_secs
        )
    }
}

/// One progress bar with success and failure counters.
pub struct ProgressTracker {
    bar: ProgressBar,
    processed: AtomicUsize,
    failed: AtomicUsize,
}

impl ProgressTracker {
    pub fn new(total: usize, label: &str) -> Self {
        Self::with_color(total, label, true)
    }

    pub fn with_color(total: usize, label: &str, colored: bool) -> Self {
        Self {
            bar: create_progress_bar(total as u64, label, colored),
            processed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
            processed: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn inc_processed(&self) {
        self.processed.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
        self.update_message();
    }

    pub fn inc_failed(&self) {
        self.failed.fetch_add(1, Ordering::SeqCst);
        self.bar.inc(1);
        self.update_message();
    }

    pub fn processed(&self) -> usize {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn failed(&self) -> usize {
        self.failed.load(Ordering::SeqCst)
    }

    pub fn finish(&self) {
        self.bar.finish_and_clear();
    }

    fn update_message(&self) {
        let failed = self.failed();
        let message = if failed > 0 {
            format!("{} failed", failed).red().to_string()
        } else {
            String::new()
        };
        self.bar.set_message(message);
    }
}

impl Drop for ProgressTracker {
    fn drop(&mut self) {
        self.finish();
    }
}

fn create_progress_bar(total: u64, label: &str, colored: bool) -> ProgressBar {
    let bar = ProgressBar::new(total);
    let template = if colored {
        "{prefix:.bold} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}"
    } else {
        "{prefix} {spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} {msg}"
    };

    match ProgressStyle::default_bar().template(template) {
        Ok(style) => bar.set_style(style.progress_chars(if colored { "█▓▒░" } else { "=>-" })),
        Err(_) => bar.set_style(ProgressStyle::default_bar()),
    }
    bar.set_prefix(label.to_string());
    bar
}
