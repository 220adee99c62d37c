//! ProgressReporter の実装
//!
//! - **TracingProgress**: tracing のログとして進捗を出す（CLI のデフォルト）
//! - **NoopProgress**: 何もしない（テスト・ライブラリ利用向け）

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::domain::{ItemOutcome, RunReport};
use crate::ports::ProgressReporter;

const ACTIVITY: &str = "Generating PDF thumbnails";

/// Logs progress through `tracing`.
///
/// Emits one `info` line per `every` items and one at the end.
#[derive(Debug)]
pub struct TracingProgress {
    total: AtomicUsize,
    done: AtomicUsize,
    every: usize,
}

impl TracingProgress {
    pub fn new() -> Self {
        Self::every(10)
    }

    pub fn every(every: usize) -> Self {
        Self {
            total: AtomicUsize::new(0),
            done: AtomicUsize::new(0),
            every: every.max(1),
        }
    }

    pub fn done(&self) -> usize {
        self.done.load(Ordering::Relaxed)
    }
}

impl Default for TracingProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressReporter for TracingProgress {
    fn start(&self, total: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.done.store(0, Ordering::Relaxed);
        tracing::info!(total, "{ACTIVITY}");
    }

    fn tick(&self, outcome: &ItemOutcome) {
        let done = self.done.fetch_add(1, Ordering::Relaxed) + 1;
        let total = self.total.load(Ordering::Relaxed);
        tracing::trace!(done, total, outcome = ?outcome.kind(), "tick");
        if done % self.every == 0 && done < total {
            tracing::info!(done, total, "{ACTIVITY}");
        }
    }

    fn finish(&self, report: &RunReport) {
        tracing::info!(
            done = self.done(),
            total = self.total.load(Ordering::Relaxed),
            processed = report.processed(),
            failed = report.failed(),
            "{ACTIVITY}: finished"
        );
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgress;

impl ProgressReporter for NoopProgress {
    fn start(&self, _total: usize) {}

    fn tick(&self, _outcome: &ItemOutcome) {}

    fn finish(&self, _report: &RunReport) {}
}
