//! Per-worker and run-wide latency totals.

use std::sync::{Mutex, PoisonError};

/// Running sums kept privately by one worker.
///
/// Durations are whole milliseconds, each sample truncated before it is added.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WorkerTotals {
    pub sum_cold_ms: u64,
    pub sum_warm_ms: u64,
    pub count: u64,
}

impl WorkerTotals {
    /// Add one query's cold and warm samples.
    pub fn record(&mut self, cold_ms: u64, warm_ms: u64) {
        self.sum_cold_ms += cold_ms;
        self.sum_warm_ms += warm_ms;
        self.count += 1;
    }

    pub fn merge(&mut self, other: &WorkerTotals) {
        self.sum_cold_ms += other.sum_cold_ms;
        self.sum_warm_ms += other.sum_warm_ms;
        self.count += other.count;
    }
}

/// Run-wide totals shared by every worker.
///
/// Contributions always update all three fields together, so one mutex
/// guards the whole triple. The aggregate is consumed by
/// [`GlobalAggregate::into_result`] once every worker has been joined, which
/// makes it impossible to read a partially accumulated value.
#[derive(Debug, Default)]
pub struct GlobalAggregate {
    totals: Mutex<WorkerTotals>,
}

impl GlobalAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one worker's final totals in. Safe to call from any thread.
    pub fn add_totals(&self, totals: WorkerTotals) {
        let mut guard = self.totals.lock().unwrap_or_else(PoisonError::into_inner);
        guard.merge(&totals);
    }

    /// Freeze the aggregate into the reported result.
    pub fn into_result(self) -> AggregateResult {
        let totals = self
            .totals
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        AggregateResult {
            total_cold_ms: totals.sum_cold_ms,
            total_warm_ms: totals.sum_warm_ms,
            count: totals.count,
        }
    }
}

/// Final outcome of a run, handed to the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateResult {
    pub total_cold_ms: u64,
    pub total_warm_ms: u64,
    pub count: u64,
}

impl AggregateResult {
    /// True when no query was run and there is nothing to average.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Mean cold latency in milliseconds, or `None` if no query was run.
    pub fn cold_avg_ms(&self) -> Option<f64> {
        self.average(self.total_cold_ms)
    }

    /// Mean warm latency in milliseconds, or `None` if no query was run.
    pub fn warm_avg_ms(&self) -> Option<f64> {
        self.average(self.total_warm_ms)
    }

    fn average(&self, total: u64) -> Option<f64> {
        if self.count == 0 {
            return None;
        }
        Some(total as f64 / self.count as f64)
    }
}
