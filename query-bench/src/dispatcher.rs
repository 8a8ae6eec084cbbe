//! Dispatcher: fans the query list out to a fixed pool of workers and
//! collects the run-wide aggregate.
//!
//! | Step | Dispatcher                          | Workers                            |
//! |------|-------------------------------------|------------------------------------|
//! | 1    | create channel (capacity = workers) |                                    |
//! | 2    | spawn every worker                  | connect, block on `recv`           |
//! | 3    | push templates in file order        | run each template cold then warm   |
//! | 4    | drop the sender (close)             | drain, then exit the loop          |
//! | 5    | join every worker                   | contribute totals once, exit       |
//! | 6    | freeze aggregate into the result    |                                    |
//!
//! The first fatal error raised anywhere cancels the run: the dispatcher
//! stops pushing, workers stop before their next query, and the error is
//! returned instead of a partial aggregate.

use crate::aggregate::{AggregateResult, GlobalAggregate};
use crate::clock::Clock;
use crate::connector::Connector;
use crate::template::QueryTemplate;
use crate::worker;
use bench_core::BenchError;
use crossbeam_channel::bounded;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;

/// Settings and cancellation state for one benchmark run, shared by the
/// dispatcher and every worker.
#[derive(Debug)]
pub struct BenchmarkRun {
    table: String,
    workers: usize,
    cancelled: Arc<AtomicBool>,
}

impl BenchmarkRun {
    pub fn new(table: impl Into<String>, workers: usize) -> Self {
        Self {
            table: table.into(),
            workers,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Flag that can be raised from outside the run, e.g. a Ctrl-C handler.
    pub fn cancel_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancelled)
    }
}

/// Keeps the first fatal error raised by any thread; later ones are logged
/// and dropped.
#[derive(Debug, Default)]
pub(crate) struct FirstFailure {
    slot: Mutex<Option<BenchError>>,
}

impl FirstFailure {
    pub(crate) fn record(&self, err: BenchError) {
        let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            log::debug!("Suppressed follow-up failure: {err}");
            return;
        }
        log::error!("{err}");
        *slot = Some(err);
    }

    pub(crate) fn take(self) -> Option<BenchError> {
        self.slot.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Run every query on `bench.workers()` workers and return the aggregate.
///
/// `queries` may be empty, in which case the result reports no data. Fails
/// with [`BenchError::Config`] if the worker count is zero, and otherwise with
/// the first connection, execution, or cancellation error raised during the
/// run.
pub fn run(
    queries: &[QueryTemplate],
    bench: &BenchmarkRun,
    connector: &dyn Connector,
    clock: &dyn Clock,
) -> Result<AggregateResult, BenchError> {
    let worker_count = bench.workers();
    if worker_count == 0 {
        return Err(BenchError::Config(
            "worker count must be at least 1".to_string(),
        ));
    }

    log::info!(
        "Running {} queries on {} workers against {} (table '{}')",
        queries.len(),
        worker_count,
        connector.describe(),
        bench.table()
    );

    let started = Instant::now();
    let aggregate = GlobalAggregate::new();
    let failure = FirstFailure::default();

    thread::scope(|scope| {
        // Capacity only bounds memory; any positive value is correct.
        let (tx, rx) = bounded::<&QueryTemplate>(worker_count);

        // Start every worker before the first push so none of them misses
        // the head of the queue while still connecting.
        let mut handles = Vec::with_capacity(worker_count);
        for id in 0..worker_count {
            let jobs = rx.clone();
            let aggregate = &aggregate;
            let failure = &failure;
            let spawned = thread::Builder::new()
                .name(format!("bench-worker-{id}"))
                .spawn_scoped(scope, move || {
                    worker::worker_main(id, jobs, bench, connector, clock, aggregate, failure)
                });
            match spawned {
                Ok(handle) => handles.push((id, handle)),
                Err(e) => {
                    failure.record(BenchError::Spawn(e));
                    bench.cancel();
                    break;
                }
            }
        }
        drop(rx);

        for query in queries {
            if bench.is_cancelled() {
                break;
            }
            // Fails only once every worker has exited.
            if tx.send(query).is_err() {
                break;
            }
        }
        drop(tx);

        for (id, handle) in handles {
            if handle.join().is_err() {
                failure.record(BenchError::WorkerPanicked(id));
                bench.cancel();
            }
        }
    });

    if let Some(err) = failure.take() {
        return Err(err);
    }
    if bench.is_cancelled() {
        return Err(BenchError::Cancelled);
    }

    let result = aggregate.into_result();
    log::info!(
        "Completed {} queries in {:.2?}",
        result.count,
        started.elapsed()
    );
    Ok(result)
}
