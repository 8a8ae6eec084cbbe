//! Worker side of a run: drain the shared channel on a private connection.

use crate::aggregate::{GlobalAggregate, WorkerTotals};
use crate::clock::{elapsed_ms, Clock};
use crate::connector::{Connector, QueryRunner};
use crate::dispatcher::{BenchmarkRun, FirstFailure};
use crate::template::QueryTemplate;
use bench_core::BenchError;
use crossbeam_channel::Receiver;

/// Pull templates until the channel is closed and drained, running each one
/// twice on `runner`.
///
/// The first execution is the cold sample and the second, on the identical
/// rendered string, the warm one. Nothing else runs on this connection in
/// between. Any execution error aborts the worker without recording the
/// failed query. The worker also stops before its next query once the run
/// is cancelled.
pub fn run_worker(
    jobs: &Receiver<&QueryTemplate>,
    bench: &BenchmarkRun,
    runner: &mut dyn QueryRunner,
    clock: &dyn Clock,
) -> Result<WorkerTotals, BenchError> {
    let mut totals = WorkerTotals::default();

    loop {
        if bench.is_cancelled() {
            return Err(BenchError::Cancelled);
        }
        let Ok(template) = jobs.recv() else {
            break;
        };

        let sql = template.render(bench.table());
        let cold_ms = timed_execute(runner, clock, &sql)?;
        let warm_ms = timed_execute(runner, clock, &sql)?;
        log::trace!(
            "line {}: cold {cold_ms}ms, warm {warm_ms}ms",
            template.line()
        );
        totals.record(cold_ms, warm_ms);
    }

    // A closed channel is also how a cancelled dispatcher stops its workers.
    if bench.is_cancelled() {
        return Err(BenchError::Cancelled);
    }
    Ok(totals)
}

fn timed_execute(
    runner: &mut dyn QueryRunner,
    clock: &dyn Clock,
    sql: &str,
) -> Result<u64, BenchError> {
    let start = clock.now();
    runner.execute(sql)?;
    Ok(elapsed_ms(start, clock.now()))
}

/// Thread entry point for one worker.
///
/// Opens the worker's connection, drains the channel, then contributes its
/// totals to `aggregate` exactly once. On failure nothing is contributed:
/// the error is recorded and the whole run is cancelled.
pub(crate) fn worker_main(
    id: usize,
    jobs: Receiver<&QueryTemplate>,
    bench: &BenchmarkRun,
    connector: &dyn Connector,
    clock: &dyn Clock,
    aggregate: &GlobalAggregate,
    failure: &FirstFailure,
) {
    log::debug!("Worker {id} connecting to {}", connector.describe());

    let outcome = connector
        .connect()
        .and_then(|mut runner| run_worker(&jobs, bench, runner.as_mut(), clock));
    drop(jobs);

    match outcome {
        Ok(totals) => {
            log::debug!(
                "Worker {id} done: {} queries, cold {}ms, warm {}ms",
                totals.count,
                totals.sum_cold_ms,
                totals.sum_warm_ms
            );
            aggregate.add_totals(totals);
        }
        Err(err) => {
            failure.record(err);
            bench.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::template::parse_queries;
    use crate::testing::{ScriptedConnector, VirtualClock};
    use crossbeam_channel::bounded;
    use std::time::Duration;

    fn templates(n: usize) -> Vec<QueryTemplate> {
        let text: String = (0..n).map(|i| format!("SELECT {i} FROM %s\n")).collect();
        parse_queries(&text).unwrap()
    }

    #[test]
    fn drains_closed_channel_and_sums() {
        let queries = templates(3);
        let (tx, rx) = bounded(queries.len());
        for q in &queries {
            tx.send(q).unwrap();
        }
        drop(tx);

        let connector = ScriptedConnector::fixed(Duration::from_millis(10), Duration::from_millis(4));
        let mut runner = connector.connect().unwrap();
        let bench = BenchmarkRun::new("cpu", 1);

        let totals = run_worker(&rx, &bench, runner.as_mut(), &VirtualClock).unwrap();
        assert_eq!(
            totals,
            WorkerTotals {
                sum_cold_ms: 30,
                sum_warm_ms: 12,
                count: 3
            }
        );

        let sql: Vec<String> = connector.executions().into_iter().map(|e| e.sql).collect();
        assert_eq!(
            sql,
            vec![
                "SELECT 0 FROM cpu",
                "SELECT 0 FROM cpu",
                "SELECT 1 FROM cpu",
                "SELECT 1 FROM cpu",
                "SELECT 2 FROM cpu",
                "SELECT 2 FROM cpu",
            ]
        );
    }

    #[test]
    fn sub_millisecond_samples_truncate_to_zero() {
        let queries = templates(2);
        let (tx, rx) = bounded(2);
        for q in &queries {
            tx.send(q).unwrap();
        }
        drop(tx);

        let connector =
            ScriptedConnector::fixed(Duration::from_micros(1_900), Duration::from_micros(900));
        let mut runner = connector.connect().unwrap();
        let bench = BenchmarkRun::new("t", 1);

        let totals = run_worker(&rx, &bench, runner.as_mut(), &VirtualClock).unwrap();
        assert_eq!(totals.sum_cold_ms, 2);
        assert_eq!(totals.sum_warm_ms, 0);
        assert_eq!(totals.count, 2);
    }

    #[test]
    fn empty_closed_channel_yields_zero_totals() {
        let (tx, rx) = bounded::<&QueryTemplate>(1);
        drop(tx);

        let connector = ScriptedConnector::fixed(Duration::from_millis(1), Duration::from_millis(1));
        let mut runner = connector.connect().unwrap();
        let bench = BenchmarkRun::new("t", 1);

        let totals = run_worker(&rx, &bench, runner.as_mut(), &VirtualClock).unwrap();
        assert_eq!(totals, WorkerTotals::default());
        assert!(connector.executions().is_empty());
    }

    #[test]
    fn execution_error_aborts_without_recording() {
        let text = "SELECT 1 FROM %s\nSELECT boom FROM %s\nSELECT 3 FROM %s\n";
        let queries = parse_queries(text).unwrap();
        let (tx, rx) = bounded(queries.len());
        for q in &queries {
            tx.send(q).unwrap();
        }
        drop(tx);

        let connector = ScriptedConnector::fixed(Duration::from_millis(5), Duration::from_millis(1))
            .fail_query_containing("boom");
        let mut runner = connector.connect().unwrap();
        let bench = BenchmarkRun::new("t", 1);

        let err = run_worker(&rx, &bench, runner.as_mut(), &VirtualClock).unwrap_err();
        assert!(matches!(err, BenchError::QueryExecution { .. }));
        // Only the first query ran to completion; the third was never pulled.
        assert_eq!(connector.executions().len(), 2);
    }

    #[test]
    fn cancelled_run_stops_before_next_query() {
        let queries = templates(2);
        let (tx, rx) = bounded(2);
        for q in &queries {
            tx.send(q).unwrap();
        }
        drop(tx);

        let connector = ScriptedConnector::fixed(Duration::from_millis(1), Duration::from_millis(1));
        let mut runner = connector.connect().unwrap();
        let bench = BenchmarkRun::new("t", 1);
        bench.cancel();

        let err = run_worker(&rx, &bench, runner.as_mut(), &VirtualClock).unwrap_err();
        assert!(matches!(err, BenchError::Cancelled));
        assert!(connector.executions().is_empty());
    }
}
