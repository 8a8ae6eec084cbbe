//! Cold/warm query latency benchmark.
//!
//! Reads a file of query templates (one per line, `%s` standing in for the
//! table name) and spreads them over a fixed pool of worker threads. Every
//! worker owns one database connection and runs each query twice back to
//! back: the first run is the "cold" sample, the second the "warm" one.
//! Per-worker sums are folded into a shared aggregate once each worker drains
//! the queue, and the averages are reported when every worker has finished.
//!
//! Run the binary: `cargo run --release -p query-bench -- --query-file q.sql`
//! Run tests: `cargo test -p query-bench`

pub mod aggregate;
pub mod clock;
pub mod connector;
pub mod dispatcher;
pub mod report;
pub mod template;
pub mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregate::{AggregateResult, GlobalAggregate, WorkerTotals};
pub use clock::{Clock, MonotonicClock};
pub use connector::{connector_for, Connector, QueryRunner};
pub use dispatcher::{run, BenchmarkRun};
pub use template::{load_queries, parse_queries, QueryTemplate};
