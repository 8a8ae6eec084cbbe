//! Delete latency benchmark.
//!
//! Removes `limit` consecutive windows of `amount` worth of data, starting at
//! `start`, and times each removal. Two strategies are compared:
//! - **drop_chunks**: TimescaleDB's `drop_chunks()` drops whole chunks older
//!   than the window end
//! - **DELETE**: a plain row-by-row `DELETE ... WHERE time` range
//!
//! Run: `cargo run --release -p delete-bench -- --amount=6h --limit=5`

pub mod duration;
pub mod plan;

pub use duration::parse_duration;
pub use plan::{parse_start, run_deletes, DeletePlan, DeleteSample, DeleteStrategy};
