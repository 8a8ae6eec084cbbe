use bench_core::BenchError;
use chrono::{DateTime, NaiveDateTime, TimeDelta, Utc};
use query_bench::clock::elapsed_ms;
use query_bench::{Clock, QueryRunner};

/// Timestamp format for `--start` and for the generated SQL.
pub const TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%SZ";

pub const DEFAULT_START: &str = "2016-01-01T00:00:00Z";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteStrategy {
    /// `SELECT drop_chunks(<window end>, <table>)`
    DropChunks,
    /// `DELETE FROM <table> WHERE time >= <start> AND time < <end>`
    Delete,
}

/// Parse a `YYYY-MM-DDThh:mm:ssZ` timestamp.
pub fn parse_start(input: &str) -> Result<DateTime<Utc>, BenchError> {
    NaiveDateTime::parse_from_str(input.trim(), TIME_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|e| {
            BenchError::Config(format!(
                "could not parse start date '{input}' (use YYYY-MM-DDThh:mm:ssZ): {e}"
            ))
        })
}

/// The sequence of deletes to time.
#[derive(Debug, Clone)]
pub struct DeletePlan {
    pub strategy: DeleteStrategy,
    pub table: String,
    pub start: DateTime<Utc>,
    pub amount: TimeDelta,
    pub limit: u32,
}

impl DeletePlan {
    /// Build the statements for every window, oldest first.
    ///
    /// Window `i` covers `[start + i*amount, start + (i+1)*amount)`.
    pub fn queries(&self) -> Result<Vec<String>, BenchError> {
        if self.amount <= TimeDelta::zero() {
            return Err(BenchError::Config(
                "amount must be a positive duration".to_string(),
            ));
        }

        let mut queries = Vec::with_capacity(self.limit as usize);
        let mut window_start = self.start;
        for _ in 0..self.limit {
            let window_end = window_start
                .checked_add_signed(self.amount)
                .ok_or_else(|| BenchError::Config("delete window overflows".to_string()))?;
            queries.push(self.query_for(window_start, window_end));
            window_start = window_end;
        }
        Ok(queries)
    }

    fn query_for(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> String {
        match self.strategy {
            DeleteStrategy::DropChunks => format!(
                "SELECT drop_chunks('{}'::TIMESTAMPTZ, '{}')",
                end.format(TIME_FORMAT),
                self.table
            ),
            DeleteStrategy::Delete => format!(
                "DELETE FROM \"{}\" WHERE time >= '{}' AND time < '{}'",
                self.table,
                start.format(TIME_FORMAT),
                end.format(TIME_FORMAT)
            ),
        }
    }
}

/// One timed delete.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteSample {
    pub query: String,
    pub elapsed_ms: u64,
}

/// Execute every statement of `plan` in order on one connection.
///
/// `on_sample` is called right after each delete so progress can be printed
/// while the run continues. The first failing statement aborts the run.
pub fn run_deletes(
    plan: &DeletePlan,
    runner: &mut dyn QueryRunner,
    clock: &dyn Clock,
    mut on_sample: impl FnMut(&DeleteSample),
) -> Result<Vec<DeleteSample>, BenchError> {
    let queries = plan.queries()?;
    let mut samples = Vec::with_capacity(queries.len());

    for query in queries {
        let start = clock.now();
        runner.execute(&query)?;
        let sample = DeleteSample {
            elapsed_ms: elapsed_ms(start, clock.now()),
            query,
        };
        on_sample(&sample);
        samples.push(sample);
    }

    Ok(samples)
}
