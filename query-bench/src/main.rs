//! Measures the time (in milliseconds) to run SQL queries against a
//! PostgreSQL-based system such as TimescaleDB, or against a SQLite file.
//!
//! Each line of the query file is run twice back to back to get "cold" and
//! "warm" latency numbers. Queries should be of similar construction for the
//! numbers to be useful, e.g. the same aggregate over different one-hour
//! windows rather than over windows of varying length.
//!
//! Usage:
//!   query-bench --query-file=queries.sql
//!   query-bench --query-file=queries.sql --db-name=metrics --table=cpu --workers=4
//!   query-bench --query-file=queries.sql --sqlite=bench.db
//!
//! Every flag can also be set through a `TSBENCH_*` environment variable or a
//! `.env` file in the working directory.

use anyhow::{Context, Result};
use bench_core::target::{DEFAULT_DATABASE_NAME, DEFAULT_POSTGRES_CONNECT, DEFAULT_TABLE};
use bench_core::ConnectionTarget;
use clap::Parser;
use query_bench::report::print_report;
use query_bench::{connector_for, load_queries, BenchmarkRun, MonotonicClock};
use std::path::PathBuf;
use std::sync::atomic::Ordering;

#[derive(Parser, Debug)]
#[command(name = "query-bench")]
#[command(about = "Cold/warm latency of SQL queries across parallel workers", long_about = None)]
struct Cli {
    /// Postgres connection string (libpq key=value form, without dbname)
    #[arg(long, env = "TSBENCH_POSTGRES", default_value = DEFAULT_POSTGRES_CONNECT)]
    postgres: String,

    /// Name of database to connect to
    #[arg(long = "db-name", env = "TSBENCH_DB_NAME", default_value = DEFAULT_DATABASE_NAME)]
    db_name: String,

    /// Benchmark this SQLite database file instead of Postgres
    #[arg(long, env = "TSBENCH_SQLITE")]
    sqlite: Option<PathBuf>,

    /// Table name substituted for %s in every query
    #[arg(long, env = "TSBENCH_TABLE", default_value = DEFAULT_TABLE)]
    table: String,

    /// Path to file containing queries to execute, one per line
    #[arg(long = "query-file", env = "TSBENCH_QUERY_FILE")]
    query_file: PathBuf,

    /// Number of parallel workers, each with its own connection
    #[arg(long, env = "TSBENCH_WORKERS", default_value_t = 1,
          value_parser = clap::value_parser!(u32).range(1..))]
    workers: u32,

    /// Log level for stderr (error, warn, info, debug, trace)
    #[arg(long = "log-level", env = "TSBENCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also append log output to this file
    #[arg(long = "log-file", env = "TSBENCH_LOG_FILE")]
    log_file: Option<String>,
}

impl Cli {
    fn target(&self) -> ConnectionTarget {
        match &self.sqlite {
            Some(path) => ConnectionTarget::sqlite(path.clone()),
            None => ConnectionTarget::postgres(&self.postgres, &self.db_name),
        }
    }
}

fn main() -> Result<()> {
    // A missing .env is fine; only a malformed one is worth reporting.
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {e}");
        }
    }
    let cli = Cli::parse();

    let level = bench_core::parse_level(&cli.log_level)?;
    bench_core::initialize_logger(level, cli.log_file.as_deref())
        .context("Failed to initialize logger")?;

    let queries = load_queries(&cli.query_file)
        .with_context(|| format!("Failed to load {}", cli.query_file.display()))?;

    let target = cli.target();
    let connector = connector_for(&target);
    let bench = BenchmarkRun::new(cli.table.clone(), cli.workers as usize);

    let cancel = bench.cancel_handle();
    ctrlc::set_handler(move || {
        if !cancel.swap(true, Ordering::SeqCst) {
            log::warn!("Got interrupt. Stopping after in-flight queries...");
        }
    })
    .context("Failed to install Ctrl-C handler")?;

    let result = query_bench::run(&queries, &bench, connector.as_ref(), &MonotonicClock::new())
        .context("Benchmark aborted")?;

    print_report(&result);
    Ok(())
}
