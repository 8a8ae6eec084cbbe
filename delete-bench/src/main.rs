//! Measures the time (in milliseconds) to delete data from:
//!   (1) TimescaleDB, using `drop_chunks()` (the default)
//!   (2) PostgreSQL, using a plain `DELETE` (`--use-drop-chunks=false`)
//!
//! Usage:
//!   delete-bench --amount=6h --limit=5
//!   delete-bench --amount=6h --limit=5 --use-drop-chunks=false
//!
//! Drops five 6-hour windows from the default database and table starting
//! at `--start`, printing each SQL statement and the milliseconds it took.

use anyhow::{Context, Result};
use bench_core::target::{DEFAULT_DATABASE_NAME, DEFAULT_POSTGRES_CONNECT, DEFAULT_TABLE};
use bench_core::ConnectionTarget;
use clap::{ArgAction, Parser};
use delete_bench::plan::DEFAULT_START;
use delete_bench::{parse_duration, parse_start, run_deletes, DeletePlan, DeleteStrategy};
use query_bench::{connector_for, Connector, MonotonicClock};

#[derive(Parser, Debug)]
#[command(name = "delete-bench")]
#[command(about = "Time to delete ranges of data with drop_chunks() or DELETE", long_about = None)]
struct Cli {
    /// Postgres connection string (libpq key=value form, without dbname)
    #[arg(long, env = "TSBENCH_POSTGRES", default_value = DEFAULT_POSTGRES_CONNECT)]
    postgres: String,

    /// Name of database to connect to
    #[arg(long = "db-name", env = "TSBENCH_DB_NAME", default_value = DEFAULT_DATABASE_NAME)]
    db_name: String,

    /// Table to remove data from
    #[arg(long, env = "TSBENCH_TABLE", default_value = DEFAULT_TABLE)]
    table: String,

    /// Use TimescaleDB's drop_chunks(). Set to false to test plain PostgreSQL
    #[arg(long = "use-drop-chunks", default_value_t = true, action = ArgAction::Set)]
    use_drop_chunks: bool,

    /// Start date to delete from, as YYYY-MM-DDThh:mm:ssZ
    #[arg(long, default_value = DEFAULT_START)]
    start: String,

    /// Amount of data to delete per statement, as a duration (e.g. 3h, 90m)
    #[arg(long, default_value = "1h")]
    amount: String,

    /// Number of times to delete --amount of data starting from --start
    #[arg(long, default_value_t = 1)]
    limit: u32,

    /// Log level for stderr (error, warn, info, debug, trace)
    #[arg(long = "log-level", env = "TSBENCH_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Also append log output to this file
    #[arg(long = "log-file", env = "TSBENCH_LOG_FILE")]
    log_file: Option<String>,
}

fn main() -> Result<()> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            eprintln!("Ignoring unreadable .env file: {e}");
        }
    }
    let cli = Cli::parse();

    let level = bench_core::parse_level(&cli.log_level)?;
    bench_core::initialize_logger(level, cli.log_file.as_deref())
        .context("Failed to initialize logger")?;

    let plan = DeletePlan {
        strategy: if cli.use_drop_chunks {
            DeleteStrategy::DropChunks
        } else {
            DeleteStrategy::Delete
        },
        table: cli.table.clone(),
        start: parse_start(&cli.start)?,
        amount: parse_duration(&cli.amount)?,
        limit: cli.limit,
    };

    let target = ConnectionTarget::postgres(&cli.postgres, &cli.db_name);
    let connector = connector_for(&target);
    let mut runner = connector.connect().context("Failed to connect")?;

    log::info!(
        "Deleting {} x {} from '{}' using {:?}",
        plan.limit,
        cli.amount,
        plan.table,
        plan.strategy
    );

    run_deletes(&plan, runner.as_mut(), &MonotonicClock::new(), |sample| {
        print!("{}\n{}ms\n\n", sample.query, sample.elapsed_ms);
    })
    .context("Delete benchmark aborted")?;

    Ok(())
}
