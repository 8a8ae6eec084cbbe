//! Connection provisioning and the common `Connector` / `QueryRunner` traits.
//!
//! Two implementations are provided:
//! - [`postgres::PostgresConnector`] — PostgreSQL and TimescaleDB
//! - [`sqlite::SqliteConnector`] — a SQLite database file

pub mod postgres;
pub mod sqlite;

use bench_core::{BenchError, ConnectionTarget};

/// Opens one database handle per worker.
///
/// Shared by reference between all worker threads, hence `Sync`. Each call to
/// [`Connector::connect`] must return a fresh, independent connection; handles
/// are never pooled or shared between workers.
pub trait Connector: Sync {
    /// Printable description of the target for logs.
    fn describe(&self) -> String;

    /// Open a new connection. Called synchronously on the worker's own thread
    /// before it starts pulling work.
    fn connect(&self) -> Result<Box<dyn QueryRunner>, BenchError>;
}

/// A live connection owned by exactly one worker.
pub trait QueryRunner {
    /// Execute `sql`, retrieve every result row and release the result set
    /// before returning. The caller times this call, so implementations must
    /// not return early with rows still pending.
    fn execute(&mut self, sql: &str) -> Result<(), BenchError>;
}

/// Pick the connector implementation for `target`.
pub fn connector_for(target: &ConnectionTarget) -> Box<dyn Connector> {
    match target {
        ConnectionTarget::Postgres { conninfo } => {
            Box::new(postgres::PostgresConnector::new(conninfo.clone(), target.describe()))
        }
        ConnectionTarget::Sqlite { path } => Box::new(sqlite::SqliteConnector::new(path.clone())),
    }
}
