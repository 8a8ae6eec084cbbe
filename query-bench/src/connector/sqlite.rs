//! SQLite backend on `rusqlite`.

use super::{Connector, QueryRunner};
use bench_core::BenchError;
use rusqlite::{Connection, OpenFlags};
use std::path::PathBuf;

pub struct SqliteConnector {
    path: PathBuf,
}

impl SqliteConnector {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

impl Connector for SqliteConnector {
    fn describe(&self) -> String {
        format!("sqlite:{}", self.path.display())
    }

    /// Opens an existing database only; a missing file is a connection error
    /// rather than a silently created empty database.
    fn connect(&self) -> Result<Box<dyn QueryRunner>, BenchError> {
        let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
            | OpenFlags::SQLITE_OPEN_URI
            | OpenFlags::SQLITE_OPEN_NO_MUTEX;
        let conn = Connection::open_with_flags(&self.path, flags)
            .map_err(|e| BenchError::connection(self.describe(), e))?;
        log::debug!("Opened {}", self.describe());
        Ok(Box::new(SqliteRunner { conn }))
    }
}

struct SqliteRunner {
    conn: Connection,
}

impl QueryRunner for SqliteRunner {
    fn execute(&mut self, sql: &str) -> Result<(), BenchError> {
        let mut stmt = self
            .conn
            .prepare(sql)
            .map_err(|e| BenchError::query(sql, e))?;
        let mut rows = stmt.query([]).map_err(|e| BenchError::query(sql, e))?;
        let mut fetched = 0usize;
        while rows
            .next()
            .map_err(|e| BenchError::query(sql, e))?
            .is_some()
        {
            fetched += 1;
        }
        log::trace!("{fetched} rows for {sql}");
        Ok(())
    }
}
