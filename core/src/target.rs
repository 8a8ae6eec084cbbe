//! Descriptors for the database a benchmark connects to.

use std::fmt;
use std::path::PathBuf;

pub const DEFAULT_POSTGRES_CONNECT: &str = "host=localhost user=postgres sslmode=disable";
pub const DEFAULT_DATABASE_NAME: &str = "benchmark";
pub const DEFAULT_TABLE: &str = "test";

/// Where each worker opens its connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionTarget {
    /// A libpq-style `key=value` connect string.
    Postgres { conninfo: String },
    /// A SQLite database file.
    Sqlite { path: PathBuf },
}

impl ConnectionTarget {
    /// Build a Postgres target from the base connect string and database name.
    ///
    /// The database name is appended as `dbname=<name>`, so a `dbname` already
    /// present in `base` is overridden.
    pub fn postgres(base: &str, database_name: &str) -> Self {
        let base = base.trim();
        let conninfo = if base.is_empty() {
            format!("dbname={database_name}")
        } else {
            format!("{base} dbname={database_name}")
        };
        ConnectionTarget::Postgres { conninfo }
    }

    pub fn sqlite(path: impl Into<PathBuf>) -> Self {
        ConnectionTarget::Sqlite { path: path.into() }
    }

    /// Printable form with any `password=` value masked, for logs and errors.
    pub fn describe(&self) -> String {
        match self {
            ConnectionTarget::Postgres { conninfo } => conninfo
                .split_whitespace()
                .map(|pair| match pair.split_once('=') {
                    Some((key, _)) if key.eq_ignore_ascii_case("password") => {
                        format!("{key}=****")
                    }
                    _ => pair.to_string(),
                })
                .collect::<Vec<_>>()
                .join(" "),
            ConnectionTarget::Sqlite { path } => format!("sqlite:{}", path.display()),
        }
    }
}

impl fmt::Display for ConnectionTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.describe())
    }
}
