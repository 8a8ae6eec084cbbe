use std::error::Error as StdError;
use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Boxed driver error. Each backend has its own error type; the harness only
/// needs to carry and display them.
pub type DriverError = Box<dyn StdError + Send + Sync + 'static>;

/// Every fatal condition a benchmark run can end in.
///
/// None of these are retried. The first one raised by any worker aborts the
/// whole run and is what the caller sees.
#[derive(Debug, Error)]
pub enum BenchError {
    #[error("failed to read query file {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed query template on line {line}: {message}")]
    Format { line: usize, message: String },

    #[error("could not connect to {target}: {source}")]
    Connection {
        target: String,
        #[source]
        source: DriverError,
    },

    #[error("query failed: {query}: {source}")]
    QueryExecution {
        query: String,
        #[source]
        source: DriverError,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("run cancelled before all queries completed")]
    Cancelled,

    #[error("failed to start worker thread: {0}")]
    Spawn(#[source] io::Error),

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

impl BenchError {
    pub fn connection(target: impl Into<String>, source: impl Into<DriverError>) -> Self {
        BenchError::Connection {
            target: target.into(),
            source: source.into(),
        }
    }

    pub fn query(query: impl Into<String>, source: impl Into<DriverError>) -> Self {
        BenchError::QueryExecution {
            query: query.into(),
            source: source.into(),
        }
    }
}

/// Failures while installing the log4rs backend.
#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("cannot open log file {path}: {source}")]
    File {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("invalid logger configuration: {0}")]
    Config(String),

    #[error(transparent)]
    SetLogger(#[from] log::SetLoggerError),
}
