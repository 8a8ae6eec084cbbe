//! PostgreSQL / TimescaleDB backend on the blocking `postgres` client.

use super::{Connector, QueryRunner};
use bench_core::BenchError;
use ::postgres::{Client, NoTls};

pub struct PostgresConnector {
    conninfo: String,
    description: String,
}

impl PostgresConnector {
    /// `description` is the password-masked form of `conninfo` used in logs.
    pub fn new(conninfo: String, description: String) -> Self {
        Self {
            conninfo,
            description,
        }
    }
}

impl Connector for PostgresConnector {
    fn describe(&self) -> String {
        self.description.clone()
    }

    fn connect(&self) -> Result<Box<dyn QueryRunner>, BenchError> {
        let client = Client::connect(&self.conninfo, NoTls)
            .map_err(|e| BenchError::connection(self.description.clone(), e))?;
        log::debug!("Connected to {}", self.description);
        Ok(Box::new(PostgresRunner { client }))
    }
}

struct PostgresRunner {
    client: Client,
}

impl QueryRunner for PostgresRunner {
    /// Uses the simple-query protocol: no server-side prepared statement is
    /// kept between the cold and warm runs, so both pay for parsing and
    /// planning. `simple_query` collects every row before returning.
    fn execute(&mut self, sql: &str) -> Result<(), BenchError> {
        let messages = self
            .client
            .simple_query(sql)
            .map_err(|e| BenchError::query(sql, e))?;
        log::trace!("{} messages for {sql}", messages.len());
        Ok(())
    }
}
