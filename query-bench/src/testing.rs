//! Deterministic stand-ins for the database and the clock, for unit tests.
//!
//! [`VirtualClock`] reads a per-thread counter that only moves when a
//! [`ScriptedConnector`] runner "executes" a query on that same thread, so
//! every measured duration is exactly the scripted cost regardless of how the
//! OS schedules the workers.

use crate::clock::Clock;
use crate::connector::{Connector, QueryRunner};
use bench_core::BenchError;
use std::cell::Cell;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

thread_local! {
    static VIRTUAL_NOW: Cell<Duration> = const { Cell::new(Duration::ZERO) };
}

fn advance(by: Duration) {
    VIRTUAL_NOW.with(|now| now.set(now.get() + by));
}

pub(crate) struct VirtualClock;

impl Clock for VirtualClock {
    fn now(&self) -> Duration {
        VIRTUAL_NOW.with(Cell::get)
    }
}

/// One scripted execution, in the order it happened on its thread.
#[derive(Debug, Clone)]
pub(crate) struct Execution {
    pub thread: ThreadId,
    pub sql: String,
    pub started: Duration,
    pub finished: Duration,
}

type CostFn = dyn Fn(&str) -> (Duration, Duration) + Send + Sync;

pub(crate) struct ScriptedConnector {
    cost: Arc<CostFn>,
    fail_connect_at: Option<usize>,
    fail_query_containing: Option<String>,
    connects: AtomicUsize,
    executions: Arc<Mutex<Vec<Execution>>>,
}

impl ScriptedConnector {
    /// Every query costs `cold` on its first run and `warm` afterwards.
    pub(crate) fn fixed(cold: Duration, warm: Duration) -> Self {
        Self::with_cost(move |_| (cold, warm))
    }

    /// `cost(sql)` returns the (cold, warm) durations for a rendered query.
    pub(crate) fn with_cost(
        cost: impl Fn(&str) -> (Duration, Duration) + Send + Sync + 'static,
    ) -> Self {
        Self {
            cost: Arc::new(cost),
            fail_connect_at: None,
            fail_query_containing: None,
            connects: AtomicUsize::new(0),
            executions: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Fail the connection attempt with this 0-based index.
    pub(crate) fn fail_connect_at(mut self, attempt: usize) -> Self {
        self.fail_connect_at = Some(attempt);
        self
    }

    pub(crate) fn fail_query_containing(mut self, needle: &str) -> Self {
        self.fail_query_containing = Some(needle.to_string());
        self
    }

    pub(crate) fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub(crate) fn executions(&self) -> Vec<Execution> {
        self.executions.lock().unwrap().clone()
    }
}

impl Connector for ScriptedConnector {
    fn describe(&self) -> String {
        "scripted".to_string()
    }

    fn connect(&self) -> Result<Box<dyn QueryRunner>, BenchError> {
        let attempt = self.connects.fetch_add(1, Ordering::SeqCst);
        if self.fail_connect_at == Some(attempt) {
            return Err(BenchError::connection("scripted", "connection refused"));
        }
        Ok(Box::new(ScriptedRunner {
            cost: Arc::clone(&self.cost),
            fail_query_containing: self.fail_query_containing.clone(),
            runs: HashMap::new(),
            executions: Arc::clone(&self.executions),
        }))
    }
}

struct ScriptedRunner {
    cost: Arc<CostFn>,
    fail_query_containing: Option<String>,
    runs: HashMap<String, u32>,
    executions: Arc<Mutex<Vec<Execution>>>,
}

impl QueryRunner for ScriptedRunner {
    fn execute(&mut self, sql: &str) -> Result<(), BenchError> {
        if let Some(needle) = &self.fail_query_containing {
            if sql.contains(needle.as_str()) {
                return Err(BenchError::query(sql, "scripted failure"));
            }
        }

        let runs = self.runs.entry(sql.to_string()).or_insert(0);
        let (cold, warm) = (self.cost)(sql);
        let took = if *runs == 0 { cold } else { warm };
        *runs += 1;

        let started = VirtualClock.now();
        advance(took);
        self.executions.lock().unwrap().push(Execution {
            thread: thread::current().id(),
            sql: sql.to_string(),
            started,
            finished: VirtualClock.now(),
        });
        Ok(())
    }
}
