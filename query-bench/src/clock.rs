use std::time::{Duration, Instant};

/// Monotonic time source used to time query executions.
///
/// Returns the time elapsed since an arbitrary fixed origin. Only differences
/// between two readings are meaningful.
pub trait Clock: Send + Sync {
    fn now(&self) -> Duration;
}

/// Wall-clock implementation backed by [`Instant`].
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Elapsed time between two readings, truncated to whole milliseconds.
pub fn elapsed_ms(start: Duration, end: Duration) -> u64 {
    end.saturating_sub(start).as_millis() as u64
}
