//! Cumulative execution-time accounting
//!
//! Each backend owns one [`ExecutionTimer`] and charges every public
//! operation to it, whether the operation succeeds or fails.

use std::future::Future;
use std::time::{Duration, Instant};

/// Running total of wall-clock time spent in a backend
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ExecutionTimer {
    total: Duration,
}

impl ExecutionTimer {
    /// Create a timer with nothing recorded
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the time elapsed since `started`
    pub fn record(&mut self, started: Instant) {
        self.total += started.elapsed();
    }

    /// Add an already measured duration
    pub fn add(&mut self, elapsed: Duration) {
        self.total += elapsed;
    }

    /// Total recorded so far
    pub fn total(&self) -> Duration {
        self.total
    }
}

/// Await `fut` and report how long it took alongside its output
///
/// Backends use this to time an operation body and charge the elapsed time
/// afterwards, so the error path is charged exactly like the success path.
pub async fn timed<F: Future>(fut: F) -> (F::Output, Duration) {
    let started = Instant::now();
    let output = fut.await;
    (output, started.elapsed())
}
