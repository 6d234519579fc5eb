//! Executor configuration.

use std::thread;

/// Default bound on queued jobs awaiting a worker.
pub const DEFAULT_QUEUE_CAPACITY: usize = 512;

/// Worker count used when CPU detection fails.
pub const FALLBACK_WORKER_COUNT: usize = 4;

/// Detects the host's available parallelism.
///
/// Detection can fail on exotic platforms or restricted environments; the
/// fallback keeps the pool functional there.
pub fn default_worker_count() -> usize {
    thread::available_parallelism()
        .map(|count| count.get())
        .unwrap_or(FALLBACK_WORKER_COUNT)
}

/// Sizing of the queue and worker pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecutorConfig {
    /// Maximum number of admitted jobs waiting for a worker.
    pub queue_capacity: usize,
    /// Number of concurrently running extractions.
    pub worker_count: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            worker_count: default_worker_count(),
        }
    }
}

impl ExecutorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the queue capacity; a minimum of 1 is enforced.
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    /// Sets the worker count; a minimum of 1 is enforced.
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count.max(1);
        self
    }
}
