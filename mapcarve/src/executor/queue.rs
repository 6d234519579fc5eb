//! Bounded job queue.
//!
//! Admitted jobs wait here for a worker. Submission is non-blocking: a full
//! queue rejects immediately, and that rejection is the engine's only
//! backpressure signal. Jobs dequeue in FIFO order.

use crate::job::Job;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

/// Submission rejections.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QueueError {
    /// The queue is at capacity; the caller should retry later.
    #[error("job queue is full")]
    Full,

    /// All workers are gone and nothing will ever dequeue.
    #[error("job queue is closed")]
    Closed,
}

/// Creates a bounded queue and the receiver its workers consume from.
pub fn job_channel(capacity: usize) -> (JobQueue, JobReceiver) {
    let capacity = capacity.max(1);
    let (sender, receiver) = mpsc::channel(capacity);
    (
        JobQueue { sender, capacity },
        JobReceiver {
            inner: Arc::new(Mutex::new(receiver)),
        },
    )
}

/// Submission side of the queue. Cloneable and cheap to share.
#[derive(Debug, Clone)]
pub struct JobQueue {
    sender: mpsc::Sender<Job>,
    capacity: usize,
}

impl JobQueue {
    /// Enqueues a job without waiting.
    pub fn try_submit(&self, job: Job) -> Result<(), QueueError> {
        self.sender.try_send(job).map_err(|err| match err {
            mpsc::error::TrySendError::Full(_) => QueueError::Full,
            mpsc::error::TrySendError::Closed(_) => QueueError::Closed,
        })
    }

    /// Number of jobs currently waiting for a worker.
    ///
    /// A job being processed no longer counts; its slot was released when a
    /// worker dequeued it.
    pub fn depth(&self) -> usize {
        self.capacity - self.sender.capacity()
    }

    /// Total queue capacity.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Dequeue side of the queue, shared by every worker.
///
/// Workers contend on an async mutex for each dequeue, so exactly one worker
/// receives any given job. The lock covers only the dequeue itself, never
/// job processing.
#[derive(Debug, Clone)]
pub struct JobReceiver {
    inner: Arc<Mutex<mpsc::Receiver<Job>>>,
}

impl JobReceiver {
    /// Receives the next job, or `None` once the queue is closed and drained.
    pub async fn recv(&self) -> Option<Job> {
        self.inner.lock().await.recv().await
    }
}
