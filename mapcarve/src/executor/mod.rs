//! Job execution pipeline
//!
//! Bounded admission queue plus a fixed worker pool, sized to the host:
//!
//! ```text
//! submit ──► JobQueue (bounded, try_send) ──► JobReceiver ──► worker 0
//!                                                        ├──► worker 1
//!                                                        └──► worker N
//!                                                              │
//!                                              region file ◄───┤
//!                                              tool spawn  ◄───┤
//!                                              progress    ◄───┤
//!                                              store write ◄───┘
//! ```
//!
//! The queue is the only buffering in the system; when it fills, submission
//! fails immediately and the caller decides what to do. Workers pull jobs
//! one at a time, so at most `worker_count` extractions run concurrently and
//! a given job is only ever owned by one worker.

mod config;
mod queue;
mod worker;

pub use config::{
    default_worker_count, ExecutorConfig, DEFAULT_QUEUE_CAPACITY, FALLBACK_WORKER_COUNT,
};
pub use queue::{job_channel, JobQueue, JobReceiver, QueueError};
pub use worker::{JobContext, JobError, WorkerPool};
