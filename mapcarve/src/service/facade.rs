//! High-level extraction service facade.

use crate::density::DensityGrid;
use crate::estimate::CostEstimator;
use crate::executor::{job_channel, JobContext, JobQueue, QueueError, WorkerPool};
use crate::extract::ExtractTool;
use crate::job::{CompletionRecord, Job, JobId, ProgressSnapshot};
use crate::progress::ProgressTracker;
use crate::region::Region;
use crate::service::config::ServiceConfig;
use crate::service::error::{ServiceError, SubmitError};
use crate::service::timestamp::TimestampCache;
use crate::store::ResultStore;
use serde::Deserialize;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

/// An extraction request as submitted by a caller.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitRequest {
    /// Display name for the extract.
    pub name: String,
    /// Region type discriminator (`bbox` or `geojson`).
    pub region_type: String,
    /// Raw region payload, interpreted according to `region_type`.
    pub region_data: serde_json::Value,
}

/// Result of a status query.
///
/// At most one of in-flight and complete is ever observable for an id, and
/// an admitted job is never in neither until it genuinely fails.
#[derive(Debug, Clone, PartialEq)]
pub enum JobStatus {
    /// Admitted and not finished; carries the latest progress snapshot.
    InFlight(ProgressSnapshot),
    /// Finished successfully.
    Complete(CompletionRecord),
    /// Unknown id: never admitted, or admitted and failed.
    NotFound,
}

/// Point-in-time view of engine state.
#[derive(Debug, Clone, PartialEq)]
pub struct SystemSnapshot {
    /// Jobs waiting for a worker right now.
    pub queue_depth: usize,
    /// Total queue capacity.
    pub queue_capacity: usize,
    /// Admission ceiling in cost units.
    pub cost_ceiling: u64,
    /// Cached dataset timestamp; empty until the first successful query.
    pub dataset_timestamp: String,
}

/// The assembled extraction engine.
///
/// Wires estimation, admission, the bounded queue, the worker pool, the
/// progress tracker and the result store behind one API:
///
/// - [`submit`](Self::submit) admits or rejects a request
/// - [`status`](Self::status) reports a job as in flight, complete, or
///   not found
/// - [`system_snapshot`](Self::system_snapshot) exposes load and dataset
///   freshness
///
/// Dropping the service without calling [`shutdown`](Self::shutdown) leaves
/// workers running on the runtime until it stops.
pub struct CarveService {
    estimator: CostEstimator,
    queue: JobQueue,
    ctx: Arc<JobContext>,
    workers: WorkerPool,
    timestamp: TimestampCache,
    cost_ceiling: u64,
    shutdown: CancellationToken,
}

impl CarveService {
    /// Builds the engine and spawns its workers.
    ///
    /// Must be called from within a tokio runtime. Creates the work and
    /// results directories if needed.
    pub fn new(
        config: ServiceConfig,
        tool: ExtractTool,
        grid: Arc<DensityGrid>,
    ) -> Result<Self, ServiceError> {
        std::fs::create_dir_all(&config.work_dir)?;
        let store = ResultStore::new(&config.results_dir)?
            .with_artifact_suffix(config.artifact_suffix.clone());
        let estimator = CostEstimator::new(grid)
            .with_calibration(config.calibration)
            .with_limits(config.cover_limits);

        let (queue, receiver) = job_channel(config.executor.queue_capacity);
        let ctx = Arc::new(JobContext {
            tool,
            store,
            tracker: ProgressTracker::new(),
            work_dir: config.work_dir.clone(),
        });
        let shutdown = CancellationToken::new();
        let workers = WorkerPool::spawn(
            config.executor.worker_count,
            receiver,
            Arc::clone(&ctx),
            shutdown.clone(),
        );

        info!(
            workers = workers.worker_count(),
            queue_capacity = queue.capacity(),
            cost_ceiling = config.cost_ceiling,
            results_dir = %config.results_dir.display(),
            "extraction service started"
        );

        Ok(Self {
            estimator,
            queue,
            ctx,
            workers,
            timestamp: TimestampCache::new(config.timestamp_refresh),
            cost_ceiling: config.cost_ceiling,
            shutdown,
        })
    }

    /// Admits a request as a job, or rejects it with a typed reason.
    ///
    /// Admission order: parse and validate the region, estimate its cost
    /// against the ceiling, then enqueue. The tracker entry is seeded before
    /// the enqueue so a fast worker can never observe an untracked job; a
    /// queue rejection removes the seed again.
    pub fn submit(&self, request: SubmitRequest) -> Result<JobId, SubmitError> {
        let region = Region::from_payload(&request.region_type, &request.region_data)?;

        let cost = self.estimator.estimate(&region);
        if cost > self.cost_ceiling {
            info!(
                name = %request.name,
                cost,
                ceiling = self.cost_ceiling,
                "request rejected, cost over ceiling"
            );
            return Err(SubmitError::CostExceeded {
                cost,
                ceiling: self.cost_ceiling,
            });
        }

        let job = Job::new(request.name, region);
        let id = job.id.clone();
        self.ctx.tracker.set(&id, ProgressSnapshot::default());
        if let Err(err) = self.queue.try_submit(job) {
            self.ctx.tracker.remove(&id);
            return Err(match err {
                QueueError::Full => SubmitError::QueueFull,
                QueueError::Closed => SubmitError::Stopped,
            });
        }

        info!(job = %id, cost, queue_depth = self.queue.depth(), "job admitted");
        Ok(id)
    }

    /// Reports where a job currently stands.
    ///
    /// The tracker is consulted before the store, so a job whose completion
    /// record exists but whose tracker entry is not yet retired still reads
    /// as in flight rather than surfacing both states.
    pub fn status(&self, id: &JobId) -> Result<JobStatus, ServiceError> {
        if let Some(snapshot) = self.ctx.tracker.get(id) {
            return Ok(JobStatus::InFlight(snapshot));
        }
        match self.ctx.store.read_completion(id)? {
            Some(record) => Ok(JobStatus::Complete(record)),
            None => Ok(JobStatus::NotFound),
        }
    }

    /// Jobs waiting for a worker right now.
    pub fn queue_depth(&self) -> usize {
        self.queue.depth()
    }

    /// Point-in-time system state, including the cached dataset timestamp.
    pub async fn system_snapshot(&self) -> SystemSnapshot {
        SystemSnapshot {
            queue_depth: self.queue.depth(),
            queue_capacity: self.queue.capacity(),
            cost_ceiling: self.cost_ceiling,
            dataset_timestamp: self.timestamp.get(&self.ctx.tool).await,
        }
    }

    /// The result store backing this service.
    pub fn store(&self) -> &ResultStore {
        &self.ctx.store
    }

    /// Stops accepting work and waits for workers to wind down.
    ///
    /// A worker mid-job finishes that job first; jobs still queued are
    /// dropped without a trace, matching the failed-job contract.
    pub async fn shutdown(self) {
        info!("shutting down extraction service");
        self.shutdown.cancel();
        drop(self.queue);
        self.workers.join().await;
    }
}
