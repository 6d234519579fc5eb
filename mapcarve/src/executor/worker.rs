//! Worker pool and the per-job extraction pipeline.
//!
//! Each worker runs one job at a time, end to end:
//!
//! 1. write the region boundary file to the work directory
//! 2. write the metadata sidecar to the result store
//! 3. spawn the extraction tool and stream its progress lines into the
//!    tracker, one whole snapshot per line
//! 4. check the tool's exit status
//! 5. move the artifact into the store and remove the boundary file
//! 6. persist the completion record, then retire the tracker entry
//!
//! Any failing step abandons the job: the tracker entry is removed, no
//! completion record is written, staged files are cleaned up best-effort,
//! and the worker moves on to the next job. A job failure never takes the
//! pool down.
//!
//! The completion record is persisted before the tracker entry is retired.
//! Status reads consult the tracker first, so no interleaving ever observes
//! a finished job as unknown.

use crate::executor::queue::JobReceiver;
use crate::extract::{ExtractError, ExtractTool};
use crate::job::{CompletionRecord, Job, JobMetadata, ProgressSnapshot};
use crate::progress::SharedProgressTracker;
use crate::region::RegionError;
use crate::store::{ResultStore, StoreError};
use std::path::PathBuf;
use std::process::ExitStatus;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Why a single job was abandoned.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("region error: {0}")]
    Region(#[from] RegionError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("extraction tool error: {0}")]
    Tool(#[from] ExtractError),

    #[error("malformed progress line {line:?}: {source}")]
    MalformedProgress {
        line: String,
        source: serde_json::Error,
    },

    #[error("extraction tool exited with {0}")]
    ToolFailed(ExitStatus),

    #[error("extraction tool stdout was not captured")]
    StdoutMissing,
}

/// Dependencies shared by every worker.
#[derive(Debug)]
pub struct JobContext {
    pub tool: ExtractTool,
    pub store: ResultStore,
    pub tracker: SharedProgressTracker,
    /// Scratch directory for boundary files and staged artifacts. Must live
    /// on the same filesystem as the store for rename-based ingest.
    pub work_dir: PathBuf,
}

/// Fixed set of workers consuming the job queue.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawns `count` workers onto the current runtime.
    pub fn spawn(
        count: usize,
        receiver: JobReceiver,
        ctx: Arc<JobContext>,
        shutdown: CancellationToken,
    ) -> Self {
        let handles = (0..count.max(1))
            .map(|worker| {
                let receiver = receiver.clone();
                let ctx = Arc::clone(&ctx);
                let shutdown = shutdown.clone();
                tokio::spawn(worker_loop(worker, receiver, ctx, shutdown))
            })
            .collect();
        Self { handles }
    }

    /// Number of workers in the pool.
    pub fn worker_count(&self) -> usize {
        self.handles.len()
    }

    /// Waits for every worker to exit.
    ///
    /// Workers exit when the shutdown token fires or the queue closes; a
    /// worker mid-job finishes that job first and dequeues nothing more.
    pub async fn join(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

async fn worker_loop(
    worker: usize,
    receiver: JobReceiver,
    ctx: Arc<JobContext>,
    shutdown: CancellationToken,
) {
    debug!(worker, "worker started");
    loop {
        // Cancellation wins over a nonempty queue once both are ready.
        let job = tokio::select! {
            biased;

            _ = shutdown.cancelled() => break,
            job = receiver.recv() => match job {
                Some(job) => job,
                None => break,
            },
        };

        let started = Instant::now();
        info!(worker, job = %job.id, name = %job.name, "starting extraction");

        match process_job(&ctx, &job, started).await {
            Ok(record) => {
                info!(
                    worker,
                    job = %job.id,
                    size_bytes = record.size_bytes,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "extraction complete"
                );
            }
            Err(err) => {
                error!(worker, job = %job.id, error = %err, "extraction failed, abandoning job");
                ctx.tracker.remove(&job.id);
                cleanup_job_files(&ctx, &job);
            }
        }
    }
    debug!(worker, "worker stopped");
}

/// Runs one job through the whole pipeline.
async fn process_job(
    ctx: &JobContext,
    job: &Job,
    started: Instant,
) -> Result<CompletionRecord, JobError> {
    let region_path = region_file_path(ctx, job);
    let staging_path = staging_artifact_path(ctx, job);

    std::fs::write(&region_path, job.region.boundary_text()?)?;
    let metadata = JobMetadata::for_job(job)?;
    ctx.store.write_metadata(&job.id, &metadata)?;

    let mut child = ctx.tool.spawn_extract(&staging_path, &region_path)?;
    let stdout = child.stdout.take().ok_or(JobError::StdoutMissing)?;
    let mut lines = BufReader::new(stdout).lines();
    while let Some(line) = lines.next_line().await? {
        let snapshot: ProgressSnapshot =
            serde_json::from_str(&line).map_err(|source| JobError::MalformedProgress {
                line: line.clone(),
                source,
            })?;
        ctx.tracker.set(&job.id, snapshot);
    }

    let status = child.wait().await?;
    if !status.success() {
        return Err(JobError::ToolFailed(status));
    }

    let size_bytes = ctx.store.ingest_artifact(&job.id, &staging_path)?;
    std::fs::remove_file(&region_path)?;

    let last = ctx.tracker.get(&job.id).unwrap_or_default();
    let record = CompletionRecord::new(last, started.elapsed(), size_bytes);
    ctx.store.write_completion(&job.id, &record)?;
    ctx.tracker.remove(&job.id);
    Ok(record)
}

/// Best-effort removal of a failed job's staged files.
fn cleanup_job_files(ctx: &JobContext, job: &Job) {
    let _ = std::fs::remove_file(region_file_path(ctx, job));
    let _ = std::fs::remove_file(staging_artifact_path(ctx, job));
}

/// Boundary file handed to the tool; the extension doubles as the format.
fn region_file_path(ctx: &JobContext, job: &Job) -> PathBuf {
    ctx.work_dir.join(format!("{}.{}", job.id, job.region.kind()))
}

/// Where the tool writes before the artifact is ingested into the store.
fn staging_artifact_path(ctx: &JobContext, job: &Job) -> PathBuf {
    ctx.work_dir
        .join(format!("{}{}", job.id, ctx.store.artifact_suffix()))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::progress::ProgressTracker;
    use crate::region::Region;
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    /// Writes an executable stand-in for the extraction tool.
    fn write_fake_tool(dir: &Path, body: &str) -> PathBuf {
        let path = dir.join("fake-extract");
        fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
        path
    }

    fn context(dir: &Path, tool_body: &str) -> JobContext {
        let work_dir = dir.join("work");
        fs::create_dir_all(&work_dir).unwrap();
        let tool = write_fake_tool(dir, tool_body);
        JobContext {
            tool: ExtractTool::new(tool, dir.join("planet.db")),
            store: ResultStore::new(dir.join("results")).unwrap(),
            tracker: ProgressTracker::new(),
            work_dir,
        }
    }

    fn bbox_job(name: &str) -> Job {
        Job::new(name, Region::bbox([0.0, 0.0, 1.0, 1.0]).unwrap())
    }

    const HAPPY_TOOL: &str = r#"out="$3"
echo '{"Timestamp":"T1","CellsTotal":2,"CellsProg":1,"NodesTotal":0,"NodesProg":0,"ElemsTotal":0,"ElemsProg":0}'
echo '{"Timestamp":"T2","CellsTotal":2,"CellsProg":2,"NodesTotal":0,"NodesProg":0,"ElemsTotal":0,"ElemsProg":0}'
printf 'artifact' > "$out""#;

    #[tokio::test]
    async fn test_process_job_happy_path() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), HAPPY_TOOL);
        let job = bbox_job("happy");

        let record = process_job(&ctx, &job, Instant::now())
            .await
            .expect("pipeline succeeds");

        assert!(record.complete);
        assert_eq!(record.size_bytes, 8);
        assert_eq!(record.progress.cells_prog, 2, "Record holds the last line");
        assert_eq!(record.progress.timestamp, "T2");

        assert!(
            ctx.tracker.get(&job.id).is_none(),
            "Tracker entry retired after completion"
        );
        let stored = ctx.store.read_completion(&job.id).unwrap().unwrap();
        assert_eq!(stored, record);
        assert_eq!(fs::read(ctx.store.artifact_path(&job.id)).unwrap(), b"artifact");
        assert!(
            !region_file_path(&ctx, &job).exists(),
            "Boundary file cleaned up after success"
        );
        assert!(ctx.store.metadata_path(&job.id).is_file());
    }

    #[tokio::test]
    async fn test_process_job_tool_failure() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(
            dir.path(),
            r#"echo '{"Timestamp":"T1","CellsTotal":2,"CellsProg":1,"NodesTotal":0,"NodesProg":0,"ElemsTotal":0,"ElemsProg":0}'
exit 3"#,
        );
        let job = bbox_job("doomed");

        let err = process_job(&ctx, &job, Instant::now())
            .await
            .expect_err("nonzero exit fails the job");
        assert!(matches!(err, JobError::ToolFailed(status) if status.code() == Some(3)));
        assert!(
            ctx.store.read_completion(&job.id).unwrap().is_none(),
            "No completion record for a failed job"
        );
    }

    #[tokio::test]
    async fn test_process_job_malformed_progress() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), "echo 'this is not json'");
        let job = bbox_job("garbled");

        let err = process_job(&ctx, &job, Instant::now())
            .await
            .expect_err("unparseable output fails the job");
        assert!(matches!(err, JobError::MalformedProgress { .. }));
    }

    #[tokio::test]
    async fn test_region_file_carries_the_kind_extension() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = context(dir.path(), HAPPY_TOOL);
        let job = bbox_job("named");

        let path = region_file_path(&ctx, &job);
        assert!(path.to_string_lossy().ends_with(&format!("{}.bbox", job.id)));
    }
}
