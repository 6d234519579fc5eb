//! Run command - boot the engine and drive region files to completion.

use clap::Args;
use mapcarve::density::DensityGrid;
use mapcarve::executor::{default_worker_count, ExecutorConfig};
use mapcarve::extract::ExtractTool;
use mapcarve::job::{JobId, ProgressSnapshot};
use mapcarve::logging::init_logging;
use mapcarve::service::{CarveService, JobStatus, ServiceConfig, SubmitRequest};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use super::common::{cover_limits, load_config, load_grid, load_region, region_name};
use crate::error::CliError;

/// Arguments for the run command.
#[derive(Args)]
pub struct RunArgs {
    /// Region files to extract, in submission order
    #[arg(required = true)]
    pub regions: Vec<PathBuf>,

    /// Config file path (defaults to ~/.mapcarve/config.ini)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Poll interval for progress output, in milliseconds
    #[arg(long, default_value = "500")]
    pub poll_interval_ms: u64,
}

/// Run the run command.
pub fn run(args: RunArgs) -> Result<(), CliError> {
    let config = load_config(args.config.as_deref())?;

    let _logging_guard = init_logging(
        &config.logging.directory,
        &config.logging.file,
        &config.logging.level,
    )
    .map_err(|e| CliError::LoggingInit(e.to_string()))?;

    let tool_path = config.paths.tool.clone().ok_or_else(|| {
        CliError::Config("No extraction tool configured. Set paths.tool in config.ini".to_string())
    })?;
    let database = config.paths.database.clone().ok_or_else(|| {
        CliError::Config(
            "No extraction database configured. Set paths.database in config.ini".to_string(),
        )
    })?;
    let grid = Arc::new(load_grid(&config, None)?);

    // Parse every region up front so a bad file fails before any submission.
    let mut requests = Vec::new();
    for path in &args.regions {
        let region = load_region(path)?;
        let region_data = region.canonical_value().map_err(|e| CliError::RegionFile {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        requests.push(SubmitRequest {
            name: region_name(path),
            region_type: region.kind().to_string(),
            region_data,
        });
    }

    let worker_count = match config.executor.worker_count {
        0 => default_worker_count(),
        n => n,
    };
    tracing::info!(
        regions = requests.len(),
        workers = worker_count,
        "booting extraction engine"
    );
    let service_config = ServiceConfig::new()
        .with_results_dir(config.paths.results_dir.clone())
        .with_work_dir(config.paths.work_dir.clone())
        .with_cost_ceiling(config.admission.cost_ceiling)
        .with_calibration(config.admission.calibration)
        .with_cover_limits(cover_limits(&config))
        .with_executor(
            ExecutorConfig::default()
                .with_queue_capacity(config.executor.queue_capacity)
                .with_worker_count(worker_count),
        );
    let tool = ExtractTool::new(tool_path, database);

    let runtime = tokio::runtime::Runtime::new().map_err(CliError::Runtime)?;
    runtime.block_on(drive(
        service_config,
        tool,
        grid,
        requests,
        Duration::from_millis(args.poll_interval_ms),
    ))
}

/// Submits every request, polls until all jobs are terminal, then shuts the
/// engine down.
async fn drive(
    service_config: ServiceConfig,
    tool: ExtractTool,
    grid: Arc<DensityGrid>,
    requests: Vec<SubmitRequest>,
    poll_interval: Duration,
) -> Result<(), CliError> {
    let service =
        CarveService::new(service_config, tool, grid).map_err(CliError::ServiceCreation)?;

    let snapshot = service.system_snapshot().await;
    if snapshot.dataset_timestamp.is_empty() {
        println!("Dataset timestamp: unavailable");
    } else {
        println!("Dataset timestamp: {}", snapshot.dataset_timestamp);
    }
    println!("Admission ceiling: {}", snapshot.cost_ceiling);
    println!();

    let mut pending: Vec<(JobId, String)> = Vec::new();
    for request in requests {
        let name = request.name.clone();
        match service.submit(request) {
            Ok(id) => {
                println!("[{}] admitted as {}", name, id);
                pending.push((id, name));
            }
            Err(error) => {
                service.shutdown().await;
                return Err(CliError::Submit { name, error });
            }
        }
    }

    let mut failures = 0usize;
    let mut last_printed: HashMap<JobId, ProgressSnapshot> = HashMap::new();
    while !pending.is_empty() {
        tokio::time::sleep(poll_interval).await;

        let mut still_pending = Vec::new();
        for (id, name) in pending {
            match service.status(&id).map_err(CliError::StatusRead)? {
                JobStatus::InFlight(snapshot) => {
                    let changed = last_printed.get(&id) != Some(&snapshot);
                    if changed && snapshot.cells_total > 0 {
                        println!(
                            "[{}] cells {}/{} nodes {}/{} elements {}/{}",
                            name,
                            snapshot.cells_prog,
                            snapshot.cells_total,
                            snapshot.nodes_prog,
                            snapshot.nodes_total,
                            snapshot.elems_prog,
                            snapshot.elems_total,
                        );
                        last_printed.insert(id.clone(), snapshot);
                    }
                    still_pending.push((id, name));
                }
                JobStatus::Complete(record) => {
                    println!(
                        "[{}] complete: {} bytes in {:.2}s -> {}",
                        name,
                        record.size_bytes,
                        record.elapsed,
                        service.store().artifact_path(&id).display(),
                    );
                }
                JobStatus::NotFound => {
                    tracing::warn!(job = %id, name = %name, "extraction failed");
                    println!("[{}] failed (see the log for details)", name);
                    failures += 1;
                }
            }
        }
        pending = still_pending;
    }

    service.shutdown().await;
    if failures > 0 {
        return Err(CliError::JobsFailed(failures));
    }
    Ok(())
}
