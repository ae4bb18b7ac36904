mod command;
mod report;

use std::process::ExitCode;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossbeam_channel::RecvTimeoutError;
use orbis_config::{Config, ConfigError, default_config_dir};
use orbis_geodesy::GeodesyError;
use orbis_mesh::MeshData;
use orbis_terrain::{GenerationTask, LocalProductCache, TaskError, TiffRasterAccess, WorkerPool};
use tracing::{error, info, warn};

use crate::command::{Cli, build_job, rescale_plan};

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Geodesy(#[from] GeodesyError),
    #[error(transparent)]
    Task(#[from] TaskError),
    #[error("generation failed, see the log for details")]
    Failed,
    #[error("no result after {0} s")]
    Timeout(u64),
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            eprintln!("orbis: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config_dir = match cli.overrides.config.clone() {
        Some(dir) => dir,
        None => default_config_dir()?,
    };
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&cli.overrides);
    config.validate()?;

    let log_dir = config_dir.join("logs");
    orbis_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    let job = build_job(&cli.command, &config)?;
    let metadata = job.metadata;
    info!(
        "Generating {} terrain: radius {}, height scale {}, {} LODs",
        job.generator.name(),
        metadata.radius,
        metadata.height_scale,
        metadata.total_lod_levels()
    );

    let pool = WorkerPool::from_config(&config.workers);
    info!("Worker pool started with {} threads", pool.thread_count());

    let products = LocalProductCache::new(config.raster.product_dir.clone());
    let task = GenerationTask::terrain(job, Arc::new(TiffRasterAccess), Arc::new(products));
    let timeout = config.workers.task_timeout_seconds;
    let started = Instant::now();
    let mut meshes = await_meshes(task, &pool, timeout)?;

    let metadata = match rescale_plan(&cli.command, &config) {
        Some(plan) => {
            info!(
                "Rescaling from height scale {} to {}",
                plan.reference_height_scale, plan.metadata.height_scale
            );
            let task = GenerationTask::rescale(
                meshes,
                plan.metadata,
                plan.reference_height_scale,
                plan.frame,
            );
            meshes = await_meshes(task, &pool, timeout)?;
            plan.metadata
        }
        None => metadata,
    };

    info!(
        "Generated {} meshes in {:.2?}",
        meshes.len(),
        started.elapsed()
    );
    report::report(&meshes, &metadata);
    Ok(())
}

/// Run `task` on the pool and wait up to `timeout` seconds for its meshes.
fn await_meshes(
    mut task: GenerationTask,
    pool: &WorkerPool,
    timeout: u64,
) -> Result<Vec<MeshData>, CliError> {
    let handle = task.handle();
    let (tx, rx) = crossbeam_channel::bounded(1);
    task.execute(pool, move |meshes: Vec<MeshData>| {
        let _ = tx.send(meshes);
    })?;

    match rx.recv_timeout(Duration::from_secs(timeout)) {
        Ok(meshes) => Ok(meshes),
        Err(RecvTimeoutError::Disconnected) => Err(CliError::Failed),
        Err(RecvTimeoutError::Timeout) => {
            warn!(
                "Task '{}' still {:?} at {:.0}% after {timeout} s",
                task.label(),
                handle.state(),
                handle.progress() * 100.0
            );
            Err(CliError::Timeout(timeout))
        }
    }
}
