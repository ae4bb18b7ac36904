//! Background execution of mesh generation.
//!
//! A [`GenerationTask`] moves through `NotStarted → InProgress → Completed`
//! (or `Failed`). It runs at most once, either on a [`WorkerPool`] with a
//! completion callback or on the calling thread. Failures inside a pooled
//! task are logged and the callback never fires, so callers waiting on it
//! need their own timeout.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::time::Instant;

use orbis_mesh::MeshData;
use orbis_raster::HeightField;
use tracing::{error, info, warn};

use crate::error::TerrainError;
use crate::generator::TerrainGenerator;
use crate::metadata::TerrainMeshMetadata;
use crate::product::{ProductAcquisition, ProductRequest, RasterAccess};
use crate::progress::ProgressReporter;
use crate::rescale::{RescaleFrame, rescale_meshes};
use crate::worker_pool::WorkerPool;

/// Lifecycle of a [`GenerationTask`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum TaskState {
    NotStarted = 0,
    InProgress = 1,
    Completed = 2,
    Failed = 3,
}

impl TaskState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::InProgress,
            2 => Self::Completed,
            _ => Self::Failed,
        }
    }
}

/// Errors surfaced by task execution.
#[derive(Debug, thiserror::Error)]
pub enum TaskError {
    #[error("task already started (state: {state:?})")]
    AlreadyStarted { state: TaskState },

    #[error(transparent)]
    Generation(#[from] TerrainError),

    #[error("generation panicked: {0}")]
    Panicked(String),

    #[error("worker pool is shut down")]
    PoolShutDown,
}

/// Where a terrain job gets its elevation samples from.
#[derive(Clone, Debug, PartialEq)]
pub enum RasterInput {
    /// No raster; only valid for generators that do not sample one.
    None,
    /// A raster file on disk.
    Path(PathBuf),
    /// A product resolved to a file through [`ProductAcquisition`].
    Product(ProductRequest),
}

/// Everything needed to generate one LOD set.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainJob {
    pub generator: TerrainGenerator,
    pub metadata: TerrainMeshMetadata,
    pub input: RasterInput,
}

impl TerrainJob {
    pub fn new(generator: TerrainGenerator, metadata: TerrainMeshMetadata, input: RasterInput) -> Self {
        Self {
            generator,
            metadata,
            input,
        }
    }

    /// Resolve and load the raster, then generate every LOD. The raster
    /// handle is closed before this returns.
    pub fn run(
        &self,
        access: &dyn RasterAccess,
        products: &dyn ProductAcquisition,
        progress: &ProgressReporter,
    ) -> Result<Vec<MeshData>, TerrainError> {
        let path = match &self.input {
            RasterInput::None => None,
            RasterInput::Path(path) => Some(path.clone()),
            RasterInput::Product(request) => Some(products.resolve(request)?),
        };

        let field = match path {
            Some(path) => {
                let mut source = access.open(&path)?;
                Some(HeightField::load(source.as_mut())?)
            }
            None => None,
        };

        self.generator.generate(&self.metadata, field.as_ref(), progress)
    }
}

type Job = Box<dyn FnOnce(&ProgressReporter) -> Result<Vec<MeshData>, TerrainError> + Send>;

/// Read-only view of a task's state and progress, usable from any thread.
#[derive(Clone, Debug)]
pub struct TaskHandle {
    state: Arc<AtomicU8>,
    progress: ProgressReporter,
}

impl TaskHandle {
    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn progress(&self) -> f32 {
        self.progress.value()
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state(), TaskState::Completed | TaskState::Failed)
    }
}

/// A single-use unit of mesh generation work.
pub struct GenerationTask {
    label: String,
    state: Arc<AtomicU8>,
    progress: ProgressReporter,
    job: Option<Job>,
}

impl GenerationTask {
    /// Wrap an arbitrary generation closure.
    pub fn new(
        label: impl Into<String>,
        job: impl FnOnce(&ProgressReporter) -> Result<Vec<MeshData>, TerrainError> + Send + 'static,
    ) -> Self {
        Self {
            label: label.into(),
            state: Arc::new(AtomicU8::new(TaskState::NotStarted as u8)),
            progress: ProgressReporter::new(),
            job: Some(Box::new(job)),
        }
    }

    /// Generate the meshes of `job`, reading its raster through `access` and
    /// resolving products through `products`.
    pub fn terrain(
        job: TerrainJob,
        access: Arc<dyn RasterAccess>,
        products: Arc<dyn ProductAcquisition>,
    ) -> Self {
        Self::new(job.generator.name(), move |progress| {
            job.run(access.as_ref(), products.as_ref(), progress)
        })
    }

    /// Re-exaggerate `reference` meshes to `metadata.height_scale`.
    pub fn rescale(
        reference: Vec<MeshData>,
        metadata: TerrainMeshMetadata,
        reference_height_scale: f32,
        frame: RescaleFrame,
    ) -> Self {
        Self::new("rescale", move |_| {
            rescale_meshes(&reference, &metadata, reference_height_scale, frame)
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> TaskState {
        TaskState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn progress(&self) -> f32 {
        self.progress.value()
    }

    pub fn handle(&self) -> TaskHandle {
        TaskHandle {
            state: Arc::clone(&self.state),
            progress: self.progress.clone(),
        }
    }

    /// Run on a pool worker. `callback` receives the meshes on the worker
    /// thread, after which the task becomes `Completed`. On failure the task
    /// becomes `Failed` and `callback` is dropped without being called. A
    /// panicking callback also leaves the task `Failed`.
    pub fn execute<F>(&mut self, pool: &WorkerPool, callback: F) -> Result<(), TaskError>
    where
        F: FnOnce(Vec<MeshData>) + Send + 'static,
    {
        let job = self.start()?;
        let label = self.label.clone();
        let state = Arc::clone(&self.state);
        let progress = self.progress.clone();

        let spawned = pool.spawn(move || {
            let outcome = match run_job(&label, job, &progress) {
                Ok(meshes) => match panic::catch_unwind(AssertUnwindSafe(|| callback(meshes))) {
                    Ok(()) => TaskState::Completed,
                    Err(payload) => {
                        error!(
                            "Task '{label}' callback panicked: {}",
                            panic_message(payload.as_ref())
                        );
                        TaskState::Failed
                    }
                },
                Err(_) => TaskState::Failed,
            };
            state.store(outcome as u8, Ordering::Release);
        });

        if let Err(err) = spawned {
            self.state.store(TaskState::Failed as u8, Ordering::Release);
            return Err(err);
        }
        Ok(())
    }

    /// Run synchronously and return the meshes.
    pub fn execute_in_current_thread(&mut self) -> Result<Vec<MeshData>, TaskError> {
        let job = self.start()?;
        let result = run_job(&self.label, job, &self.progress);
        let state = if result.is_ok() {
            TaskState::Completed
        } else {
            TaskState::Failed
        };
        self.state.store(state as u8, Ordering::Release);
        result
    }

    fn start(&mut self) -> Result<Job, TaskError> {
        if let Err(current) = self.state.compare_exchange(
            TaskState::NotStarted as u8,
            TaskState::InProgress as u8,
            Ordering::AcqRel,
            Ordering::Acquire,
        ) {
            let state = TaskState::from_u8(current);
            warn!("Task '{}' already started (state: {state:?})", self.label);
            return Err(TaskError::AlreadyStarted { state });
        }
        self.job.take().ok_or(TaskError::AlreadyStarted {
            state: TaskState::InProgress,
        })
    }
}

/// Run `job`, catching panics. Errors are logged here so pooled tasks, whose
/// callers never see them, still leave a trace.
fn run_job(label: &str, job: Job, progress: &ProgressReporter) -> Result<Vec<MeshData>, TaskError> {
    let start = Instant::now();
    let result = match panic::catch_unwind(AssertUnwindSafe(|| job(progress))) {
        Ok(Ok(meshes)) => Ok(meshes),
        Ok(Err(err)) => Err(TaskError::Generation(err)),
        Err(payload) => Err(TaskError::Panicked(panic_message(payload.as_ref()))),
    };

    match &result {
        Ok(meshes) => {
            progress.complete();
            let vertices: usize = meshes.iter().map(MeshData::vertex_count).sum();
            info!(
                "Task '{label}' generated {} meshes ({vertices} vertices) in {:.1} ms",
                meshes.len(),
                start.elapsed().as_secs_f64() * 1000.0
            );
        }
        Err(err) => error!("Task '{label}' failed: {err}"),
    }
    result
}

pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::globe::GlobeGenerator;
    use orbis_raster::{MemoryRaster, RasterError, RasterSource};
    use std::path::Path;
    use std::time::Duration;

    fn memory_access(raster: MemoryRaster) -> Arc<dyn RasterAccess> {
        Arc::new(move |_: &Path| {
            Ok::<Box<dyn RasterSource>, RasterError>(Box::new(raster.clone()))
        })
    }

    fn no_products() -> Arc<dyn ProductAcquisition> {
        Arc::new(|request: &ProductRequest| {
            Err::<PathBuf, _>(RasterError::FileNotFound(PathBuf::from(request.cache_key())))
        })
    }

    fn globe_job(input: RasterInput) -> TerrainJob {
        TerrainJob::new(
            TerrainGenerator::Globe(GlobeGenerator),
            TerrainMeshMetadata::new(1.0, 0.5, 0, 0, -1),
            input,
        )
    }

    fn wait_finished(handle: &TaskHandle) {
        let start = Instant::now();
        while !handle.is_finished() {
            assert!(start.elapsed() < Duration::from_secs(5), "task timed out");
            std::thread::sleep(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_sync_execution() {
        let mut task = GenerationTask::terrain(
            globe_job(RasterInput::Path(PathBuf::from("mem.tif"))),
            memory_access(MemoryRaster::constant(4, 4, 10.0)),
            no_products(),
        );
        assert_eq!(task.state(), TaskState::NotStarted);
        assert_eq!(task.progress(), 0.0);

        let meshes = task.execute_in_current_thread().unwrap();
        assert_eq!(meshes.len(), 1);
        assert_eq!(meshes[0].vertex_count(), 20);
        assert_eq!(task.state(), TaskState::Completed);
        assert_eq!(task.progress(), 1.0);
    }

    #[test]
    fn test_second_execute_rejected() {
        let mut task = GenerationTask::new("noop", |_| Ok(Vec::new()));
        task.execute_in_current_thread().unwrap();
        assert!(matches!(
            task.execute_in_current_thread(),
            Err(TaskError::AlreadyStarted {
                state: TaskState::Completed
            })
        ));

        let pool = WorkerPool::new(1);
        assert!(matches!(
            task.execute(&pool, |_| {}),
            Err(TaskError::AlreadyStarted { .. })
        ));
    }

    #[test]
    fn test_pool_execution_invokes_callback() {
        let pool = WorkerPool::new(2);
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut task = GenerationTask::terrain(
            globe_job(RasterInput::Path(PathBuf::from("mem.tif"))),
            memory_access(MemoryRaster::constant(8, 8, 1.0)),
            no_products(),
        );
        let handle = task.handle();

        task.execute(&pool, move |meshes| {
            let _ = tx.send(meshes);
        })
        .unwrap();

        let meshes = rx.recv_timeout(Duration::from_secs(5)).unwrap();
        assert_eq!(meshes[0].vertex_count(), 9 * 8);
        wait_finished(&handle);
        assert_eq!(handle.state(), TaskState::Completed);
        assert_eq!(handle.progress(), 1.0);
    }

    #[test]
    fn test_failure_skips_callback() {
        let pool = WorkerPool::new(1);
        let (tx, rx) = crossbeam_channel::bounded::<Vec<MeshData>>(1);
        let mut task = GenerationTask::terrain(
            globe_job(RasterInput::Product(ProductRequest::new(
                "missing",
                orbis_geodesy::BoundingBox::globe(),
                4,
                4,
                "tif",
            ))),
            memory_access(MemoryRaster::constant(4, 4, 1.0)),
            no_products(),
        );
        let handle = task.handle();

        task.execute(&pool, move |meshes| {
            let _ = tx.send(meshes);
        })
        .unwrap();

        wait_finished(&handle);
        assert_eq!(handle.state(), TaskState::Failed);
        assert!(rx.recv_timeout(Duration::from_millis(50)).is_err());
        assert!(handle.progress() < 1.0);
    }

    #[test]
    fn test_callback_panic_marks_failed() {
        let pool = WorkerPool::new(1);
        let mut task = GenerationTask::new("consumer", |_| Ok(Vec::new()));
        let handle = task.handle();

        task.execute(&pool, |_| panic!("consumer bug")).unwrap();

        wait_finished(&handle);
        assert_eq!(handle.state(), TaskState::Failed);

        // The worker survives and keeps serving tasks.
        let (tx, rx) = crossbeam_channel::bounded(1);
        let mut next = GenerationTask::new("next", |_| Ok(Vec::new()));
        next.execute(&pool, move |meshes| {
            let _ = tx.send(meshes.len());
        })
        .unwrap();
        assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), 0);
    }

    #[test]
    fn test_missing_raster_input() {
        let mut task = GenerationTask::terrain(
            globe_job(RasterInput::None),
            memory_access(MemoryRaster::constant(4, 4, 1.0)),
            no_products(),
        );
        match task.execute_in_current_thread() {
            Err(TaskError::Generation(err)) => assert_eq!(err.kind(), ErrorKind::FileFormat),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(task.state(), TaskState::Failed);
    }

    #[test]
    fn test_panic_is_captured() {
        let mut task = GenerationTask::new("explodes", |_| panic!("generator bug"));
        match task.execute_in_current_thread() {
            Err(TaskError::Panicked(msg)) => assert_eq!(msg, "generator bug"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert_eq!(task.state(), TaskState::Failed);
    }

    #[test]
    fn test_rescale_task() {
        let field = HeightField::from_samples(4, 4, vec![2.0; 16]).unwrap();
        let meta = TerrainMeshMetadata::new(1.0, 1.0, 0, 0, -1);
        let reference = vec![GlobeGenerator.generate_lod(&meta, &field, 1).unwrap()];

        let mut task = GenerationTask::rescale(
            reference,
            meta.with_height_scale(2.0),
            1.0,
            RescaleFrame::Globe,
        );
        let meshes = task.execute_in_current_thread().unwrap();
        for v in &meshes[0].vertices {
            assert!((v.length() - 5.0).abs() < 1e-4);
        }
    }
}
