//! Terrain mesh synthesis: turns elevation rasters into multi-LOD triangle
//! meshes for a whole globe, bounded geographic sections, or flat planes.
//!
//! Generation runs through [`GenerationTask`], either on a shared
//! [`WorkerPool`] with a completion callback or synchronously on the calling
//! thread. Previously generated meshes can be re-exaggerated with
//! [`rescale_heights`] without touching the raster again.

mod error;
mod generator;
mod globe;
mod metadata;
mod planar;
mod product;
mod progress;
mod rescale;
mod section;
mod task;
mod worker_pool;

pub use error::{ErrorKind, TerrainError};
pub use generator::TerrainGenerator;
pub use globe::GlobeGenerator;
pub use metadata::TerrainMeshMetadata;
pub use planar::PlanarGenerator;
pub use product::{
    LocalProductCache, ProductAcquisition, ProductRequest, RasterAccess, TiffRasterAccess,
};
pub use progress::ProgressReporter;
pub use rescale::{DEFAULT_REFERENCE_HEIGHT_SCALE, RescaleFrame, rescale_heights, rescale_meshes};
pub use section::{BaseSectionGenerator, SectionGenerator};
pub use task::{GenerationTask, RasterInput, TaskError, TaskHandle, TaskState, TerrainJob};
pub use worker_pool::WorkerPool;
