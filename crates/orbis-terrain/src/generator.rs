//! Generator dispatch and helpers shared by every mesh generator.

use orbis_mesh::MeshData;
use orbis_raster::{HeightField, RasterError};
use tracing::debug;

use crate::error::TerrainError;
use crate::globe::GlobeGenerator;
use crate::metadata::TerrainMeshMetadata;
use crate::planar::PlanarGenerator;
use crate::progress::ProgressReporter;
use crate::section::{BaseSectionGenerator, SectionGenerator};

/// The closed set of mesh generators.
#[derive(Clone, Debug, PartialEq)]
pub enum TerrainGenerator {
    /// Flat heightmap in a local tangent frame.
    Planar(PlanarGenerator),
    /// Whole-planet sphere from an equirectangular raster.
    Globe(GlobeGenerator),
    /// Curved patch for a bounding box, re-centred on +Z.
    Section(SectionGenerator),
    /// Flat-height (constant radius) placeholder patch for a bounding box.
    BaseSection(BaseSectionGenerator),
}

impl TerrainGenerator {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Planar(_) => "planar",
            Self::Globe(_) => "globe",
            Self::Section(_) => "section",
            Self::BaseSection(_) => "base-section",
        }
    }

    /// Whether the generator reads elevation samples at all.
    pub fn needs_raster(&self) -> bool {
        !matches!(self, Self::BaseSection(_))
    }

    /// Generate a single LOD sampling the raster every `downsample` pixels.
    pub fn generate_lod(
        &self,
        metadata: &TerrainMeshMetadata,
        field: Option<&HeightField>,
        downsample: u32,
    ) -> Result<MeshData, TerrainError> {
        match self {
            Self::Planar(g) => g.generate_lod(metadata, require_field(field)?, downsample),
            Self::Globe(g) => g.generate_lod(metadata, require_field(field)?, downsample),
            Self::Section(g) => g.generate_lod(metadata, require_field(field)?, downsample),
            Self::BaseSection(g) => g.generate_lod(metadata, downsample),
        }
    }

    /// Generate every LOD described by `metadata`, finest first, followed by
    /// the separate physics LOD when one is needed.
    pub fn generate(
        &self,
        metadata: &TerrainMeshMetadata,
        field: Option<&HeightField>,
        progress: &ProgressReporter,
    ) -> Result<Vec<MeshData>, TerrainError> {
        let downsamples = metadata.lod_downsamples()?;
        let total = downsamples.len();

        let mut meshes = Vec::with_capacity(total);
        for (lod, downsample) in downsamples.into_iter().enumerate() {
            let mesh = self.generate_lod(metadata, field, downsample)?;
            debug!(
                "{} LOD {lod} (downsample {downsample}): {} vertices, {} triangles",
                self.name(),
                mesh.vertex_count(),
                mesh.triangle_count()
            );
            meshes.push(mesh);
            // The final step to 1.0 belongs to the task, once results are handed off.
            progress.report((lod + 1) as f32 / (total + 1) as f32);
        }
        Ok(meshes)
    }
}

/// The height field a raster-backed generator needs, validated as elevation.
pub(crate) fn require_field(field: Option<&HeightField>) -> Result<&HeightField, TerrainError> {
    let field = field.ok_or_else(|| {
        RasterError::FileFormat("raster metadata cannot be null".to_string())
    })?;
    field.metadata().validate_elevation()?;
    Ok(field)
}

pub(crate) fn require_power_of_two(downsample: u32) -> Result<(), TerrainError> {
    if downsample.is_power_of_two() {
        Ok(())
    } else {
        Err(TerrainError::NonPowerOfTwoDownsample(downsample))
    }
}

/// Vertices along an axis of `extent` pixels sampled every `downsample`
/// pixels, including both edges.
pub(crate) fn axis_count(extent: u32, downsample: u32) -> u32 {
    extent.saturating_sub(1) / downsample.max(1) + 1
}
