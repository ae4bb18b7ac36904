//! Per-request mesh generation parameters.

use orbis_config::TerrainConfig;

use crate::error::TerrainError;

/// Parameters shared by every generator.
///
/// Downsampling is expressed as exponents: LOD `i` samples the raster every
/// `2^(base_downsample + i)` pixels. A negative `physics_downsample` means no
/// physics mesh is wanted.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainMeshMetadata {
    /// Sphere radius (or reference plane distance) in scene units.
    pub radius: f32,
    /// Multiplier from raster samples to scene units.
    pub height_scale: f32,
    /// Extra detail levels beyond the base level.
    pub lod_levels: u32,
    /// Exponent of the finest downsample factor.
    pub base_downsample: u32,
    /// Exponent of the physics mesh downsample factor, or negative for none.
    pub physics_downsample: i32,
}

impl Default for TerrainMeshMetadata {
    fn default() -> Self {
        Self {
            radius: 1.0,
            height_scale: 1.0,
            lod_levels: 0,
            base_downsample: 0,
            physics_downsample: -1,
        }
    }
}

impl TerrainMeshMetadata {
    pub fn new(
        radius: f32,
        height_scale: f32,
        lod_levels: u32,
        base_downsample: u32,
        physics_downsample: i32,
    ) -> Self {
        Self {
            radius,
            height_scale,
            lod_levels,
            base_downsample,
            physics_downsample,
        }
    }

    pub fn from_config(config: &TerrainConfig) -> Self {
        Self::new(
            config.radius,
            config.height_scale,
            config.lod_levels,
            config.base_downsample,
            config.physics_downsample,
        )
    }

    /// Copy with a different height scale.
    pub fn with_height_scale(self, height_scale: f32) -> Self {
        Self {
            height_scale,
            ..self
        }
    }

    pub fn has_physics_lod(&self) -> bool {
        self.physics_downsample >= 0
    }

    /// True when the physics mesh does not coincide with one of the render
    /// LODs and must be generated separately.
    pub fn generate_additional_physics_lod(&self) -> bool {
        if !self.has_physics_lod() {
            return false;
        }
        let physics = i64::from(self.physics_downsample);
        let first = i64::from(self.base_downsample);
        let last = first + i64::from(self.lod_levels);
        physics < first || physics > last
    }

    /// Index of the physics mesh in the generated LOD array.
    pub fn physics_lod_mesh_index(&self) -> Option<usize> {
        if !self.has_physics_lod() {
            None
        } else if self.generate_additional_physics_lod() {
            Some(self.lod_levels as usize + 1)
        } else {
            Some((self.physics_downsample as u32 - self.base_downsample) as usize)
        }
    }

    /// Number of meshes a generator produces.
    pub fn total_lod_levels(&self) -> usize {
        self.lod_levels as usize + 1 + usize::from(self.generate_additional_physics_lod())
    }

    /// Downsample factor of every generated mesh, finest first, with the
    /// separate physics LOD (if any) last.
    pub fn lod_downsamples(&self) -> Result<Vec<u32>, TerrainError> {
        let factor = |exponent: u32| {
            1u32.checked_shl(exponent)
                .ok_or(TerrainError::DownsampleOverflow(exponent))
        };

        let mut factors = Vec::with_capacity(self.total_lod_levels());
        for lod in 0..=self.lod_levels {
            factors.push(factor(self.base_downsample + lod)?);
        }
        if self.generate_additional_physics_lod() {
            factors.push(factor(self.physics_downsample as u32)?);
        }
        Ok(factors)
    }
}
