//! Curved patches covering a bounded geographic region.
//!
//! Patches are rotated so the median direction of their bounding box lies on
//! +Z, then translated by `-radius` along Z, so every patch sits near the
//! origin facing forward regardless of where on the globe it belongs.

use glam::DVec3;
use orbis_geodesy::{BoundingBox, GeodesyError, UvBounds, direction_from_lat_lon, forward_rotation};
use orbis_mesh::{MeshData, UvLayout, grid_uv, triangulate};
use orbis_raster::HeightField;

use crate::error::TerrainError;
use crate::generator::{axis_count, require_power_of_two};
use crate::metadata::TerrainMeshMetadata;

/// Raster-backed patch for `bbox`. The raster covers exactly the box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SectionGenerator {
    pub bbox: BoundingBox,
    /// Where the patch texture lives inside the shared atlas.
    pub uv_bounds: UvBounds,
}

impl SectionGenerator {
    pub fn new(bbox: BoundingBox, uv_bounds: UvBounds) -> Self {
        Self { bbox, uv_bounds }
    }

    pub fn generate_lod(
        &self,
        metadata: &TerrainMeshMetadata,
        field: &HeightField,
        downsample: u32,
    ) -> Result<MeshData, TerrainError> {
        require_power_of_two(downsample)?;

        let (width, height) = (field.width(), field.height());
        let cols = axis_count(width, downsample);
        let rows = axis_count(height, downsample);
        let radius = f64::from(metadata.radius);
        let height_scale = f64::from(metadata.height_scale);

        build_patch(&self.bbox, &self.uv_bounds, cols, rows, radius, |column, row| {
            let x = (column * downsample).min(width - 1);
            let y = (row * downsample).min(height - 1);
            radius + height_scale * f64::from(field.sample(x, y, downsample))
        })
    }
}

/// Placeholder patch at constant radius, with the grid a raster of
/// `width × height` pixels would produce. Shown while the real raster loads.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BaseSectionGenerator {
    pub bbox: BoundingBox,
    pub uv_bounds: UvBounds,
    pub width: u32,
    pub height: u32,
}

impl BaseSectionGenerator {
    pub fn new(bbox: BoundingBox, uv_bounds: UvBounds, width: u32, height: u32) -> Self {
        Self {
            bbox,
            uv_bounds,
            width,
            height,
        }
    }

    pub fn generate_lod(
        &self,
        metadata: &TerrainMeshMetadata,
        downsample: u32,
    ) -> Result<MeshData, TerrainError> {
        require_power_of_two(downsample)?;

        let cols = axis_count(self.width, downsample);
        let rows = axis_count(self.height, downsample);
        let radius = f64::from(metadata.radius);

        build_patch(&self.bbox, &self.uv_bounds, cols, rows, radius, |_, _| radius)
    }
}

/// Lay out a `cols × rows` patch over `bbox`. `distance(column, row)` gives
/// the distance from the sphere centre of each grid point; `column` counts
/// from the western edge and `row` from the northern edge.
///
/// Columns are emitted east to west, matching the globe's winding.
fn build_patch(
    bbox: &BoundingBox,
    uv_bounds: &UvBounds,
    cols: u32,
    rows: u32,
    radius: f64,
    distance: impl Fn(u32, u32) -> f64,
) -> Result<MeshData, TerrainError> {
    let lon_swing = bbox.lon_swing();
    if lon_swing > 180.0 {
        return Err(GeodesyError::SwingTooLarge { lon_swing }.into());
    }
    let indices = triangulate(cols, rows, false)?;

    let rotation = forward_rotation(bbox);
    let offset = DVec3::Z * radius;
    let lat_swing = bbox.lat_swing();
    let layout = UvLayout {
        mirror_u: true,
        ..UvLayout::atlas(
            uv_bounds.scale().as_vec2(),
            uv_bounds.offset().as_vec2(),
        )
    };

    let count = cols as usize * rows as usize;
    let mut vertices = Vec::with_capacity(count);
    let mut uvs = Vec::with_capacity(count);

    for row in 0..rows {
        let lat = bbox.lat_end() - lat_swing * f64::from(row) / f64::from(rows - 1);
        for i in 0..cols {
            let column = cols - 1 - i;
            let lon = bbox.lon_start() + lon_swing * f64::from(column) / f64::from(cols - 1);

            let dir = rotation * direction_from_lat_lon(lat, lon);
            vertices.push((dir * distance(column, row) - offset).as_vec3());
            uvs.push(grid_uv(i, row, cols, rows, &layout));
        }
    }

    Ok(MeshData::new(vertices, uvs, indices))
}
