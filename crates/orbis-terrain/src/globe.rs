//! Whole-planet sphere meshes from equirectangular rasters.

use orbis_geodesy::{LONGITUDE_OFFSET_DEG, sphere_point};
use orbis_mesh::{MeshData, UvLayout, grid_uv, triangulate};
use orbis_raster::HeightField;

use crate::error::TerrainError;
use crate::generator::require_power_of_two;
use crate::metadata::TerrainMeshMetadata;

/// Maps an equirectangular raster (longitude −180..180 left to right,
/// latitude 90..−90 top to bottom) onto a sphere.
///
/// Rows run from the north pole to the south pole. Each row carries one extra
/// seam column: the first and last vertex of a row share a position but have
/// `u = 1` and `u = 0`, so the texture closes without wrapping. Columns are
/// emitted from high longitude to low, which makes the standard
/// triangulation face outwards.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GlobeGenerator;

impl GlobeGenerator {
    pub fn generate_lod(
        &self,
        metadata: &TerrainMeshMetadata,
        field: &HeightField,
        downsample: u32,
    ) -> Result<MeshData, TerrainError> {
        require_power_of_two(downsample)?;

        let width = field.width();
        let cols = width / downsample + 1;
        let rows = field.height() / downsample;
        let indices = triangulate(cols, rows, false)?;

        let layout = UvLayout {
            mirror_u: true,
            ..UvLayout::default()
        };
        let radius = f64::from(metadata.radius);
        let height_scale = f64::from(metadata.height_scale);

        let count = cols as usize * rows as usize;
        let mut vertices = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);

        for y in 0..rows {
            let lat = 90.0 - 180.0 * f64::from(y) / f64::from(rows - 1);
            for i in 0..cols {
                let column = cols - 1 - i;
                let lon = -180.0 + 360.0 * f64::from(column) / f64::from(cols - 1);
                let sample = field.sample((column * downsample) % width, y * downsample, downsample);

                let distance = radius + height_scale * f64::from(sample);
                let position = sphere_point(lat, lon + LONGITUDE_OFFSET_DEG) * distance;
                vertices.push(position.as_vec3());
                uvs.push(grid_uv(i, y, cols, rows, &layout));
            }
        }

        Ok(MeshData::new(vertices, uvs, indices))
    }
}

/// Unnormalized face normal of triangle `tri`.
#[cfg(test)]
pub(crate) fn face_normal(mesh: &MeshData, tri: usize) -> glam::Vec3 {
    let i = &mesh.indices[tri * 3..tri * 3 + 3];
    let [a, b, c] = [0, 1, 2].map(|k| mesh.vertices[i[k] as usize]);
    (b - a).cross(c - a)
}
