//! Flat heightmap meshes in a local tangent frame.

use glam::Vec3;
use orbis_mesh::{MeshData, UvLayout, grid_uv, triangulate_transposed};
use orbis_raster::HeightField;

use crate::error::TerrainError;
use crate::generator::axis_count;
use crate::metadata::TerrainMeshMetadata;

/// Lays the raster out in the XZ plane with height along +Y.
///
/// The grid is centred on the origin with its longer side spanning `size`
/// units. Raster row 0 lies towards +Z. After generation the lowest vertex is
/// moved to `y = 0`. Vertices are stored column-major.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlanarGenerator {
    pub size: f32,
}

impl PlanarGenerator {
    pub fn new(size: f32) -> Self {
        Self { size }
    }

    /// Unlike the spherical generators any positive `downsample` is accepted.
    pub fn generate_lod(
        &self,
        metadata: &TerrainMeshMetadata,
        field: &HeightField,
        downsample: u32,
    ) -> Result<MeshData, TerrainError> {
        let downsample = downsample.max(1);
        let (width, height) = (field.width(), field.height());
        let h_count = axis_count(width, downsample);
        let v_count = axis_count(height, downsample);
        let indices = triangulate_transposed(h_count, v_count, true)?;

        let step = self.size / (h_count.max(v_count) - 1) as f32;
        let half_width = (h_count - 1) as f32 * step / 2.0;
        let half_depth = (v_count - 1) as f32 * step / 2.0;
        let layout = UvLayout {
            flip_v: true,
            ..UvLayout::default()
        };

        let count = h_count as usize * v_count as usize;
        let mut vertices = Vec::with_capacity(count);
        let mut uvs = Vec::with_capacity(count);
        let mut min_height = f32::INFINITY;

        for x in 0..h_count {
            for y in 0..v_count {
                let sx = (x * downsample).min(width - 1);
                let sy = (y * downsample).min(height - 1);
                let h = field.sample(sx, sy, downsample) * metadata.height_scale;
                min_height = min_height.min(h);

                vertices.push(Vec3::new(
                    x as f32 * step - half_width,
                    h,
                    half_depth - y as f32 * step,
                ));
                uvs.push(grid_uv(x, y, h_count, v_count, &layout));
            }
        }

        for v in &mut vertices {
            v.y -= min_height;
        }

        Ok(MeshData::new(vertices, uvs, indices))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::face_normal;
    use glam::Vec2;

    fn ramp(width: u32, height: u32) -> HeightField {
        let samples = (0..width * height).map(|i| i as f32 - 5.0).collect();
        HeightField::from_samples(width, height, samples).unwrap()
    }

    #[test]
    fn test_lowest_point_at_zero() {
        let meta = TerrainMeshMetadata::new(1.0, 2.0, 0, 0, -1);
        let mesh = PlanarGenerator::new(10.0).generate_lod(&meta, &ramp(4, 3), 1).unwrap();
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!(lo.y, 0.0);
        assert_eq!(hi.y, 11.0 * 2.0);
    }

    #[test]
    fn test_centred_and_sized() {
        let meta = TerrainMeshMetadata::default();
        let mesh = PlanarGenerator::new(8.0).generate_lod(&meta, &ramp(5, 3), 1).unwrap();
        let (lo, hi) = mesh.bounds().unwrap();
        assert_eq!((lo.x, hi.x), (-4.0, 4.0));
        assert_eq!((lo.z, hi.z), (-2.0, 2.0));
    }

    #[test]
    fn test_column_major_layout() {
        let meta = TerrainMeshMetadata::new(1.0, 1.0, 0, 0, -1);
        let mesh = PlanarGenerator::new(2.0).generate_lod(&meta, &ramp(3, 2), 1).unwrap();
        // index = x * v_count + y; row 0 faces +Z.
        assert_eq!(mesh.vertices[0], Vec3::new(-1.0, 0.0, 0.5));
        assert_eq!(mesh.vertices[1], Vec3::new(-1.0, 3.0, -0.5));
        assert_eq!(mesh.vertices[2], Vec3::new(0.0, 1.0, 0.5));
        assert_eq!(mesh.uvs[0], Vec2::new(0.0, 1.0));
        assert_eq!(mesh.uvs[1], Vec2::new(0.0, 0.0));
    }

    #[test]
    fn test_faces_point_up() {
        let meta = TerrainMeshMetadata::default();
        let flat = HeightField::from_samples(4, 4, vec![3.0; 16]).unwrap();
        let mesh = PlanarGenerator::new(1.0).generate_lod(&meta, &flat, 1).unwrap();
        for tri in 0..mesh.triangle_count() {
            assert!(face_normal(&mesh, tri).y > 0.0);
        }
    }

    #[test]
    fn test_any_downsample() {
        let meta = TerrainMeshMetadata::default();
        let generator = PlanarGenerator::new(1.0);
        let field = ramp(10, 7);
        let mesh = generator.generate_lod(&meta, &field, 3).unwrap();
        assert_eq!(mesh.vertex_count(), 4 * 3);
        mesh.validate().unwrap();
    }
}
