//! Height re-exaggeration of already generated meshes.
//!
//! Only the radial component of each vertex changes; UVs and indices are
//! reused as-is and the raster is never read again.

use glam::Vec3;
use orbis_mesh::MeshData;

use crate::error::TerrainError;
use crate::metadata::TerrainMeshMetadata;

/// Height scale reference meshes are generated with.
pub const DEFAULT_REFERENCE_HEIGHT_SCALE: f32 = 1.0;

/// Coordinate frame of the reference vertices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RescaleFrame {
    /// Centred on the sphere centre (globe meshes).
    Globe,
    /// Translated by `-radius` along Z (section patches).
    Section,
    /// Flat, height along +Y.
    Planar,
}

/// Recompute vertex heights for `metadata.height_scale`, given vertices
/// generated at `reference_height_scale`.
pub fn rescale_heights(
    reference: &[Vec3],
    metadata: &TerrainMeshMetadata,
    reference_height_scale: f32,
    frame: RescaleFrame,
) -> Result<Vec<Vec3>, TerrainError> {
    if reference_height_scale == 0.0 {
        return Err(TerrainError::ZeroReferenceScale);
    }
    let scale = metadata.height_scale / reference_height_scale;
    let radius = metadata.radius;

    let rescaled = match frame {
        RescaleFrame::Planar => reference
            .iter()
            .map(|v| Vec3::new(v.x, v.y * scale, v.z))
            .collect(),
        RescaleFrame::Globe => reference
            .iter()
            .map(|&v| rescale_radial(v, radius, scale))
            .collect(),
        RescaleFrame::Section => {
            let offset = Vec3::Z * radius;
            reference
                .iter()
                .map(|&v| rescale_radial(v + offset, radius, scale) - offset)
                .collect()
        }
    };
    Ok(rescaled)
}

/// Rescale every mesh of a LOD set, keeping UVs and indices.
pub fn rescale_meshes(
    reference: &[MeshData],
    metadata: &TerrainMeshMetadata,
    reference_height_scale: f32,
    frame: RescaleFrame,
) -> Result<Vec<MeshData>, TerrainError> {
    reference
        .iter()
        .map(|mesh| {
            Ok(MeshData::new(
                rescale_heights(&mesh.vertices, metadata, reference_height_scale, frame)?,
                mesh.uvs.clone(),
                mesh.indices.clone(),
            ))
        })
        .collect()
}

fn rescale_radial(v: Vec3, radius: f32, scale: f32) -> Vec3 {
    let distance = v.length();
    if distance <= f32::EPSILON {
        return v;
    }
    let new_distance = (distance - radius) * scale + radius;
    v * (new_distance / distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::globe::GlobeGenerator;
    use crate::planar::PlanarGenerator;
    use crate::section::SectionGenerator;
    use orbis_geodesy::{BoundingBox, UvBounds};
    use orbis_raster::HeightField;

    fn bumpy(width: u32, height: u32) -> HeightField {
        let samples = (0..width * height).map(|i| (i % 7) as f32).collect();
        HeightField::from_samples(width, height, samples).unwrap()
    }

    fn assert_close(a: &[Vec3], b: &[Vec3], tolerance: f32) {
        assert_eq!(a.len(), b.len());
        for (x, y) in a.iter().zip(b) {
            assert!((*x - *y).length() < tolerance, "{x:?} != {y:?}");
        }
    }

    #[test]
    fn test_same_scale_is_identity() {
        let reference_meta = TerrainMeshMetadata::new(10.0, 1.0, 0, 0, -1);
        let field = bumpy(8, 8);
        let globe = GlobeGenerator.generate_lod(&reference_meta, &field, 1).unwrap();

        let out = rescale_heights(
            &globe.vertices,
            &reference_meta,
            DEFAULT_REFERENCE_HEIGHT_SCALE,
            RescaleFrame::Globe,
        )
        .unwrap();
        assert_close(&out, &globe.vertices, 1e-4);
    }

    #[test]
    fn test_matches_regeneration() {
        let field = bumpy(8, 8);
        let reference_meta = TerrainMeshMetadata::new(10.0, 1.0, 0, 0, -1);
        let target_meta = reference_meta.with_height_scale(3.0);

        let globe_ref = GlobeGenerator.generate_lod(&reference_meta, &field, 1).unwrap();
        let globe_new = GlobeGenerator.generate_lod(&target_meta, &field, 1).unwrap();
        let out = rescale_heights(&globe_ref.vertices, &target_meta, 1.0, RescaleFrame::Globe).unwrap();
        assert_close(&out, &globe_new.vertices, 1e-3);

        let section = SectionGenerator::new(BoundingBox::new(10.0, 10.0, 30.0, 30.0), UvBounds::default());
        let section_ref = section.generate_lod(&reference_meta, &field, 1).unwrap();
        let section_new = section.generate_lod(&target_meta, &field, 1).unwrap();
        let out = rescale_heights(&section_ref.vertices, &target_meta, 1.0, RescaleFrame::Section).unwrap();
        assert_close(&out, &section_new.vertices, 1e-3);
    }

    #[test]
    fn test_planar_scales_height_only() {
        let field = bumpy(4, 4);
        let reference_meta = TerrainMeshMetadata::default();
        let mesh = PlanarGenerator::new(4.0).generate_lod(&reference_meta, &field, 1).unwrap();
        let out = rescale_heights(
            &mesh.vertices,
            &reference_meta.with_height_scale(0.5),
            1.0,
            RescaleFrame::Planar,
        )
        .unwrap();
        for (a, b) in out.iter().zip(&mesh.vertices) {
            assert_eq!((a.x, a.z), (b.x, b.z));
            assert_eq!(a.y, b.y * 0.5);
        }
    }

    #[test]
    fn test_meshes_keep_topology() {
        let field = bumpy(8, 8);
        let meta = TerrainMeshMetadata::new(5.0, 1.0, 0, 0, -1);
        let reference = vec![GlobeGenerator.generate_lod(&meta, &field, 1).unwrap()];
        let out = rescale_meshes(&reference, &meta.with_height_scale(2.0), 1.0, RescaleFrame::Globe)
            .unwrap();
        assert_eq!(out[0].indices, reference[0].indices);
        assert_eq!(out[0].uvs, reference[0].uvs);
        assert_ne!(out[0].vertices, reference[0].vertices);
    }

    #[test]
    fn test_zero_reference_scale() {
        let meta = TerrainMeshMetadata::default();
        assert_eq!(
            rescale_heights(&[Vec3::ONE], &meta, 0.0, RescaleFrame::Globe),
            Err(TerrainError::ZeroReferenceScale)
        );
    }
}
