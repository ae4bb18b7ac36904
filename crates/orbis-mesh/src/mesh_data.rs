//! Per-LOD terrain mesh buffers.

use glam::{Vec2, Vec3};

use crate::error::MeshError;

/// Interleaved vertex ready for GPU upload (20 bytes).
///
/// Layout:
///   - `[0..12]`  position `[f32; 3]`
///   - `[12..20]` uv `[f32; 2]`
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct TerrainVertex {
    pub position: [f32; 3],
    pub uv: [f32; 2],
}

static_assertions::assert_eq_size!(TerrainVertex, [u8; 20]);

/// One level of detail of a terrain mesh.
///
/// `uvs` is parallel to `vertices`; `indices` holds three entries per
/// triangle, each referencing `vertices`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub vertices: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn new(vertices: Vec<Vec3>, uvs: Vec<Vec2>, indices: Vec<u32>) -> Self {
        Self {
            vertices,
            uvs,
            indices,
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Check the buffer invariants: whole triangles, in-range indices, and
    /// one UV per vertex.
    pub fn validate(&self) -> Result<(), MeshError> {
        if self.indices.len() % 3 != 0 {
            return Err(MeshError::PartialTriangle(self.indices.len()));
        }
        if self.uvs.len() != self.vertices.len() {
            return Err(MeshError::UvCountMismatch {
                uvs: self.uvs.len(),
                vertices: self.vertices.len(),
            });
        }
        if let Some(&index) = self
            .indices
            .iter()
            .find(|&&i| i as usize >= self.vertices.len())
        {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count: self.vertices.len(),
            });
        }
        Ok(())
    }

    /// Axis-aligned bounds of the vertices, or `None` for an empty mesh.
    pub fn bounds(&self) -> Option<(Vec3, Vec3)> {
        let first = *self.vertices.first()?;
        Some(
            self.vertices
                .iter()
                .fold((first, first), |(lo, hi), &v| (lo.min(v), hi.max(v))),
        )
    }

    /// Interleave positions and UVs for upload.
    pub fn to_interleaved(&self) -> Vec<TerrainVertex> {
        self.vertices
            .iter()
            .zip(&self.uvs)
            .map(|(p, uv)| TerrainVertex {
                position: p.to_array(),
                uv: uv.to_array(),
            })
            .collect()
    }

    /// The index buffer as raw bytes.
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }
}
