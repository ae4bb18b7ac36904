//! Mesh error types.

/// Errors raised while building or validating mesh buffers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    /// A grid needs at least two vertices along each axis.
    #[error("grid of {h_count}x{v_count} vertices is too small, need at least 2x2")]
    GridTooSmall { h_count: u32, v_count: u32 },

    /// The index buffer does not describe whole triangles.
    #[error("index count {0} is not a multiple of 3")]
    PartialTriangle(usize),

    /// An index points past the vertex buffer.
    #[error("index {index} out of range for {vertex_count} vertices")]
    IndexOutOfRange { index: u32, vertex_count: usize },

    /// UV and vertex buffers differ in length.
    #[error("{uvs} UVs for {vertices} vertices")]
    UvCountMismatch { uvs: usize, vertices: usize },
}
