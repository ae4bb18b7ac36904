//! Terrain mesh buffers and regular-grid topology: triangle index lists and
//! UV layouts for M×N vertex grids.

pub mod mesh_data;
pub mod topology;

mod error;

pub use error::MeshError;
pub use mesh_data::{MeshData, TerrainVertex};
pub use topology::{
    GridOrder, UvLayout, grid_uv, grid_uvs, triangle_index_count, triangulate,
    triangulate_transposed,
};
