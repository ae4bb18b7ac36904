//! Triangulation and UV layout of regular vertex grids.
//!
//! A grid has `h_count` vertices along x and `v_count` along y. Each unit quad
//! `(x, y)..(x + 1, y + 1)` is split into two triangles:
//!
//! ```text
//!   lt ---- rt
//!   |  \     |
//!   |    \   |
//!   lb ---- rb
//! ```
//!
//! emitted as `(lt, lb, rb)` and `(rb, rt, lt)`.

use glam::Vec2;

use crate::error::MeshError;

/// How grid coordinates map to vertex indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum GridOrder {
    /// `index = y * h_count + x`.
    #[default]
    RowMajor,
    /// `index = x * v_count + y`.
    ColumnMajor,
}

impl GridOrder {
    fn index(self, x: u32, y: u32, h_count: u32, v_count: u32) -> u32 {
        match self {
            Self::RowMajor => y * h_count + x,
            Self::ColumnMajor => x * v_count + y,
        }
    }
}

/// Number of indices produced for an `h_count × v_count` grid.
pub fn triangle_index_count(h_count: u32, v_count: u32) -> usize {
    6 * h_count.saturating_sub(1) as usize * v_count.saturating_sub(1) as usize
}

/// Triangulate a row-major grid.
///
/// `reverse` swaps the second and third vertex of every triangle, flipping
/// the winding.
pub fn triangulate(h_count: u32, v_count: u32, reverse: bool) -> Result<Vec<u32>, MeshError> {
    triangulate_ordered(h_count, v_count, reverse, GridOrder::RowMajor)
}

/// Triangulate a column-major grid. Same quads as [`triangulate`], indexed
/// with the axes swapped.
pub fn triangulate_transposed(
    h_count: u32,
    v_count: u32,
    reverse: bool,
) -> Result<Vec<u32>, MeshError> {
    triangulate_ordered(h_count, v_count, reverse, GridOrder::ColumnMajor)
}

fn triangulate_ordered(
    h_count: u32,
    v_count: u32,
    reverse: bool,
    order: GridOrder,
) -> Result<Vec<u32>, MeshError> {
    check_grid(h_count, v_count)?;

    let mut indices = Vec::with_capacity(triangle_index_count(h_count, v_count));
    for y in 0..v_count - 1 {
        for x in 0..h_count - 1 {
            let lt = order.index(x, y, h_count, v_count);
            let rt = order.index(x + 1, y, h_count, v_count);
            let lb = order.index(x, y + 1, h_count, v_count);
            let rb = order.index(x + 1, y + 1, h_count, v_count);

            if reverse {
                indices.extend_from_slice(&[lt, rb, lb, rb, lt, rt]);
            } else {
                indices.extend_from_slice(&[lt, lb, rb, rb, rt, lt]);
            }
        }
    }
    Ok(indices)
}

fn check_grid(h_count: u32, v_count: u32) -> Result<(), MeshError> {
    if h_count < 2 || v_count < 2 {
        return Err(MeshError::GridTooSmall { h_count, v_count });
    }
    Ok(())
}

/// Placement of grid UVs inside a (possibly larger) texture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvLayout {
    /// Multiplier applied after flipping/mirroring.
    pub scale: Vec2,
    /// Added after scaling.
    pub offset: Vec2,
    /// `v = 1 - y / (v_count - 1)`: bottom-left texture origin.
    pub flip_v: bool,
    /// `u = 1 - x / (h_count - 1)`: for grids emitted from the high column down.
    pub mirror_u: bool,
}

impl Default for UvLayout {
    fn default() -> Self {
        Self {
            scale: Vec2::ONE,
            offset: Vec2::ZERO,
            flip_v: false,
            mirror_u: false,
        }
    }
}

impl UvLayout {
    /// Layout covering the sub-rectangle `offset..offset + scale`.
    pub fn atlas(scale: Vec2, offset: Vec2) -> Self {
        Self {
            scale,
            offset,
            ..Self::default()
        }
    }
}

/// UV of grid vertex `(x, y)`. `h_count` and `v_count` must be at least 2.
pub fn grid_uv(x: u32, y: u32, h_count: u32, v_count: u32, layout: &UvLayout) -> Vec2 {
    let mut u = x as f32 / (h_count - 1) as f32;
    let mut v = y as f32 / (v_count - 1) as f32;
    if layout.mirror_u {
        u = 1.0 - u;
    }
    if layout.flip_v {
        v = 1.0 - v;
    }
    Vec2::new(u, v) * layout.scale + layout.offset
}

/// UVs for every vertex of the grid, in the given index order.
pub fn grid_uvs(
    h_count: u32,
    v_count: u32,
    layout: &UvLayout,
    order: GridOrder,
) -> Result<Vec<Vec2>, MeshError> {
    check_grid(h_count, v_count)?;

    let mut uvs = vec![Vec2::ZERO; h_count as usize * v_count as usize];
    for y in 0..v_count {
        for x in 0..h_count {
            uvs[order.index(x, y, h_count, v_count) as usize] =
                grid_uv(x, y, h_count, v_count, layout);
        }
    }
    Ok(uvs)
}
