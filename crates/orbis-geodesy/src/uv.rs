//! Placement of a child region inside a parent's texture atlas.

use glam::DVec2;

use crate::bbox::BoundingBox;

/// The sub-rectangle `(u1, v1)..(u2, v2)` a region occupies inside a parent
/// texture. `v` grows southwards, so `v1` is the northern edge.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct UvBounds {
    pub u1: f64,
    pub v1: f64,
    pub u2: f64,
    pub v2: f64,
}

impl Default for UvBounds {
    /// The whole atlas.
    fn default() -> Self {
        Self {
            u1: 0.0,
            v1: 0.0,
            u2: 1.0,
            v2: 1.0,
        }
    }
}

impl UvBounds {
    pub fn new(u1: f64, v1: f64, u2: f64, v2: f64) -> Self {
        Self { u1, v1, u2, v2 }
    }

    /// Size of the rectangle in UV space.
    pub fn scale(&self) -> DVec2 {
        DVec2::new(self.u2 - self.u1, self.v2 - self.v1)
    }

    /// Top-left corner of the rectangle in UV space.
    pub fn offset(&self) -> DVec2 {
        DVec2::new(self.u1, self.v1)
    }

    /// Map a local `[0, 1]²` coordinate into the rectangle.
    pub fn apply(&self, local: DVec2) -> DVec2 {
        local * self.scale() + self.offset()
    }
}

/// Where `child` lies in `parent`'s texture space.
///
/// Equal boxes map to the whole atlas. Longitude offsets are measured
/// eastwards modulo 360°, so wrapped and unwrapped representations of the
/// same region agree. A child starting in the western half of the longitudes
/// the parent does not cover gets a negative `u1`.
pub fn calculate_uv_bounds(parent: &BoundingBox, child: &BoundingBox) -> UvBounds {
    if parent == child {
        return UvBounds::default();
    }

    let lon_swing = parent.lon_swing();
    let lat_swing = parent.lat_swing();

    let u1 = lon_offset(parent, child.lon_start()) / lon_swing;
    let u2 = u1 + child.lon_swing() / lon_swing;
    let v1 = (parent.lat_end() - child.lat_end()) / lat_swing;
    let v2 = (parent.lat_end() - child.lat_start()) / lat_swing;

    UvBounds { u1, v1, u2, v2 }
}

/// Eastward distance in degrees from `parent`'s west edge to `lon`, signed so
/// that longitudes just west of the parent come out negative.
fn lon_offset(parent: &BoundingBox, lon: f64) -> f64 {
    let offset = (lon - parent.lon_start()).rem_euclid(360.0);
    let gap_middle = parent.lon_swing() + (360.0 - parent.lon_swing()) / 2.0;
    if offset > gap_middle { offset - 360.0 } else { offset }
}

/// `(scale, offset)` texture transform for drawing `child` with `parent`'s
/// texture. A wrapped child is unwrapped eastwards first.
pub fn calculate_uv_scale_offset(parent: &BoundingBox, child: &BoundingBox) -> (DVec2, DVec2) {
    let child = if child.is_longitude_wrapped() {
        child.unwrap_right()
    } else {
        *child
    };
    let bounds = calculate_uv_bounds(parent, &child);
    (bounds.scale(), bounds.offset())
}
