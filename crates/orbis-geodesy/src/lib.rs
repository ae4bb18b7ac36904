//! Geodesy helpers for terrain sections: geographic bounding boxes, lat/lon to
//! direction conversion, and texture-atlas UV mapping.
//!
//! All angles are degrees at the API boundary. Radians only appear where a
//! trigonometric function is applied.

mod bbox;
mod direction;
mod error;
mod uv;

pub use bbox::{BoundingBox, LatLon, SquareAnchor, wrap180};
pub use direction::{
    LONGITUDE_OFFSET_DEG, direction_from_lat_lon, forward_rotation, lat_lon_from_direction,
    sphere_point,
};
pub use error::GeodesyError;
pub use uv::{UvBounds, calculate_uv_bounds, calculate_uv_scale_offset};
