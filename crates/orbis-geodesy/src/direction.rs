//! Conversions between latitude/longitude and unit directions.
//!
//! The canonical frame is right-handed with +Y up and +Z forward. The
//! direction of (0°, 0°) is +Z, the north pole is +Y, and positive (east)
//! longitudes rotate towards −X.

use glam::{DQuat, DVec3};

use crate::bbox::BoundingBox;

/// Offset between longitude and the azimuth of [`sphere_point`].
///
/// The parametric sphere measures azimuth from +X, so longitude 0 (which must
/// face +Z) sits a quarter turn away.
pub const LONGITUDE_OFFSET_DEG: f64 = 90.0;

/// Unit direction for a latitude/longitude pair in degrees.
///
/// Rotates the forward vector (+Z) by −latitude around X, then by −longitude
/// around Y.
pub fn direction_from_lat_lon(lat: f64, lon: f64) -> DVec3 {
    let rotation =
        DQuat::from_rotation_y(-lon.to_radians()) * DQuat::from_rotation_x(-lat.to_radians());
    rotation * DVec3::Z
}

/// Inverse of [`direction_from_lat_lon`]. Returns `(lat, lon)` in degrees.
///
/// `dir` does not need to be normalized. The longitude at the poles is 0.
pub fn lat_lon_from_direction(dir: DVec3) -> (f64, f64) {
    let dir = dir.normalize_or_zero();
    let lat = dir.y.clamp(-1.0, 1.0).asin().to_degrees();
    let lon = if dir.x.abs() < 1e-12 && dir.z.abs() < 1e-12 {
        0.0
    } else {
        (-dir.x).atan2(dir.z).to_degrees()
    };
    (lat, lon)
}

/// Point on the unit sphere using the parametric form
/// `(cos(lat)·cos(az), sin(lat), cos(lat)·sin(az))`.
///
/// With `azimuth = lon + LONGITUDE_OFFSET_DEG` this equals
/// [`direction_from_lat_lon`].
pub fn sphere_point(lat: f64, azimuth: f64) -> DVec3 {
    let (sin_lat, cos_lat) = lat.to_radians().sin_cos();
    let (sin_az, cos_az) = azimuth.to_radians().sin_cos();
    DVec3::new(cos_lat * cos_az, sin_lat, cos_lat * sin_az)
}

/// Rotation that carries the median direction of `bbox` onto +Z.
///
/// Applied to section patches so every patch faces forward regardless of
/// where on the globe it lies.
pub fn forward_rotation(bbox: &BoundingBox) -> DQuat {
    let median = bbox.median_lat_lon();
    DQuat::from_rotation_x(median.lat.to_radians()) * DQuat::from_rotation_y(median.lon.to_radians())
}
