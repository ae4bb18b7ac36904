//! Geodesy error types.

/// Errors raised by bounding-box operations.
///
/// Numeric input is otherwise not validated: out-of-range latitudes and
/// longitudes produce meaningless but finite results.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GeodesyError {
    /// The text was not four comma-separated numbers.
    #[error("invalid bounding box '{0}': expected four comma-separated numbers")]
    Parse(String),

    /// Square expansion pushed the box past a pole.
    #[error("square expansion leaves latitude range [{lat_start}, {lat_end}] outside [-90, 90]")]
    LatitudeOutOfRange { lat_start: f64, lat_end: f64 },

    /// The operation is only defined for boxes spanning at most 180 degrees of longitude.
    #[error("longitude swing of {lon_swing} degrees exceeds 180")]
    SwingTooLarge { lon_swing: f64 },
}
