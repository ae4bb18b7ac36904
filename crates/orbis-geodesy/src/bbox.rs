//! Geographic bounding boxes in longitude/latitude degrees.

use std::fmt;
use std::str::FromStr;

use glam::DVec3;

use crate::direction::direction_from_lat_lon;
use crate::error::GeodesyError;

/// Normalize a longitude into (−180, 180].
pub fn wrap180(lon: f64) -> f64 {
    let wrapped = (lon + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped <= -180.0 { wrapped + 360.0 } else { wrapped }
}

/// A latitude/longitude pair in degrees.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LatLon {
    /// Latitude, positive north.
    pub lat: f64,
    /// Longitude, positive east.
    pub lon: f64,
}

impl LatLon {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Unit direction of this coordinate in the canonical frame.
    pub fn direction(&self) -> DVec3 {
        direction_from_lat_lon(self.lat, self.lon)
    }
}

/// Where the original box stays pinned when [`BoundingBox::expand_to_square`]
/// grows its shorter side.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SquareAnchor {
    TopLeft,
    Top,
    TopRight,
    Left,
    #[default]
    Center,
    Right,
    BottomLeft,
    Bottom,
    BottomRight,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Vertical {
    Top,
    Middle,
    Bottom,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Horizontal {
    Left,
    Middle,
    Right,
}

impl SquareAnchor {
    fn vertical(self) -> Vertical {
        match self {
            Self::TopLeft | Self::Top | Self::TopRight => Vertical::Top,
            Self::Left | Self::Center | Self::Right => Vertical::Middle,
            Self::BottomLeft | Self::Bottom | Self::BottomRight => Vertical::Bottom,
        }
    }

    fn horizontal(self) -> Horizontal {
        match self {
            Self::TopLeft | Self::Left | Self::BottomLeft => Horizontal::Left,
            Self::Top | Self::Center | Self::Bottom => Horizontal::Middle,
            Self::TopRight | Self::Right | Self::BottomRight => Horizontal::Right,
        }
    }

    /// Same horizontal anchoring, pinned to the given vertical edge.
    fn with_vertical(self, vertical: Vertical) -> Self {
        match (vertical, self.horizontal()) {
            (Vertical::Top, Horizontal::Left) => Self::TopLeft,
            (Vertical::Top, Horizontal::Middle) => Self::Top,
            (Vertical::Top, Horizontal::Right) => Self::TopRight,
            (Vertical::Middle, Horizontal::Left) => Self::Left,
            (Vertical::Middle, Horizontal::Middle) => Self::Center,
            (Vertical::Middle, Horizontal::Right) => Self::Right,
            (Vertical::Bottom, Horizontal::Left) => Self::BottomLeft,
            (Vertical::Bottom, Horizontal::Middle) => Self::Bottom,
            (Vertical::Bottom, Horizontal::Right) => Self::BottomRight,
        }
    }
}

/// A rectangle in (longitude, latitude) degrees.
///
/// `lat_start <= lat_end` always holds. Longitudes may be wrapped
/// (`lon_start > lon_end`), in which case the box crosses the ±180° meridian.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    lon_start: f64,
    lat_start: f64,
    lon_end: f64,
    lat_end: f64,
}

impl BoundingBox {
    /// Create a box from its west, south, east and north edges.
    ///
    /// Latitudes are reordered if given north-first.
    pub fn new(lon_start: f64, lat_start: f64, lon_end: f64, lat_end: f64) -> Self {
        Self {
            lon_start,
            lat_start: lat_start.min(lat_end),
            lon_end,
            lat_end: lat_start.max(lat_end),
        }
    }

    /// The whole globe, (−180, −90) to (180, 90).
    pub fn globe() -> Self {
        Self::new(-180.0, -90.0, 180.0, 90.0)
    }

    /// Parse `"lonStart,latStart,lonEnd,latEnd"`.
    pub fn parse(text: &str) -> Result<Self, GeodesyError> {
        let fields: Vec<f64> = text
            .split(',')
            .map(|f| f.trim().parse::<f64>())
            .collect::<Result<_, _>>()
            .map_err(|_| GeodesyError::Parse(text.to_string()))?;
        match fields.as_slice() {
            [lon_start, lat_start, lon_end, lat_end] => {
                Ok(Self::new(*lon_start, *lat_start, *lon_end, *lat_end))
            }
            _ => Err(GeodesyError::Parse(text.to_string())),
        }
    }

    pub fn lon_start(&self) -> f64 {
        self.lon_start
    }

    pub fn lat_start(&self) -> f64 {
        self.lat_start
    }

    pub fn lon_end(&self) -> f64 {
        self.lon_end
    }

    pub fn lat_end(&self) -> f64 {
        self.lat_end
    }

    /// True iff the box crosses the antimeridian (`lon_start > lon_end`).
    pub fn is_longitude_wrapped(&self) -> bool {
        self.lon_start > self.lon_end
    }

    /// Longitudinal extent in degrees, accounting for wrap.
    pub fn lon_swing(&self) -> f64 {
        if self.is_longitude_wrapped() {
            360.0 - (self.lon_start - self.lon_end)
        } else {
            self.lon_end - self.lon_start
        }
    }

    /// Latitudinal extent in degrees.
    pub fn lat_swing(&self) -> f64 {
        self.lat_end - self.lat_start
    }

    /// Center of the box. Longitude is normalized into (−180, 180].
    pub fn median_lat_lon(&self) -> LatLon {
        LatLon {
            lat: (self.lat_start + self.lat_end) / 2.0,
            lon: wrap180(self.lon_start + self.lon_swing() / 2.0),
        }
    }

    /// Unit direction of the box center.
    pub fn median_direction(&self) -> DVec3 {
        self.median_lat_lon().direction()
    }

    /// Equivalent non-wrapped box obtained by moving the west edge 360° west.
    pub fn unwrap_left(&self) -> Self {
        if !self.is_longitude_wrapped() {
            return *self;
        }
        Self {
            lon_start: self.lon_start - 360.0,
            ..*self
        }
    }

    /// Equivalent non-wrapped box obtained by moving the east edge 360° east.
    pub fn unwrap_right(&self) -> Self {
        if !self.is_longitude_wrapped() {
            return *self;
        }
        Self {
            lon_end: self.lon_end + 360.0,
            ..*self
        }
    }

    /// Grow the shorter swing until both swings match.
    ///
    /// The original box stays pinned at `anchor`. Fails with
    /// [`GeodesyError::LatitudeOutOfRange`] if vertical growth would cross a pole.
    pub fn expand_to_square(&self, anchor: SquareAnchor) -> Result<Self, GeodesyError> {
        let lon_swing = self.lon_swing();
        let lat_swing = self.lat_swing();

        if lon_swing > lat_swing {
            let grow = lon_swing - lat_swing;
            let (south, north) = match anchor.vertical() {
                Vertical::Top => (self.lat_start - grow, self.lat_end),
                Vertical::Middle => (self.lat_start - grow / 2.0, self.lat_end + grow / 2.0),
                Vertical::Bottom => (self.lat_start, self.lat_end + grow),
            };
            if south < -90.0 || north > 90.0 {
                return Err(GeodesyError::LatitudeOutOfRange {
                    lat_start: south,
                    lat_end: north,
                });
            }
            Ok(Self::new(self.lon_start, south, self.lon_end, north))
        } else if lat_swing > lon_swing {
            let grow = lat_swing - lon_swing;
            let (west, east) = match anchor.horizontal() {
                Horizontal::Left => (self.lon_start, self.lon_end + grow),
                Horizontal::Middle => (self.lon_start - grow / 2.0, self.lon_end + grow / 2.0),
                Horizontal::Right => (self.lon_start - grow, self.lon_end),
            };
            Ok(Self::new(wrap180(west), self.lat_start, wrap180(east), self.lat_end))
        } else {
            Ok(*self)
        }
    }

    /// [`expand_to_square`](Self::expand_to_square), retrying anchored at the
    /// bottom or top edge when the requested anchor overflows a pole.
    pub fn expand_to_square_clamped(&self, anchor: SquareAnchor) -> Result<Self, GeodesyError> {
        match self.expand_to_square(anchor) {
            Err(GeodesyError::LatitudeOutOfRange { lat_start, .. }) => {
                let edge = if lat_start < -90.0 {
                    Vertical::Bottom
                } else {
                    Vertical::Top
                };
                self.expand_to_square(anchor.with_vertical(edge))
            }
            other => other,
        }
    }

    /// Map normalized `(u, v)` to a coordinate inside the box. `v = 0` is the
    /// northern edge.
    pub fn uv_to_coordinates(&self, u: f64, v: f64) -> LatLon {
        LatLon {
            lat: self.lat_end - v * self.lat_swing(),
            lon: wrap180(self.lon_start + u * self.lon_swing()),
        }
    }

    /// Inverse of [`uv_to_coordinates`](Self::uv_to_coordinates). Returns `(u, v)`.
    pub fn coordinates_to_uv(&self, coord: LatLon) -> (f64, f64) {
        let u = (coord.lon - self.lon_start).rem_euclid(360.0) / self.lon_swing();
        let v = (self.lat_end - coord.lat) / self.lat_swing();
        (u, v)
    }

    /// Real-world size of the box on a sphere of `radius`: the larger of the
    /// chord across the latitude nearest the equator and the chord along the
    /// median longitude.
    pub fn largest_dimension(&self, radius: f64) -> Result<f64, GeodesyError> {
        let lon_swing = self.lon_swing();
        if lon_swing > 180.0 {
            return Err(GeodesyError::SwingTooLarge { lon_swing });
        }

        let equatorial_lat = if self.lat_start <= 0.0 && self.lat_end >= 0.0 {
            0.0
        } else if self.lat_start > 0.0 {
            self.lat_start
        } else {
            self.lat_end
        };
        let west = direction_from_lat_lon(equatorial_lat, self.lon_start) * radius;
        let east = direction_from_lat_lon(equatorial_lat, self.lon_start + lon_swing) * radius;

        let median_lon = self.median_lat_lon().lon;
        let south = direction_from_lat_lon(self.lat_start, median_lon) * radius;
        let north = direction_from_lat_lon(self.lat_end, median_lon) * radius;

        Ok(west.distance(east).max(south.distance(north)))
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{},{},{},{}",
            self.lon_start, self.lat_start, self.lon_end, self.lat_end
        )
    }
}

impl FromStr for BoundingBox {
    type Err = GeodesyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-9;

    const ALL_ANCHORS: [SquareAnchor; 9] = [
        SquareAnchor::TopLeft,
        SquareAnchor::Top,
        SquareAnchor::TopRight,
        SquareAnchor::Left,
        SquareAnchor::Center,
        SquareAnchor::Right,
        SquareAnchor::BottomLeft,
        SquareAnchor::Bottom,
        SquareAnchor::BottomRight,
    ];

    #[test]
    fn test_wrap180() {
        assert_eq!(wrap180(0.0), 0.0);
        assert_eq!(wrap180(180.0), 180.0);
        assert_eq!(wrap180(-180.0), 180.0);
        assert!((wrap180(190.0) - -170.0).abs() < EPSILON);
        assert!((wrap180(-190.0) - 170.0).abs() < EPSILON);
        assert!((wrap180(540.0) - 180.0).abs() < EPSILON);
    }

    #[test]
    fn test_parse_and_display_round_trip() {
        let boxes = [
            BoundingBox::new(6.9, 3.1, 42.0, 25.0),
            BoundingBox::new(-135.0, -90.0, 45.0, 0.0),
            BoundingBox::new(170.5, -12.25, -170.5, 8.75),
        ];
        for bbox in boxes {
            let parsed: BoundingBox = bbox.to_string().parse().unwrap();
            assert_eq!(parsed, bbox);
        }
    }

    #[test]
    fn test_parse_tolerates_whitespace() {
        let bbox = BoundingBox::parse(" 1, 2 ,3,4 ").unwrap();
        assert_eq!(bbox, BoundingBox::new(1.0, 2.0, 3.0, 4.0));
    }

    #[test]
    fn test_parse_rejects_malformed_text() {
        assert!(BoundingBox::parse("1,2,3").is_err());
        assert!(BoundingBox::parse("1,2,3,4,5").is_err());
        assert!(BoundingBox::parse("a,b,c,d").is_err());
        assert!(BoundingBox::parse("").is_err());
    }

    #[test]
    fn test_reversed_longitudes_parse_as_wrapped_complement() {
        // Only the latitude pair is order-independent. A reversed longitude
        // pair is a legitimate antimeridian-crossing box, so its swing is the
        // complement of the forward box's swing rather than equal to it.
        let forward = BoundingBox::parse("10,-5,20,15").unwrap();
        let reversed = BoundingBox::parse("20,15,10,-5").unwrap();
        // Latitudes are reordered, so the vertical extent is unchanged.
        assert_eq!(reversed.lat_start(), forward.lat_start());
        assert_eq!(reversed.lat_swing(), forward.lat_swing());
        // The reversed longitudes denote the complementary, wrapped region.
        assert!(reversed.is_longitude_wrapped());
        assert!((reversed.lon_swing() - (360.0 - forward.lon_swing())).abs() < EPSILON);
    }

    #[test]
    fn test_median_lat_lon() {
        let m = BoundingBox::new(6.9, 3.1, 42.0, 25.0).median_lat_lon();
        assert!((m.lat - 14.05).abs() < 1e-9, "lat {}", m.lat);
        assert!((m.lon - 24.45).abs() < 1e-9, "lon {}", m.lon);

        let m = BoundingBox::new(-135.0, -90.0, 45.0, 0.0).median_lat_lon();
        assert!((m.lat - -45.0).abs() < EPSILON);
        assert!((m.lon - -45.0).abs() < EPSILON);
    }

    #[test]
    fn test_median_of_wrapped_box() {
        let bbox = BoundingBox::new(170.0, 0.0, -170.0, 10.0);
        assert!(bbox.is_longitude_wrapped());
        assert!((bbox.lon_swing() - 20.0).abs() < EPSILON);
        let m = bbox.median_lat_lon();
        assert!((m.lon - 180.0).abs() < EPSILON, "lon {}", m.lon);
    }

    #[test]
    fn test_unwrap_preserves_swing() {
        let bbox = BoundingBox::new(160.0, -5.0, -150.0, 5.0);
        let left = bbox.unwrap_left();
        let right = bbox.unwrap_right();
        assert!(!left.is_longitude_wrapped());
        assert!(!right.is_longitude_wrapped());
        assert_eq!(left.lon_start(), -200.0);
        assert_eq!(right.lon_end(), 210.0);
        assert!((left.lon_swing() - bbox.lon_swing()).abs() < EPSILON);
        assert!((right.lon_swing() - bbox.lon_swing()).abs() < EPSILON);
    }

    #[test]
    fn test_unwrap_is_identity_for_plain_box() {
        let bbox = BoundingBox::new(10.0, 0.0, 20.0, 5.0);
        assert_eq!(bbox.unwrap_left(), bbox);
        assert_eq!(bbox.unwrap_right(), bbox);
    }

    #[test]
    fn test_expand_to_square_equalizes_swings() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 40.0, 10.0),
            BoundingBox::new(-20.0, -30.0, -10.0, 30.0),
            BoundingBox::new(175.0, 10.0, -175.0, 40.0),
            BoundingBox::new(5.0, 5.0, 15.0, 15.0),
        ];
        for bbox in boxes {
            for anchor in ALL_ANCHORS {
                let square = bbox.expand_to_square(anchor).unwrap();
                assert!(
                    (square.lon_swing() - square.lat_swing()).abs() < 1e-9,
                    "{bbox} {anchor:?} -> {square}"
                );
                assert!(square.lon_swing() >= bbox.lon_swing() - 1e-9);
                assert!(square.lat_swing() >= bbox.lat_swing() - 1e-9);
            }
        }
    }

    #[test]
    fn test_expand_to_square_anchors() {
        let bbox = BoundingBox::new(0.0, 0.0, 40.0, 10.0);
        let top = bbox.expand_to_square(SquareAnchor::Top).unwrap();
        assert_eq!((top.lat_start(), top.lat_end()), (-30.0, 10.0));
        let bottom = bbox.expand_to_square(SquareAnchor::BottomLeft).unwrap();
        assert_eq!((bottom.lat_start(), bottom.lat_end()), (0.0, 40.0));
        let center = bbox.expand_to_square(SquareAnchor::Center).unwrap();
        assert_eq!((center.lat_start(), center.lat_end()), (-15.0, 25.0));

        let tall = BoundingBox::new(0.0, 0.0, 10.0, 30.0);
        let right = tall.expand_to_square(SquareAnchor::Right).unwrap();
        assert_eq!((right.lon_start(), right.lon_end()), (-20.0, 10.0));
        let left = tall.expand_to_square(SquareAnchor::TopLeft).unwrap();
        assert_eq!((left.lon_start(), left.lon_end()), (0.0, 30.0));
    }

    #[test]
    fn test_expand_to_square_can_wrap_longitude() {
        let tall = BoundingBox::new(170.0, 0.0, 175.0, 30.0);
        let square = tall.expand_to_square(SquareAnchor::Left).unwrap();
        assert!(square.is_longitude_wrapped());
        assert!((square.lon_swing() - 30.0).abs() < EPSILON);
    }

    #[test]
    fn test_expand_to_square_rejects_pole_overflow() {
        let bbox = BoundingBox::new(0.0, 70.0, 60.0, 80.0);
        let err = bbox.expand_to_square(SquareAnchor::Center).unwrap_err();
        assert!(matches!(err, GeodesyError::LatitudeOutOfRange { .. }));
    }

    #[test]
    fn test_expand_to_square_clamped_retries_at_edge() {
        let north = BoundingBox::new(0.0, 70.0, 60.0, 80.0);
        let square = north.expand_to_square_clamped(SquareAnchor::Center).unwrap();
        assert_eq!((square.lat_start(), square.lat_end()), (20.0, 80.0));

        let south = BoundingBox::new(0.0, -80.0, 60.0, -70.0);
        let square = south.expand_to_square_clamped(SquareAnchor::Center).unwrap();
        assert_eq!((square.lat_start(), square.lat_end()), (-80.0, -20.0));
    }

    #[test]
    fn test_uv_coordinate_mapping() {
        let bbox = BoundingBox::new(10.0, -20.0, 30.0, 20.0);
        let nw = bbox.uv_to_coordinates(0.0, 0.0);
        assert_eq!((nw.lat, nw.lon), (20.0, 10.0));
        let se = bbox.uv_to_coordinates(1.0, 1.0);
        assert_eq!((se.lat, se.lon), (-20.0, 30.0));

        let (u, v) = bbox.coordinates_to_uv(LatLon::new(0.0, 20.0));
        assert!((u - 0.5).abs() < EPSILON && (v - 0.5).abs() < EPSILON);
    }

    #[test]
    fn test_uv_mapping_across_antimeridian() {
        let bbox = BoundingBox::new(170.0, 0.0, -170.0, 10.0);
        let (u, _) = bbox.coordinates_to_uv(LatLon::new(5.0, -175.0));
        assert!((u - 0.75).abs() < EPSILON, "u {u}");
        let c = bbox.uv_to_coordinates(0.75, 0.5);
        assert!((c.lon - -175.0).abs() < EPSILON);
    }

    #[test]
    fn test_largest_dimension() {
        // 90 degrees of equator on a unit sphere: chord = sqrt(2).
        let bbox = BoundingBox::new(0.0, 0.0, 90.0, 10.0);
        let size = bbox.largest_dimension(1.0).unwrap();
        assert!((size - 2f64.sqrt()).abs() < 1e-9, "size {size}");

        // Tall box: the meridian chord dominates.
        let tall = BoundingBox::new(0.0, -60.0, 10.0, 60.0);
        let size = tall.largest_dimension(2.0).unwrap();
        let expected = 2.0 * 2.0 * (60f64).to_radians().sin();
        assert!((size - expected).abs() < 1e-9, "size {size}");
    }

    #[test]
    fn test_largest_dimension_rejects_wide_boxes() {
        let bbox = BoundingBox::new(-100.0, 0.0, 100.0, 10.0);
        assert!(matches!(
            bbox.largest_dimension(1.0),
            Err(GeodesyError::SwingTooLarge { .. })
        ));
    }
}
