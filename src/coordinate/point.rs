//! Point structure for representing coordinate pairs

/// A coordinate pair in some coordinate system
///
/// In geographic systems `x` is longitude and `y` latitude, both in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// X coordinate (easting, or longitude in geographic systems)
    pub x: f64,
    /// Y coordinate (northing, or latitude in geographic systems)
    pub y: f64,
}

impl Point {
    /// Create a new point
    pub fn new(x: f64, y: f64) -> Self {
        Point { x, y }
    }

    /// True when both ordinates are finite numbers
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Bitwise equality of both ordinates
    pub fn bits_eq(&self, other: &Point) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl From<(f64, f64)> for Point {
    fn from((x, y): (f64, f64)) -> Self {
        Point::new(x, y)
    }
}

impl From<Point> for (f64, f64) {
    fn from(point: Point) -> Self {
        (point.x, point.y)
    }
}
