//! Polygon and linear ring value types

use crate::coordinate::{BoundingBox, Point};
use crate::errors::{GeoError, GeoResult};

/// Minimum number of coordinate pairs in a ring (3 distinct vertices + closing point)
pub const MIN_RING_POINTS: usize = 4;

/// A closed sequence of coordinate pairs
#[derive(Debug, Clone, PartialEq)]
pub struct LinearRing {
    points: Vec<Point>,
}

impl LinearRing {
    /// Create a ring, checking the minimum size, finiteness and exact closure
    pub fn new(points: Vec<Point>) -> GeoResult<Self> {
        if points.len() < MIN_RING_POINTS {
            return Err(GeoError::MalformedGeometry(format!(
                "ring has {} points, at least {} are required",
                points.len(), MIN_RING_POINTS
            )));
        }

        if let Some(p) = points.iter().find(|p| !p.is_finite()) {
            return Err(GeoError::MalformedGeometry(format!(
                "ring contains non-finite coordinate ({}, {})", p.x, p.y
            )));
        }

        let first = points[0];
        let last = points[points.len() - 1];
        if first != last {
            return Err(GeoError::MalformedGeometry(format!(
                "ring is not closed: first point ({}, {}) differs from last point ({}, {})",
                first.x, first.y, last.x, last.y
            )));
        }

        Ok(LinearRing { points })
    }

    /// Coordinate pairs, closing point included
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Number of coordinate pairs, closing point included
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Rings are never empty; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the first and last points are equal, using the same test as `new`
    pub fn is_closed(&self) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) => first == last,
            _ => false,
        }
    }
}

/// A polygon: exterior ring followed by zero or more holes
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    rings: Vec<LinearRing>,
}

impl Polygon {
    /// Create a polygon from at least one ring
    pub fn new(rings: Vec<LinearRing>) -> GeoResult<Self> {
        if rings.is_empty() {
            return Err(GeoError::MalformedGeometry("polygon has no rings".to_string()));
        }
        Ok(Polygon { rings })
    }

    /// Build a polygon from raw coordinate rings
    pub fn from_coords(rings: Vec<Vec<(f64, f64)>>) -> GeoResult<Self> {
        let rings = rings.into_iter()
            .map(|ring| LinearRing::new(ring.into_iter().map(Point::from).collect()))
            .collect::<GeoResult<Vec<_>>>()?;
        Polygon::new(rings)
    }

    /// Exterior boundary
    pub fn exterior(&self) -> &LinearRing {
        &self.rings[0]
    }

    /// Interior rings
    pub fn holes(&self) -> &[LinearRing] {
        &self.rings[1..]
    }

    /// All rings, exterior first
    pub fn rings(&self) -> &[LinearRing] {
        &self.rings
    }

    /// Total number of coordinate pairs over all rings
    pub fn vertex_count(&self) -> usize {
        self.rings.iter().map(|r| r.len()).sum()
    }

    /// Bounding box of the exterior ring
    pub fn envelope(&self) -> BoundingBox {
        // A validated exterior ring always has points
        BoundingBox::from_points(self.exterior().points())
            .unwrap_or_else(|| BoundingBox::new(0.0, 0.0, 0.0, 0.0))
    }
}
