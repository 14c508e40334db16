//! Coordinate transformation between spatial references

use log::debug;

use super::crs::SpatialReference;
use super::point::Point;
use crate::errors::GeoResult;
use crate::geometry::{LinearRing, Polygon};

/// Transformer for converting between coordinate systems
///
/// Every pair goes through geographic longitude/latitude: the source
/// projection's inverse, then the target projection's forward. No datum
/// shift is applied between different ellipsoids.
#[derive(Debug, Default, Clone, Copy)]
pub struct CoordinateTransformer;

impl CoordinateTransformer {
    /// Create a transformer
    pub fn new() -> Self {
        CoordinateTransformer
    }

    /// Transform a point between coordinate systems
    pub fn transform_point(
        &self,
        source: &SpatialReference,
        target: &SpatialReference,
        point: Point,
    ) -> GeoResult<Point> {
        if source.code() == target.code() {
            return Ok(point);
        }

        let lonlat = source.projection().inverse(point)?;
        target.projection().forward(lonlat)
    }

    /// Transform every vertex of every ring, preserving order and closure
    ///
    /// The closing vertex of each ring reuses the transformed first vertex,
    /// so output rings are closed bit for bit.
    pub fn transform_polygon(
        &self,
        polygon: &Polygon,
        source: &SpatialReference,
        target: &SpatialReference,
    ) -> GeoResult<Polygon> {
        if source.code() == target.code() {
            return Ok(polygon.clone());
        }

        debug!("Transforming {} vertices from {} to {}", polygon.vertex_count(), source, target);

        let rings = polygon.rings()
            .iter()
            .map(|ring| self.transform_ring(ring, source, target))
            .collect::<GeoResult<Vec<_>>>()?;

        Polygon::new(rings)
    }

    fn transform_ring(
        &self,
        ring: &LinearRing,
        source: &SpatialReference,
        target: &SpatialReference,
    ) -> GeoResult<LinearRing> {
        let points = ring.points();
        let last = points.len() - 1;

        let mut out = Vec::with_capacity(points.len());
        for p in &points[..last] {
            out.push(self.transform_point(source, target, *p)?);
        }
        let first = out[0];
        out.push(first);

        LinearRing::new(out)
    }
}
