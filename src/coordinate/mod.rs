//! Coordinate handling for geospatial data
//!
//! This module provides coordinate reference system definitions, the
//! registry that resolves them, the projection mathematics and the
//! transformer applying them to points and polygons.

mod bbox;
mod point;
mod ellipsoid;
mod projection;
mod crs;
mod definitions;
mod registry;
mod transform;
#[cfg(test)]
mod tests;

// Re-export key types
pub use self::bbox::BoundingBox;
pub use self::point::Point;
pub use self::ellipsoid::Ellipsoid;
pub use self::projection::{normalize_longitude, Projection, TransverseMercator, TransverseMercatorParams};
pub use self::crs::{format_crs_code, parse_crs_code, CrsDefinition, CrsKind, SpatialReference, Units};
pub use self::definitions::{CrsDefinitionTable, BUILTIN_DEFINITIONS};
pub use self::registry::CrsRegistry;
pub use self::transform::CoordinateTransformer;
