pub mod errors;
pub mod io;
pub mod geometry;
pub mod coordinate;
pub mod config;
pub mod store;
pub mod utils;
pub mod commands;
pub mod api;

pub use crate::api::{OutputFormat, TransformRequest, TransformService, TransformStage};

pub use errors::{GeoError, GeoResult};
pub use geometry::{LinearRing, Polygon};
pub use coordinate::{BoundingBox, Point, CoordinateTransformer, CrsRegistry, SpatialReference};
pub use store::{InMemoryPolygonStore, NewPolygon, PolygonRecord, PolygonStore, PolygonUpdate};
