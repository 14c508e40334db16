//! Polygon geometry and its text/binary codecs
//!
//! Parsing and validation live here and nowhere else, so storage and
//! transport layers never need to understand geometry grammar.

mod polygon;
mod format;
pub mod wkt;
pub mod wkb;

pub use self::polygon::{LinearRing, Polygon, MIN_RING_POINTS};
pub use self::format::{format_ordinate, format_pair};
