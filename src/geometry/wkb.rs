//! Extended Well-Known Binary codec for polygons
//!
//! EWKB is the form PostGIS stores and returns geometry columns in: plain
//! WKB with an optional SRID carried after the geometry type when the
//! `0x20000000` flag is set. Only 2D polygons are accepted.

use std::io::{self, Cursor, Read};
use log::debug;

use super::polygon::{LinearRing, Polygon};
use crate::coordinate::Point;
use crate::errors::{GeoError, GeoResult};
use crate::io::byte_order::ByteOrder;

/// WKB geometry type code for Polygon
pub const WKB_POLYGON: u32 = 3;
/// EWKB flag marking an embedded SRID
pub const EWKB_SRID_FLAG: u32 = 0x2000_0000;
const EWKB_Z_FLAG: u32 = 0x8000_0000;
const EWKB_M_FLAG: u32 = 0x4000_0000;

/// Encode a polygon as EWKB; the SRID is embedded when given
pub fn encode_ewkb(polygon: &Polygon, srid: Option<u32>, order: ByteOrder) -> GeoResult<Vec<u8>> {
    let handler = order.create_handler();
    let mut buf: Vec<u8> = Vec::with_capacity(13 + polygon.vertex_count() * 16);

    buf.push(order.flag());
    match srid {
        Some(srid) => {
            handler.write_u32(&mut buf, WKB_POLYGON | EWKB_SRID_FLAG)?;
            handler.write_u32(&mut buf, srid)?;
        }
        None => handler.write_u32(&mut buf, WKB_POLYGON)?,
    }

    handler.write_u32(&mut buf, polygon.rings().len() as u32)?;
    for ring in polygon.rings() {
        handler.write_u32(&mut buf, ring.len() as u32)?;
        for p in ring.points() {
            handler.write_f64(&mut buf, p.x)?;
            handler.write_f64(&mut buf, p.y)?;
        }
    }

    Ok(buf)
}

/// Decode an EWKB polygon, returning it with its SRID
///
/// A missing embedded SRID falls back to `default_srid`.
pub fn decode_ewkb(bytes: &[u8], default_srid: u32) -> GeoResult<(Polygon, u32)> {
    let (polygon, srid) = decode_ewkb_with_srid(bytes)?;
    Ok((polygon, srid.unwrap_or(default_srid)))
}

/// Decode an EWKB polygon along with its embedded SRID, if any
pub fn decode_ewkb_with_srid(bytes: &[u8]) -> GeoResult<(Polygon, Option<u32>)> {
    let mut cursor = Cursor::new(bytes);
    let order = ByteOrder::detect(&mut cursor)?;
    let handler = order.create_handler();

    let geometry_type = handler.read_u32(&mut cursor).map_err(truncated)?;
    if geometry_type & (EWKB_Z_FLAG | EWKB_M_FLAG) != 0 {
        return Err(GeoError::MalformedGeometry("only 2D polygons are supported".to_string()));
    }
    let base_type = geometry_type & !EWKB_SRID_FLAG;
    if base_type != WKB_POLYGON {
        return Err(GeoError::MalformedGeometry(format!(
            "expected WKB geometry type {} (Polygon), found {}", WKB_POLYGON, base_type
        )));
    }

    let srid = if geometry_type & EWKB_SRID_FLAG != 0 {
        Some(handler.read_u32(&mut cursor).map_err(truncated)?)
    } else {
        None
    };

    let ring_count = handler.read_u32(&mut cursor).map_err(truncated)? as usize;
    check_remaining(&cursor, ring_count, 4)?;

    let mut rings = Vec::with_capacity(ring_count);
    for _ in 0..ring_count {
        let point_count = handler.read_u32(&mut cursor).map_err(truncated)? as usize;
        check_remaining(&cursor, point_count, 16)?;

        let mut points = Vec::with_capacity(point_count);
        for _ in 0..point_count {
            let x = handler.read_f64(&mut cursor).map_err(truncated)?;
            let y = handler.read_f64(&mut cursor).map_err(truncated)?;
            points.push(Point::new(x, y));
        }
        rings.push(LinearRing::new(points)?);
    }

    let mut rest = Vec::new();
    cursor.read_to_end(&mut rest)?;
    if !rest.is_empty() {
        return Err(GeoError::MalformedGeometry(format!(
            "{} trailing bytes after polygon", rest.len()
        )));
    }

    debug!("Decoded {} EWKB polygon with {} ring(s), SRID {:?}", order.name(), rings.len(), srid);
    Ok((Polygon::new(rings)?, srid))
}

/// Encode a polygon as uppercase hex EWKB
pub fn encode_ewkb_hex(polygon: &Polygon, srid: Option<u32>, order: ByteOrder) -> GeoResult<String> {
    Ok(to_hex(&encode_ewkb(polygon, srid, order)?))
}

/// Decode a hex EWKB polygon
pub fn decode_ewkb_hex(text: &str, default_srid: u32) -> GeoResult<(Polygon, u32)> {
    decode_ewkb(&from_hex(text)?, default_srid)
}

/// Uppercase hex encoding of a byte slice
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Decode a hex string (either case) into bytes
pub fn from_hex(text: &str) -> GeoResult<Vec<u8>> {
    Ok(hex::decode(text.trim())?)
}

/// Whether text looks like hex EWKB rather than WKT
pub fn looks_like_hex(text: &str) -> bool {
    let text = text.trim();
    (text.starts_with("00") || text.starts_with("01"))
        && text.chars().all(|c| c.is_ascii_hexdigit())
}

/// Reject counts that cannot fit in the bytes left
fn check_remaining(cursor: &Cursor<&[u8]>, count: usize, item_size: usize) -> GeoResult<()> {
    let remaining = cursor.get_ref().len().saturating_sub(cursor.position() as usize);
    if count.saturating_mul(item_size) > remaining {
        return Err(GeoError::MalformedGeometry(format!(
            "declared {} items but only {} bytes remain", count, remaining
        )));
    }
    Ok(())
}

fn truncated(_: io::Error) -> GeoError {
    GeoError::MalformedGeometry("truncated WKB".to_string())
}
