//! Coordinate Reference System handling

use std::fmt;
use lazy_static::lazy_static;
use regex::Regex;

use super::ellipsoid::Ellipsoid;
use super::projection::{Projection, TransverseMercator, TransverseMercatorParams};
use crate::errors::{GeoError, GeoResult};

lazy_static! {
    // "epsg:<digits>", prefix case-insensitive, or bare digits
    static ref CRS_CODE: Regex = Regex::new(r"(?i)^\s*(?:epsg:)?(\d+)\s*$")
        .expect("CRS code pattern is valid");
}

/// Parse a CRS code such as `epsg:4326` into its numeric EPSG identifier
pub fn parse_crs_code(code: &str) -> GeoResult<u32> {
    CRS_CODE
        .captures(code)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<u32>().ok())
        .ok_or_else(|| GeoError::UnknownCrs(code.trim().to_string()))
}

/// Format an EPSG identifier in the canonical `epsg:<n>` form
pub fn format_crs_code(epsg: u32) -> String {
    format!("epsg:{}", epsg)
}

/// Linear or angular unit of a CRS's coordinates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Units {
    /// Longitude/latitude in degrees
    Degrees,
    /// Easting/northing in meters
    Meters,
}

impl Units {
    /// Unit name
    pub fn name(&self) -> &'static str {
        match self {
            Units::Degrees => "degree",
            Units::Meters => "metre",
        }
    }
}

/// Projection family and parameters of an unresolved definition
#[derive(Debug, Clone, PartialEq)]
pub enum CrsKind {
    /// Geographic longitude/latitude
    Geographic,
    /// Transverse Mercator
    TransverseMercator(TransverseMercatorParams),
    /// Spherical Web Mercator
    WebMercator,
}

impl CrsKind {
    /// Name used for this kind in definition files
    pub fn name(&self) -> &'static str {
        match self {
            CrsKind::Geographic => "geographic",
            CrsKind::TransverseMercator(_) => "transverse_mercator",
            CrsKind::WebMercator => "web_mercator",
        }
    }
}

/// Static definition of a CRS, as listed in a definition table
#[derive(Debug, Clone, PartialEq)]
pub struct CrsDefinition {
    /// EPSG identifier
    pub code: u32,
    /// Human readable name
    pub name: String,
    /// Projection family and parameters
    pub kind: CrsKind,
    /// Reference ellipsoid
    pub ellipsoid: Ellipsoid,
}

impl CrsDefinition {
    /// WGS 84 UTM zone definition
    pub fn utm(zone: u8, is_northern: bool) -> Self {
        let (base, hemisphere) = if is_northern { (32600, 'N') } else { (32700, 'S') };
        CrsDefinition {
            code: base + zone as u32,
            name: format!("WGS 84 / UTM zone {}{}", zone, hemisphere),
            kind: CrsKind::TransverseMercator(TransverseMercatorParams::utm(zone, is_northern)),
            ellipsoid: Ellipsoid::wgs84(),
        }
    }

    /// Definition derived from the EPSG numbering rule for WGS 84 UTM zones
    pub fn from_utm_rule(epsg: u32) -> Option<Self> {
        match epsg {
            32601..=32660 => Some(Self::utm((epsg - 32600) as u8, true)),
            32701..=32760 => Some(Self::utm((epsg - 32700) as u8, false)),
            _ => None,
        }
    }

    /// Construct the resolved spatial reference, precomputing projection constants
    pub fn build(&self) -> SpatialReference {
        let projection = match &self.kind {
            CrsKind::Geographic => Projection::Geographic,
            CrsKind::TransverseMercator(params) => {
                Projection::TransverseMercator(TransverseMercator::new(params.clone(), &self.ellipsoid))
            }
            CrsKind::WebMercator => Projection::WebMercator {
                radius: self.ellipsoid.semi_major,
            },
        };

        SpatialReference {
            code: self.code,
            name: self.name.clone(),
            ellipsoid: self.ellipsoid.clone(),
            projection,
        }
    }
}

/// A resolved coordinate reference system, immutable once built
#[derive(Debug)]
pub struct SpatialReference {
    code: u32,
    name: String,
    ellipsoid: Ellipsoid,
    projection: Projection,
}

impl SpatialReference {
    /// EPSG identifier
    pub fn code(&self) -> u32 {
        self.code
    }

    /// Human readable name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reference ellipsoid
    pub fn ellipsoid(&self) -> &Ellipsoid {
        &self.ellipsoid
    }

    /// Projection family and precomputed constants
    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    /// Whether coordinates are longitude/latitude
    pub fn is_geographic(&self) -> bool {
        self.projection.is_geographic()
    }

    /// Unit of the coordinates
    pub fn units(&self) -> Units {
        if self.is_geographic() {
            Units::Degrees
        } else {
            Units::Meters
        }
    }

    /// Canonical `epsg:<n>` code
    pub fn crs_code(&self) -> String {
        format_crs_code(self.code)
    }
}

impl fmt::Display for SpatialReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (EPSG:{})", self.name, self.code)
    }
}
