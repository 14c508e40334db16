//! CRS definition tables
//!
//! Definitions are data, not code: the built-in table is parsed from the
//! embedded `crs_definitions.toml`, and further tables with the same schema
//! can be loaded from disk and merged on top of it.

use std::collections::{BTreeMap, HashMap};
use std::fs;
use lazy_static::lazy_static;
use log::warn;

use super::crs::{CrsDefinition, CrsKind};
use super::ellipsoid::Ellipsoid;
use super::projection::TransverseMercatorParams;
use crate::errors::{GeoError, GeoResult};

lazy_static! {
    // Parse the embedded definitions once per process
    pub static ref BUILTIN_DEFINITIONS: CrsDefinitionTable = {
        let content = include_str!("../../crs_definitions.toml");
        CrsDefinitionTable::from_str(content).unwrap_or_else(|e| {
            warn!("Failed to parse built-in CRS definitions: {}", e);
            CrsDefinitionTable::minimal()
        })
    };
}

/// Ellipsoids and CRS definitions keyed by EPSG code
#[derive(Debug, Clone, Default)]
pub struct CrsDefinitionTable {
    ellipsoids: HashMap<String, Ellipsoid>,
    definitions: BTreeMap<u32, CrsDefinition>,
}

impl CrsDefinitionTable {
    /// Parse a definition table from a TOML string
    pub fn from_str(content: &str) -> GeoResult<Self> {
        Self::parse(content, None)
    }

    /// Parse a definition table whose CRS entries may also reference the
    /// ellipsoids of `base`
    pub fn from_str_with_base(content: &str, base: &CrsDefinitionTable) -> GeoResult<Self> {
        Self::parse(content, Some(base))
    }

    /// Load a definition table from a TOML file
    pub fn from_file(path: &str, base: Option<&CrsDefinitionTable>) -> GeoResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content, base)
    }

    /// Fallback table holding only WGS 84 and UTM zone 44N
    pub fn minimal() -> Self {
        let wgs84 = Ellipsoid::wgs84();
        let mut table = CrsDefinitionTable::default();
        table.ellipsoids.insert(wgs84.name.clone(), wgs84.clone());
        table.insert(CrsDefinition {
            code: 4326,
            name: "WGS 84".to_string(),
            kind: CrsKind::Geographic,
            ellipsoid: wgs84,
        });
        table.insert(CrsDefinition::utm(44, true));
        table
    }

    fn parse(content: &str, base: Option<&CrsDefinitionTable>) -> GeoResult<Self> {
        let toml_value: toml::Value = content.parse()?;
        let mut table = CrsDefinitionTable::default();

        if let Some(ellipsoids) = toml_value.get("ellipsoids").and_then(|v| v.as_table()) {
            for (name, value) in ellipsoids {
                let semi_major = require_f64(value, "semi_major", name)?;
                let inverse_flattening = require_f64(value, "inverse_flattening", name)?;
                if semi_major <= 0.0 || inverse_flattening <= 1.0 {
                    return Err(GeoError::InvalidDefinition(format!(
                        "ellipsoid {} has impossible axes", name
                    )));
                }
                table.ellipsoids.insert(name.clone(), Ellipsoid::new(name, semi_major, inverse_flattening));
            }
        }

        if let Some(crs_table) = toml_value.get("crs").and_then(|v| v.as_table()) {
            for (key, value) in crs_table {
                let code = key.parse::<u32>().map_err(|_| {
                    GeoError::InvalidDefinition(format!("CRS key '{}' is not a numeric EPSG code", key))
                })?;
                let definition = table.parse_definition(code, value, base)?;
                table.insert(definition);
            }
        }

        Ok(table)
    }

    fn parse_definition(
        &self,
        code: u32,
        value: &toml::Value,
        base: Option<&CrsDefinitionTable>,
    ) -> GeoResult<CrsDefinition> {
        let context = format!("crs.{}", code);

        let name = value.get("name")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("EPSG:{}", code));

        let ellipsoid_name = value.get("ellipsoid")
            .and_then(|v| v.as_str())
            .unwrap_or("WGS84");
        let ellipsoid = self.ellipsoids.get(ellipsoid_name)
            .or_else(|| base.and_then(|b| b.ellipsoid(ellipsoid_name)))
            .cloned()
            .ok_or_else(|| GeoError::InvalidDefinition(format!(
                "{} references unknown ellipsoid '{}'", context, ellipsoid_name
            )))?;

        let kind = match value.get("kind").and_then(|v| v.as_str()) {
            Some("geographic") => CrsKind::Geographic,
            Some("web_mercator") => CrsKind::WebMercator,
            Some("transverse_mercator") => CrsKind::TransverseMercator(TransverseMercatorParams {
                central_meridian: require_f64(value, "central_meridian", &context)?,
                latitude_of_origin: optional_f64(value, "latitude_of_origin", &context)?.unwrap_or(0.0),
                scale_factor: optional_f64(value, "scale_factor", &context)?.unwrap_or(1.0),
                false_easting: optional_f64(value, "false_easting", &context)?.unwrap_or(0.0),
                false_northing: optional_f64(value, "false_northing", &context)?.unwrap_or(0.0),
            }),
            Some(other) => {
                return Err(GeoError::InvalidDefinition(format!(
                    "{} has unsupported kind '{}'", context, other
                )))
            }
            None => {
                return Err(GeoError::InvalidDefinition(format!("{} is missing 'kind'", context)))
            }
        };

        Ok(CrsDefinition { code, name, kind, ellipsoid })
    }

    /// Add or replace a definition
    pub fn insert(&mut self, definition: CrsDefinition) {
        self.definitions.insert(definition.code, definition);
    }

    /// Overlay another table; its entries win on conflicting codes
    pub fn merge(&mut self, other: CrsDefinitionTable) {
        self.ellipsoids.extend(other.ellipsoids);
        self.definitions.extend(other.definitions);
    }

    /// Get a definition by EPSG code
    pub fn get(&self, code: u32) -> Option<&CrsDefinition> {
        self.definitions.get(&code)
    }

    /// Get an ellipsoid by name
    pub fn ellipsoid(&self, name: &str) -> Option<&Ellipsoid> {
        self.ellipsoids.get(name)
    }

    /// All listed definitions in code order
    pub fn definitions(&self) -> impl Iterator<Item = &CrsDefinition> {
        self.definitions.values()
    }

    /// Number of listed definitions
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    /// True when no definition is listed
    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }
}

fn optional_f64(value: &toml::Value, key: &str, context: &str) -> GeoResult<Option<f64>> {
    match value.get(key) {
        None => Ok(None),
        Some(toml::Value::Float(f)) => Ok(Some(*f)),
        Some(toml::Value::Integer(i)) => Ok(Some(*i as f64)),
        Some(_) => Err(GeoError::InvalidDefinition(format!(
            "{}.{} must be a number", context, key
        ))),
    }
}

fn require_f64(value: &toml::Value, key: &str, context: &str) -> GeoResult<f64> {
    optional_f64(value, key, context)?.ok_or_else(|| {
        GeoError::InvalidDefinition(format!("{} is missing '{}'", context, key))
    })
}
