//! Registry resolving CRS codes to shared spatial references
//!
//! One registry is built at startup and handed to every caller by reference.
//! Resolutions are cached for the life of the registry; each code maps to
//! exactly one `SpatialReference`, no matter how many threads race on its
//! first resolution.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use log::debug;

use super::crs::{parse_crs_code, CrsDefinition, SpatialReference};
use super::definitions::{CrsDefinitionTable, BUILTIN_DEFINITIONS};
use crate::errors::{GeoError, GeoResult};

/// Thread-safe registry of coordinate reference systems
pub struct CrsRegistry {
    table: CrsDefinitionTable,
    cache: RwLock<HashMap<u32, Arc<SpatialReference>>>,
}

impl CrsRegistry {
    /// Registry over the built-in definitions
    pub fn new() -> Self {
        Self::with_table(BUILTIN_DEFINITIONS.clone())
    }

    /// Registry over an explicit definition table
    pub fn with_table(table: CrsDefinitionTable) -> Self {
        CrsRegistry {
            table,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Registry over the built-in definitions extended by a TOML file
    pub fn with_definitions_file(path: &str) -> GeoResult<Self> {
        let mut table = BUILTIN_DEFINITIONS.clone();
        let extra = CrsDefinitionTable::from_file(path, Some(&table))?;
        debug!("Loaded {} extra CRS definitions from {}", extra.len(), path);
        table.merge(extra);
        Ok(Self::with_table(table))
    }

    /// Resolve a code such as `epsg:32644`
    pub fn resolve(&self, code: &str) -> GeoResult<Arc<SpatialReference>> {
        let epsg = parse_crs_code(code)?;
        self.resolve_epsg(epsg)
    }

    /// Resolve a numeric EPSG identifier
    pub fn resolve_epsg(&self, epsg: u32) -> GeoResult<Arc<SpatialReference>> {
        {
            let cache = self.cache.read().unwrap_or_else(|e| e.into_inner());
            if let Some(srs) = cache.get(&epsg) {
                return Ok(Arc::clone(srs));
            }
        }

        let definition = self.definition(epsg)
            .ok_or_else(|| GeoError::UnknownCrs(format!("epsg:{}", epsg)))?;

        // Build under the write lock so only one object is ever constructed per code
        let mut cache = self.cache.write().unwrap_or_else(|e| e.into_inner());
        let srs = cache.entry(epsg).or_insert_with(|| {
            debug!("Constructing spatial reference EPSG:{} ({})", epsg, definition.name);
            Arc::new(definition.build())
        });

        Ok(Arc::clone(srs))
    }

    /// Whether a code can be resolved
    pub fn is_known(&self, epsg: u32) -> bool {
        self.definition(epsg).is_some()
    }

    /// Definition for a code: the table first, then the UTM numbering rule
    pub fn definition(&self, epsg: u32) -> Option<CrsDefinition> {
        self.table.get(epsg)
            .cloned()
            .or_else(|| CrsDefinition::from_utm_rule(epsg))
    }

    /// Definitions listed explicitly in the table
    pub fn listed_definitions(&self) -> Vec<&CrsDefinition> {
        self.table.definitions().collect()
    }

    /// Number of codes resolved so far
    pub fn cached_count(&self) -> usize {
        self.cache.read().unwrap_or_else(|e| e.into_inner()).len()
    }
}

impl Default for CrsRegistry {
    fn default() -> Self {
        Self::new()
    }
}
