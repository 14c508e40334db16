//! Polygon records and the storage collaborator interface
//!
//! The surrounding CRUD API persists named polygon records. This module
//! defines the record shapes, the `PolygonStore` trait the transform
//! service fetches geometry through, and an in-memory implementation that
//! keeps geometry in EWKB form the way a spatial database column would.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;
use chrono::{DateTime, Utc};
use log::{debug, info};

use crate::config::DEFAULT_SRID;
use crate::errors::{GeoError, GeoResult};
use crate::geometry::{wkb, wkt};
use crate::io::byte_order::ByteOrder;

/// Class assigned to records created without one
pub const DEFAULT_CLASS_ID: i64 = 1;

/// Layout used when record timestamps are rendered as text
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Render a record timestamp with `TIMESTAMP_FORMAT`
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// A stored polygon record
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    /// Record identifier
    pub id: i64,
    /// Classification code
    pub class_id: i64,
    /// Record name
    pub name: String,
    /// Free-form properties
    pub props: Option<String>,
    /// Geometry as `SRID=<n>;POLYGON(...)`
    pub geom: String,
    /// SRID of the stored geometry
    pub srid: u32,
    /// When the record was created
    pub created: DateTime<Utc>,
    /// When the record was last modified
    pub updated: DateTime<Utc>,
}

/// Fields of a record to create
#[derive(Debug, Clone, Default)]
pub struct NewPolygon {
    /// Record name (required)
    pub name: String,
    /// Classification code, `DEFAULT_CLASS_ID` when absent
    pub class_id: Option<i64>,
    /// Free-form properties
    pub props: Option<String>,
    /// Geometry as WKT, optionally SRID-prefixed (required)
    pub geom: String,
}

/// Partial update; only supplied fields are overwritten
#[derive(Debug, Clone, Default)]
pub struct PolygonUpdate {
    /// New name
    pub name: Option<String>,
    /// New classification code
    pub class_id: Option<i64>,
    /// New properties
    pub props: Option<String>,
    /// New geometry as WKT, optionally SRID-prefixed
    pub geom: Option<String>,
}

/// Storage collaborator for polygon records
pub trait PolygonStore: Send + Sync {
    /// Validate and insert a record, returning it with its new id
    fn create(&self, new: NewPolygon) -> GeoResult<PolygonRecord>;

    /// Fetch a record by id
    fn get(&self, id: i64) -> GeoResult<PolygonRecord>;

    /// All records in id order
    fn list(&self) -> GeoResult<Vec<PolygonRecord>>;

    /// Apply a partial update
    fn update(&self, id: i64, update: PolygonUpdate) -> GeoResult<PolygonRecord>;

    /// Remove a record
    fn delete(&self, id: i64) -> GeoResult<()>;
}

struct StoredRow {
    class_id: i64,
    name: String,
    props: Option<String>,
    ewkb: Vec<u8>,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

/// Process-local `PolygonStore`
pub struct InMemoryPolygonStore {
    rows: RwLock<BTreeMap<i64, StoredRow>>,
    next_id: AtomicI64,
    default_srid: u32,
}

impl InMemoryPolygonStore {
    /// Create an empty store assuming `DEFAULT_SRID` for unprefixed geometry
    pub fn new() -> Self {
        Self::with_default_srid(DEFAULT_SRID)
    }

    /// Create an empty store with a custom default SRID
    pub fn with_default_srid(default_srid: u32) -> Self {
        InMemoryPolygonStore {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicI64::new(1),
            default_srid,
        }
    }

    fn geometry_to_ewkb(&self, geom: &str) -> GeoResult<Vec<u8>> {
        let (polygon, srid) = wkt::decode(geom, self.default_srid)?;
        wkb::encode_ewkb(&polygon, Some(srid), ByteOrder::LittleEndian)
    }

    fn to_record(&self, id: i64, row: &StoredRow) -> GeoResult<PolygonRecord> {
        let (polygon, srid) = wkb::decode_ewkb(&row.ewkb, self.default_srid)?;
        Ok(PolygonRecord {
            id,
            class_id: row.class_id,
            name: row.name.clone(),
            props: row.props.clone(),
            geom: wkt::encode(&polygon, srid, true),
            srid,
            created: row.created,
            updated: row.updated,
        })
    }
}

impl Default for InMemoryPolygonStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonStore for InMemoryPolygonStore {
    fn create(&self, new: NewPolygon) -> GeoResult<PolygonRecord> {
        if new.name.trim().is_empty() {
            return Err(GeoError::InvalidRecord("name: Missing data for required field".to_string()));
        }
        if new.geom.trim().is_empty() {
            return Err(GeoError::InvalidRecord("geom: Missing data for required field".to_string()));
        }

        let now = Utc::now();
        let row = StoredRow {
            class_id: new.class_id.unwrap_or(DEFAULT_CLASS_ID),
            name: new.name,
            props: new.props,
            ewkb: self.geometry_to_ewkb(&new.geom)?,
            created: now,
            updated: now,
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let record = self.to_record(id, &row)?;
        self.rows.write().unwrap_or_else(|e| e.into_inner()).insert(id, row);

        info!("Created polygon record {} ({}) at {}", id, record.name, format_timestamp(&now));
        Ok(record)
    }

    fn get(&self, id: i64) -> GeoResult<PolygonRecord> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        let row = rows.get(&id).ok_or(GeoError::NotFound(id))?;
        self.to_record(id, row)
    }

    fn list(&self) -> GeoResult<Vec<PolygonRecord>> {
        let rows = self.rows.read().unwrap_or_else(|e| e.into_inner());
        rows.iter().map(|(id, row)| self.to_record(*id, row)).collect()
    }

    fn update(&self, id: i64, update: PolygonUpdate) -> GeoResult<PolygonRecord> {
        // Validate before taking the write lock
        let ewkb = match &update.geom {
            Some(geom) => Some(self.geometry_to_ewkb(geom)?),
            None => None,
        };

        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        let row = rows.get_mut(&id).ok_or(GeoError::NotFound(id))?;

        if let Some(name) = update.name {
            if name.trim().is_empty() {
                return Err(GeoError::InvalidRecord("name: Field may not be empty".to_string()));
            }
            row.name = name;
        }
        if let Some(class_id) = update.class_id {
            row.class_id = class_id;
        }
        if let Some(props) = update.props {
            row.props = Some(props);
        }
        if let Some(ewkb) = ewkb {
            row.ewkb = ewkb;
        }
        row.updated = Utc::now();

        debug!("Updated polygon record {} at {}", id, format_timestamp(&row.updated));
        self.to_record(id, row)
    }

    fn delete(&self, id: i64) -> GeoResult<()> {
        let mut rows = self.rows.write().unwrap_or_else(|e| e.into_inner());
        rows.remove(&id).map(|_| ()).ok_or(GeoError::NotFound(id))?;
        info!("Deleted polygon record {}", id);
        Ok(())
    }
}
