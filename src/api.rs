use std::fmt;
use std::sync::Arc;
use log::{debug, info, warn};

use crate::config::{Settings, DEFAULT_SRID};
use crate::coordinate::{parse_crs_code, CoordinateTransformer, CrsRegistry, SpatialReference};
use crate::errors::{GeoError, GeoResult};
use crate::geometry::{wkb, wkt, Polygon};
use crate::io::byte_order::ByteOrder;
use crate::store::PolygonStore;

/// Encoding of a transformed geometry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// `POLYGON(...)`
    Wkt,
    /// `SRID=<n>;POLYGON(...)`
    Ewkt,
    /// Uppercase hex EWKB with the SRID embedded
    EwkbHex,
}

/// A single reprojection request
#[derive(Debug, Clone, Copy)]
pub struct TransformRequest<'a> {
    /// Geometry as WKT (optionally SRID-prefixed) or hex EWKB
    pub geometry: &'a str,
    /// Source CRS code, used when the geometry has no SRID prefix
    pub source: Option<&'a str>,
    /// Target CRS code (required)
    pub target: Option<&'a str>,
    /// Output encoding
    pub format: OutputFormat,
}

impl<'a> TransformRequest<'a> {
    /// Request producing WKT
    pub fn new(geometry: &'a str, source: Option<&'a str>, target: Option<&'a str>) -> Self {
        TransformRequest { geometry, source, target, format: OutputFormat::Wkt }
    }

    /// Choose the output encoding
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }
}

/// Stage of the transform pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformStage {
    Decoding,
    Resolving,
    Transforming,
    Encoding,
    Done,
}

impl fmt::Display for TransformStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TransformStage::Decoding => "decoding",
            TransformStage::Resolving => "resolving",
            TransformStage::Transforming => "transforming",
            TransformStage::Encoding => "encoding",
            TransformStage::Done => "done",
        };
        f.write_str(name)
    }
}

enum State {
    Decoding,
    Resolving {
        polygon: Polygon,
        embedded_srid: Option<u32>,
    },
    Transforming {
        polygon: Polygon,
        source: Arc<SpatialReference>,
        target: Arc<SpatialReference>,
    },
    Encoding {
        polygon: Polygon,
        target: Arc<SpatialReference>,
    },
    Done(String),
}

impl State {
    fn stage(&self) -> TransformStage {
        match self {
            State::Decoding => TransformStage::Decoding,
            State::Resolving { .. } => TransformStage::Resolving,
            State::Transforming { .. } => TransformStage::Transforming,
            State::Encoding { .. } => TransformStage::Encoding,
            State::Done(_) => TransformStage::Done,
        }
    }
}

/// Reprojects polygon geometry between coordinate reference systems
///
/// Requests run `Decoding → Resolving → Transforming → Encoding → Done`;
/// a failure at any stage ends the request with that error and no partial
/// geometry is ever returned.
pub struct TransformService {
    registry: Arc<CrsRegistry>,
    transformer: CoordinateTransformer,
    default_srid: u32,
    include_srid_prefix: bool,
}

impl TransformService {
    /// Create a service over a shared registry
    pub fn new(registry: Arc<CrsRegistry>) -> Self {
        TransformService {
            registry,
            transformer: CoordinateTransformer::new(),
            default_srid: DEFAULT_SRID,
            include_srid_prefix: false,
        }
    }

    /// Create a service configured from settings
    pub fn from_settings(registry: Arc<CrsRegistry>, settings: &Settings) -> Self {
        Self::new(registry)
            .with_default_srid(settings.default_srid)
            .with_srid_prefix(settings.include_srid_prefix)
    }

    /// SRID assumed when neither the geometry nor the request names a source
    pub fn with_default_srid(mut self, srid: u32) -> Self {
        self.default_srid = srid;
        self
    }

    /// Whether `execute` prefixes its output with `SRID=<n>;`
    pub fn with_srid_prefix(mut self, include: bool) -> Self {
        self.include_srid_prefix = include;
        self
    }

    /// The registry this service resolves codes with
    pub fn registry(&self) -> &CrsRegistry {
        &self.registry
    }

    /// Transform WKT or hex EWKB geometry into the target CRS and return it as WKT
    pub fn execute(&self, geometry: &str, source: Option<&str>, target: Option<&str>) -> GeoResult<String> {
        let format = if self.include_srid_prefix { OutputFormat::Ewkt } else { OutputFormat::Wkt };
        self.execute_request(&TransformRequest::new(geometry, source, target).with_format(format))
    }

    /// Run a request through the pipeline
    pub fn execute_request(&self, request: &TransformRequest<'_>) -> GeoResult<String> {
        let mut state = State::Decoding;

        loop {
            if let State::Done(output) = state {
                return Ok(output);
            }

            let stage = state.stage();
            state = self.advance(state, request).map_err(|e| {
                warn!("Transform failed while {}: {}", stage, e);
                e
            })?;
        }
    }

    /// Fetch a stored polygon and transform it into the target CRS
    pub fn execute_stored(&self, store: &dyn PolygonStore, id: i64, target: Option<&str>) -> GeoResult<String> {
        let record = store.get(id)?;
        debug!("Fetched polygon record {} (SRID {})", id, record.srid);
        self.execute(&record.geom, None, target)
    }

    fn advance(&self, state: State, request: &TransformRequest<'_>) -> GeoResult<State> {
        match state {
            State::Decoding => {
                let (polygon, embedded_srid) = if wkb::looks_like_hex(request.geometry) {
                    wkb::decode_ewkb_with_srid(&wkb::from_hex(request.geometry)?)?
                } else {
                    wkt::decode_with_srid(request.geometry)?
                };
                Ok(State::Resolving { polygon, embedded_srid })
            }
            State::Resolving { polygon, embedded_srid } => {
                let target_code = request.target
                    .map(str::trim)
                    .filter(|code| !code.is_empty())
                    .ok_or(GeoError::MissingTargetCrs)?;

                let source = self.resolve_source(embedded_srid, request.source)?;
                let target = self.registry.resolve(target_code)?;

                Ok(State::Transforming { polygon, source, target })
            }
            State::Transforming { polygon, source, target } => {
                let transformed = self.transformer.transform_polygon(&polygon, &source, &target)?;
                info!("Transformed polygon with {} vertices from EPSG:{} to EPSG:{}",
                      transformed.vertex_count(), source.code(), target.code());
                Ok(State::Encoding { polygon: transformed, target })
            }
            State::Encoding { polygon, target } => {
                let srid = target.code();
                let output = match request.format {
                    OutputFormat::Wkt => wkt::encode(&polygon, srid, false),
                    OutputFormat::Ewkt => wkt::encode(&polygon, srid, true),
                    OutputFormat::EwkbHex => wkb::encode_ewkb_hex(&polygon, Some(srid), ByteOrder::LittleEndian)?,
                };
                Ok(State::Done(output))
            }
            State::Done(output) => Ok(State::Done(output)),
        }
    }

    fn resolve_source(&self, embedded_srid: Option<u32>, requested: Option<&str>) -> GeoResult<Arc<SpatialReference>> {
        let requested = requested.map(str::trim).filter(|code| !code.is_empty());

        match (embedded_srid, requested) {
            (Some(srid), Some(code)) => {
                let source = self.registry.resolve_epsg(srid)?;
                if parse_crs_code(code).ok() != Some(srid) {
                    warn!("Geometry SRID {} overrides requested source {}", srid, code);
                }
                Ok(source)
            }
            (Some(srid), None) => self.registry.resolve_epsg(srid),
            (None, Some(code)) => self.registry.resolve(code),
            (None, None) => self.registry.resolve_epsg(self.default_srid),
        }
    }
}
