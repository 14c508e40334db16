//! Error types for geometry decoding, CRS resolution and reprojection

use std::fmt;
use std::io;

/// Error types produced by the polygon transformation core
#[derive(Debug)]
pub enum GeoError {
    /// Input geometry violates the WKT/EWKB grammar or a ring invariant
    MalformedGeometry(String),
    /// CRS code is unparseable or has no known definition
    UnknownCrs(String),
    /// No target CRS code was supplied
    MissingTargetCrs,
    /// Inputs were valid but the projection has no result for them
    ProjectionFailure(String),
    /// A CRS definition or settings document is malformed
    InvalidDefinition(String),
    /// A polygon record is missing or has an invalid field
    InvalidRecord(String),
    /// Stored polygon does not exist
    NotFound(i64),
    /// I/O error
    IoError(io::Error),
    /// Generic error with message
    GenericError(String),
}

impl GeoError {
    /// HTTP status the surrounding API answers with for this error
    pub fn status_code(&self) -> u16 {
        match self {
            GeoError::MalformedGeometry(_)
            | GeoError::MissingTargetCrs
            | GeoError::UnknownCrs(_)
            | GeoError::InvalidDefinition(_)
            | GeoError::InvalidRecord(_) => 400,
            GeoError::NotFound(_) => 404,
            GeoError::ProjectionFailure(_)
            | GeoError::IoError(_)
            | GeoError::GenericError(_) => 500,
        }
    }

    /// Stable machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            GeoError::MalformedGeometry(_) => "MalformedGeometry",
            GeoError::UnknownCrs(_) => "UnknownCRS",
            GeoError::MissingTargetCrs => "MissingTargetCRS",
            GeoError::ProjectionFailure(_) => "ProjectionFailure",
            GeoError::InvalidDefinition(_) => "InvalidDefinition",
            GeoError::InvalidRecord(_) => "InvalidRecord",
            GeoError::NotFound(_) => "NotFound",
            GeoError::IoError(_) => "IoError",
            GeoError::GenericError(_) => "GenericError",
        }
    }

    /// Whether the caller supplied bad input (as opposed to a server-side failure)
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }
}

impl fmt::Display for GeoError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GeoError::MalformedGeometry(msg) => write!(f, "Malformed geometry: {}", msg),
            GeoError::UnknownCrs(code) => write!(f, "Unknown coordinate reference system: {}", code),
            GeoError::MissingTargetCrs => write!(f, "Target coordinate reference system is required"),
            GeoError::ProjectionFailure(msg) => write!(f, "Projection failure: {}", msg),
            GeoError::InvalidDefinition(msg) => write!(f, "Invalid definition: {}", msg),
            GeoError::InvalidRecord(msg) => write!(f, "Invalid record: {}", msg),
            GeoError::NotFound(id) => write!(f, "Object {} does not exist or id is incorrect", id),
            GeoError::IoError(e) => write!(f, "I/O error: {}", e),
            GeoError::GenericError(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for GeoError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            GeoError::IoError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for GeoError {
    fn from(error: io::Error) -> Self {
        GeoError::IoError(error)
    }
}

impl From<toml::de::Error> for GeoError {
    fn from(error: toml::de::Error) -> Self {
        GeoError::InvalidDefinition(format!("Failed to parse TOML: {}", error))
    }
}

impl From<hex::FromHexError> for GeoError {
    fn from(error: hex::FromHexError) -> Self {
        GeoError::MalformedGeometry(format!("Invalid hex geometry: {}", error))
    }
}

/// Result type for geometry and projection operations
pub type GeoResult<T> = Result<T, GeoError>;
