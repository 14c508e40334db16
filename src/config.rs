//! Runtime settings
//!
//! Settings come from an optional TOML file, then environment variables
//! override individual keys:
//!
//! | key                   | env                      | default |
//! |-----------------------|--------------------------|---------|
//! | `default_srid`        | `GISPOLY_DEFAULT_SRID`   | 4326    |
//! | `default_target`      | `GISPOLY_DEFAULT_TARGET` | none    |
//! | `include_srid_prefix` |                          | false   |
//! | `definitions`         | `GISPOLY_DEFINITIONS`    | none    |
//! | `log_file`            |                          | none    |

use std::env;
use std::fs;
use log::debug;

use crate::errors::{GeoError, GeoResult};

/// SRID assumed for geometry text without an `SRID=` prefix
pub const DEFAULT_SRID: u32 = 4326;

/// Service and CLI settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// SRID used when neither the geometry nor the request names one
    pub default_srid: u32,
    /// Target CRS code the CLI falls back to when `--target` is absent
    pub default_target: Option<String>,
    /// Prefix output WKT with `SRID=<n>;`
    pub include_srid_prefix: bool,
    /// Extra CRS definition file merged over the built-in table
    pub definitions: Option<String>,
    /// Log file path
    pub log_file: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            default_srid: DEFAULT_SRID,
            default_target: None,
            include_srid_prefix: false,
            definitions: None,
            log_file: None,
        }
    }
}

impl Settings {
    /// Load settings from an optional file, then apply environment overrides
    pub fn load(path: Option<&str>) -> GeoResult<Self> {
        let settings = match path {
            Some(path) => Self::from_file(path)?,
            None => Settings::default(),
        };
        settings.with_overrides(|key| env::var(key).ok())
    }

    /// Parse settings from a TOML file
    pub fn from_file(path: &str) -> GeoResult<Self> {
        let content = fs::read_to_string(path)?;
        debug!("Loaded settings from {}", path);
        Self::from_str(&content)
    }

    /// Parse settings from a TOML string; unknown keys are ignored
    pub fn from_str(content: &str) -> GeoResult<Self> {
        let toml_value: toml::Value = content.parse()?;
        let mut settings = Settings::default();

        if let Some(value) = toml_value.get("default_srid") {
            let srid = value.as_integer()
                .filter(|v| *v >= 0 && *v <= u32::MAX as i64)
                .ok_or_else(|| invalid("default_srid", "a non-negative integer"))?;
            settings.default_srid = srid as u32;
        }

        if let Some(value) = toml_value.get("include_srid_prefix") {
            settings.include_srid_prefix = value.as_bool()
                .ok_or_else(|| invalid("include_srid_prefix", "a boolean"))?;
        }

        settings.default_target = optional_string(&toml_value, "default_target")?;
        settings.definitions = optional_string(&toml_value, "definitions")?;
        settings.log_file = optional_string(&toml_value, "log_file")?;

        Ok(settings)
    }

    /// Apply overrides from a key lookup (the process environment in `load`)
    pub fn with_overrides<F>(mut self, lookup: F) -> GeoResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(srid) = lookup("GISPOLY_DEFAULT_SRID") {
            self.default_srid = srid.trim().parse::<u32>()
                .map_err(|_| invalid("GISPOLY_DEFAULT_SRID", "a non-negative integer"))?;
        }
        if let Some(target) = lookup("GISPOLY_DEFAULT_TARGET").filter(|s| !s.trim().is_empty()) {
            self.default_target = Some(target);
        }
        if let Some(path) = lookup("GISPOLY_DEFINITIONS").filter(|s| !s.trim().is_empty()) {
            self.definitions = Some(path);
        }
        Ok(self)
    }
}

fn optional_string(toml_value: &toml::Value, key: &str) -> GeoResult<Option<String>> {
    match toml_value.get(key) {
        None => Ok(None),
        Some(value) => value.as_str()
            .map(|s| Some(s.to_string()))
            .ok_or_else(|| invalid(key, "a string")),
    }
}

fn invalid(key: &str, expected: &str) -> GeoError {
    GeoError::InvalidDefinition(format!("setting '{}' must be {}", key, expected))
}
