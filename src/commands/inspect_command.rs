//! Geometry inspection command
//!
//! Decodes a polygon (WKT or hex EWKB) and reports its structure without
//! transforming it.

use std::sync::Arc;
use clap::ArgMatches;
use log::info;

use crate::commands::command_traits::{Command, CommandContext};
use crate::coordinate::CrsRegistry;
use crate::errors::{GeoError, GeoResult};
use crate::geometry::{wkb, wkt, Polygon};
use crate::utils::logger::Logger;

/// Command for describing a polygon
pub struct InspectCommand<'a> {
    /// Geometry text as given
    geometry: String,
    /// SRID assumed when the geometry carries none
    default_srid: u32,
    /// Registry used to name the SRID
    registry: Arc<CrsRegistry>,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> InspectCommand<'a> {
    /// Create a new inspect command
    pub fn new(args: &ArgMatches, context: CommandContext<'a>) -> GeoResult<Self> {
        let geometry = args.get_one::<String>("geometry")
            .ok_or_else(|| GeoError::GenericError("Missing input geometry".to_string()))?
            .clone();

        Ok(InspectCommand {
            geometry,
            default_srid: context.settings.default_srid,
            registry: context.registry,
            logger: context.logger,
        })
    }

    /// Decode either encoding, telling them apart by the leading characters
    fn decode(&self) -> GeoResult<(Polygon, u32, &'static str)> {
        let text = self.geometry.trim();
        if wkb::looks_like_hex(text) {
            let (polygon, srid) = wkb::decode_ewkb_hex(text, self.default_srid)?;
            Ok((polygon, srid, "EWKB"))
        } else {
            let (polygon, srid) = wkt::decode(text, self.default_srid)?;
            Ok((polygon, srid, "WKT"))
        }
    }

    /// Build the human readable report
    pub fn report(&self) -> GeoResult<String> {
        let (polygon, srid, encoding) = self.decode()?;

        let crs_name = match self.registry.definition(srid) {
            Some(definition) => definition.name,
            None => "unknown".to_string(),
        };
        let envelope = polygon.envelope().with_epsg(srid);

        let mut result = String::from("Polygon Inspection Results:\n");
        result.push_str(&format!("  Encoding: {}\n", encoding));
        result.push_str(&format!("  SRID: {} ({})\n", srid, crs_name));
        result.push_str(&format!("  Rings: {} (exterior + {} hole(s))\n",
                                 polygon.rings().len(), polygon.holes().len()));
        result.push_str(&format!("  Vertices: {}\n", polygon.vertex_count()));

        for (i, ring) in polygon.rings().iter().enumerate() {
            result.push_str(&format!("  Ring #{}: {} points, closed: {}\n",
                                     i, ring.len(), ring.is_closed()));
        }

        result.push_str(&format!("  Envelope: {},{},{},{}",
                                 envelope.min_x, envelope.min_y, envelope.max_x, envelope.max_y));
        if let Some(epsg) = envelope.epsg {
            result.push_str(&format!(" (EPSG:{})", epsg));
        }
        let center = envelope.center();
        result.push_str(&format!("\n  Extent: {} x {}, center {} {}\n",
                                 envelope.width(), envelope.height(), center.x, center.y));
        Ok(result)
    }
}

impl<'a> Command for InspectCommand<'a> {
    fn execute(&self) -> GeoResult<()> {
        info!("Inspecting geometry");
        let report = self.report()?;
        self.logger.log(&report)?;
        print!("{}", report);
        Ok(())
    }
}
