//! CRS listing command

use std::sync::Arc;
use log::info;

use crate::commands::command_traits::{Command, CommandContext};
use crate::coordinate::{format_crs_code, CrsKind, CrsRegistry};
use crate::errors::GeoResult;
use crate::utils::logger::Logger;

/// Command listing the CRS definitions in the registry's table
pub struct ListCrsCommand<'a> {
    registry: Arc<CrsRegistry>,
    logger: &'a Logger,
}

impl<'a> ListCrsCommand<'a> {
    /// Create a new list command
    pub fn new(context: CommandContext<'a>) -> Self {
        ListCrsCommand {
            registry: context.registry,
            logger: context.logger,
        }
    }

    /// One line per listed definition
    pub fn lines(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.registry
            .listed_definitions()
            .into_iter()
            .map(|def| {
                let detail = match &def.kind {
                    CrsKind::TransverseMercator(p) => format!(" lon_0={} k0={}", p.central_meridian, p.scale_factor),
                    _ => String::new(),
                };
                format!("{:<12} {:<20} {} [{}]{}",
                        format_crs_code(def.code), def.kind.name(), def.name, def.ellipsoid.name, detail)
            })
            .collect();
        lines.push("epsg:326xx/327xx (WGS 84 UTM zones 1-60 N/S, by rule)".to_string());
        lines
    }
}

impl<'a> Command for ListCrsCommand<'a> {
    fn execute(&self) -> GeoResult<()> {
        let lines = self.lines();
        info!("Listing {} CRS definitions", lines.len() - 1);
        self.logger.log(&format!("list-crs count={}", lines.len() - 1))?;

        for line in lines {
            println!("{}", line);
        }
        Ok(())
    }
}
