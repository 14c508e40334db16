//! Reprojection command
//!
//! Transforms a polygon given on the command line into a target CRS and
//! prints the result.

use clap::ArgMatches;
use log::info;

use crate::api::{OutputFormat, TransformRequest, TransformService};
use crate::commands::command_traits::{Command, CommandContext};
use crate::errors::{GeoError, GeoResult};
use crate::utils::logger::Logger;

/// Command for reprojecting a polygon
pub struct TransformCommand<'a> {
    /// Geometry text as given
    geometry: String,
    /// Source CRS code, if given
    source: Option<String>,
    /// Target CRS code, from `--target` or the settings default
    target: Option<String>,
    /// Output encoding
    format: OutputFormat,
    /// Service doing the work
    service: TransformService,
    /// Logger for recording operations
    logger: &'a Logger,
}

impl<'a> TransformCommand<'a> {
    /// Create a new transform command
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `context` - Settings, registry and logger
    ///
    /// # Returns
    /// A new TransformCommand instance or an error
    pub fn new(args: &ArgMatches, context: CommandContext<'a>) -> GeoResult<Self> {
        let geometry = args.get_one::<String>("geometry")
            .ok_or_else(|| GeoError::GenericError("Missing input geometry".to_string()))?
            .clone();

        let source = args.get_one::<String>("source").cloned();
        let target = args.get_one::<String>("target")
            .cloned()
            .or_else(|| context.settings.default_target.clone());

        let format = if args.get_flag("wkb") {
            OutputFormat::EwkbHex
        } else if args.get_flag("prefix") || context.settings.include_srid_prefix {
            OutputFormat::Ewkt
        } else {
            OutputFormat::Wkt
        };

        let service = TransformService::from_settings(context.registry, &context.settings);

        Ok(TransformCommand {
            geometry,
            source,
            target,
            format,
            service,
            logger: context.logger,
        })
    }
}

impl<'a> Command for TransformCommand<'a> {
    fn execute(&self) -> GeoResult<()> {
        info!("Transforming geometry to {}", self.target.as_deref().unwrap_or("<none>"));

        let request = TransformRequest::new(&self.geometry, self.source.as_deref(), self.target.as_deref())
            .with_format(self.format);
        let output = self.service.execute_request(&request)?;

        self.logger.log(&format!(
            "transform source={} target={} format={:?}",
            self.source.as_deref().unwrap_or("default"),
            self.target.as_deref().unwrap_or("-"),
            self.format
        ))?;

        println!("{}", output);
        Ok(())
    }
}
