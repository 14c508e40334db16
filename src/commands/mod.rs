//! CLI command implementations
//!
//! This module contains implementations of the commands
//! supported by the CLI application using the Command pattern.

pub mod command_traits;
pub mod transform_command;
pub mod inspect_command;
pub mod list_crs_command;

pub use command_traits::{Command, CommandContext, CommandFactory};
pub use transform_command::TransformCommand;
pub use inspect_command::InspectCommand;
pub use list_crs_command::ListCrsCommand;

use clap::ArgMatches;
use crate::errors::GeoResult;

/// Factory for creating command instances based on CLI arguments
pub struct GispolyCommandFactory;

impl GispolyCommandFactory {
    /// Create a new factory instance
    pub fn new() -> Self {
        GispolyCommandFactory
    }
}

impl Default for GispolyCommandFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> CommandFactory<'a> for GispolyCommandFactory {
    fn create_command(&self, args: &ArgMatches, context: CommandContext<'a>) -> GeoResult<Box<dyn Command + 'a>> {
        if args.get_flag("list-crs") {
            Ok(Box::new(ListCrsCommand::new(context)))
        } else if args.get_flag("inspect") {
            Ok(Box::new(InspectCommand::new(args, context)?))
        } else {
            // Default to the transform command
            Ok(Box::new(TransformCommand::new(args, context)?))
        }
    }
}
