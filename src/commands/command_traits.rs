//! Command pattern interfaces
//!
//! This module defines the core Command pattern interfaces
//! for the CLI application.

use std::sync::Arc;

use crate::config::Settings;
use crate::coordinate::CrsRegistry;
use crate::errors::GeoResult;
use crate::utils::logger::Logger;

/// Represents an executable command in the application
pub trait Command {
    /// Execute the command
    ///
    /// # Returns
    /// Result indicating success or an error
    fn execute(&self) -> GeoResult<()>;
}

/// Shared state every command is built with
pub struct CommandContext<'a> {
    /// Effective settings
    pub settings: Settings,
    /// Registry shared by every request of the process
    pub registry: Arc<CrsRegistry>,
    /// Operation journal
    pub logger: &'a Logger,
}

/// Factory for creating commands from CLI arguments
pub trait CommandFactory<'a> {
    /// Create a new Command instance based on CLI arguments
    ///
    /// # Arguments
    /// * `args` - CLI argument matches from clap
    /// * `context` - Settings, registry and logger
    ///
    /// # Returns
    /// A command that implements the Command trait, or an error
    fn create_command(&self, args: &clap::ArgMatches, context: CommandContext<'a>) -> GeoResult<Box<dyn Command + 'a>>;
}
