use clap::{Arg, Command as ClapCommand, ArgAction, ArgMatches};
use std::process;
use std::sync::Arc;
use log::{error, LevelFilter};

use gispoly::commands::{CommandContext, CommandFactory, GispolyCommandFactory};
use gispoly::config::Settings;
use gispoly::coordinate::CrsRegistry;
use gispoly::errors::GeoResult;
use gispoly::utils::logger::Logger;

fn build_cli() -> ClapCommand {
    ClapCommand::new("gispoly")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Decode, inspect and reproject WKT/EWKB polygons")
        .arg(
            Arg::new("geometry")
                .help("Polygon as WKT (optionally SRID=<n>; prefixed) or hex EWKB")
                .required_unless_present("list-crs")
                .index(1),
        )
        .arg(
            Arg::new("source")
                .short('s')
                .long("source")
                .help("Source CRS code (e.g. epsg:4326); ignored when the geometry has an SRID prefix")
                .value_name("CODE")
                .required(false),
        )
        .arg(
            Arg::new("target")
                .short('t')
                .long("target")
                .help("Target CRS code (e.g. epsg:32644)")
                .value_name("CODE")
                .required(false),
        )
        .arg(
            Arg::new("prefix")
                .long("prefix")
                .help("Prefix output WKT with SRID=<n>;")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("wkb")
                .long("wkb")
                .help("Output hex EWKB instead of WKT")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("inspect")
                .short('i')
                .long("inspect")
                .help("Describe the geometry instead of transforming it")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("list-crs")
                .long("list-crs")
                .help("List the CRS definitions in the registry")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Settings file (TOML)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("definitions")
                .long("definitions")
                .help("Extra CRS definitions file (TOML)")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("log-file")
                .long("log-file")
                .help("Append log output to this file")
                .value_name("FILE")
                .required(false),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose output")
                .action(ArgAction::SetTrue),
        )
}

fn load_settings(matches: &ArgMatches) -> GeoResult<Settings> {
    let mut settings = Settings::load(matches.get_one::<String>("config").map(String::as_str))?;

    if let Some(path) = matches.get_one::<String>("definitions") {
        settings.definitions = Some(path.clone());
    }
    if let Some(path) = matches.get_one::<String>("log-file") {
        settings.log_file = Some(path.clone());
    }
    Ok(settings)
}

fn init_logging(settings: &Settings, verbose: bool) -> Logger {
    let level = if verbose { LevelFilter::Debug } else { LevelFilter::Info };

    match &settings.log_file {
        Some(path) => {
            match Logger::init_global_logger(path, level) {
                Ok(journal) => journal,
                Err(e) => {
                    eprintln!("Error setting up global logger: {}", e);
                    process::exit(1);
                }
            }
        }
        None => {
            let default_filter = if verbose { "debug" } else { "warn" };
            env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
                .init();
            Logger::disabled()
        }
    }
}

fn main() {
    let matches = build_cli().get_matches();

    let settings = match load_settings(&matches) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let logger = init_logging(&settings, matches.get_flag("verbose"));

    let registry = match &settings.definitions {
        Some(path) => CrsRegistry::with_definitions_file(path),
        None => Ok(CrsRegistry::new()),
    };
    let registry = match registry {
        Ok(r) => Arc::new(r),
        Err(e) => {
            error!("Failed to load CRS definitions: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let context = CommandContext {
        settings,
        registry,
        logger: &logger,
    };

    let factory = GispolyCommandFactory::new();

    let command_result = factory.create_command(&matches, context);
    match command_result {
        Ok(command) => {
            if let Err(e) = command.execute() {
                error!("Command execution error: {}", e);
                eprintln!("Error: {}", e);
                process::exit(1);
            }
        },
        Err(e) => {
            error!("Failed to create command: {}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };
}
