//! Integration tests for the polygon transform service

extern crate std;

use std::sync::Arc;
use clap::{Arg, ArgAction, Command as ClapCommand};

use gispoly::api::{OutputFormat, TransformRequest, TransformService};
use gispoly::commands::{CommandContext, InspectCommand, ListCrsCommand};
use gispoly::config::Settings;
use gispoly::coordinate::CrsRegistry;
use gispoly::errors::GeoError;
use gispoly::geometry::{wkb, wkt};
use gispoly::io::byte_order::ByteOrder;
use gispoly::store::{
    format_timestamp, InMemoryPolygonStore, NewPolygon, PolygonStore, PolygonUpdate, DEFAULT_CLASS_ID,
};
use gispoly::utils::logger::Logger;

const SCENARIO: &str = "SRID=4326;POLYGON((-73.08373 47.76313,-73.07296 47.37293,-73.08303 47.36239,\
-73.08371 47.36253,-73.0840 47.36266,-73.08373 47.76313))";

const SQUARE: &str = "POLYGON((0 0,10 0,10 10,0 10,0 0))";

fn service() -> TransformService {
    TransformService::new(Arc::new(CrsRegistry::new()))
}

fn command_matches(args: &[&str]) -> clap::ArgMatches {
    ClapCommand::new("gispoly")
        .arg(Arg::new("geometry").index(1))
        .arg(Arg::new("source").long("source"))
        .arg(Arg::new("target").long("target"))
        .arg(Arg::new("prefix").long("prefix").action(ArgAction::SetTrue))
        .arg(Arg::new("wkb").long("wkb").action(ArgAction::SetTrue))
        .arg(Arg::new("inspect").long("inspect").action(ArgAction::SetTrue))
        .arg(Arg::new("list-crs").long("list-crs").action(ArgAction::SetTrue))
        .get_matches_from(std::iter::once("gispoly").chain(args.iter().copied()))
}

#[test]
fn test_end_to_end_scenario() {
    let service = service();

    let output = service.execute(SCENARIO, None, Some("epsg:32644")).unwrap();
    std::assert!(output.starts_with("POLYGON(("));

    let (projected, _) = wkt::decode(&output, 32644).unwrap();
    std::assert_eq!(projected.rings().len(), 1);
    std::assert_eq!(projected.exterior().len(), 6);
    std::assert!(projected.exterior().is_closed());
    std::assert!(projected.exterior().points().iter().all(|p| p.x.abs() > 1000.0));

    let back = service.execute(&output, Some("epsg:32644"), Some("epsg:4326")).unwrap();
    let (original, _) = wkt::decode(SCENARIO, 4326).unwrap();
    let (restored, _) = wkt::decode(&back, 4326).unwrap();

    for (a, b) in original.exterior().points().iter().zip(restored.exterior().points()) {
        std::assert!((a.x - b.x).abs() < 1e-6);
        std::assert!((a.y - b.y).abs() < 1e-6);
    }
}

#[test]
fn test_missing_target() {
    let service = service();

    for target in [None, Some(""), Some("   ")] {
        let err = service.execute(SCENARIO, None, target).unwrap_err();
        std::assert!(matches!(err, GeoError::MissingTargetCrs));
        std::assert_eq!(err.status_code(), 400);
        std::assert_eq!(err.kind(), "MissingTargetCRS");
    }
}

#[test]
fn test_unknown_crs() {
    let service = service();

    let err = service.execute(SCENARIO, None, Some("epsg:999999")).unwrap_err();
    std::assert!(matches!(err, GeoError::UnknownCrs(_)));
    std::assert_eq!(err.status_code(), 400);

    let err = service.execute(SQUARE, Some("epsg:999999"), Some("epsg:4326")).unwrap_err();
    std::assert!(matches!(err, GeoError::UnknownCrs(_)));

    let err = service.execute("SRID=999999;POLYGON((0 0,10 0,10 10,0 0))", None, Some("epsg:4326")).unwrap_err();
    std::assert!(matches!(err, GeoError::UnknownCrs(_)));
}

#[test]
fn test_malformed_geometry_is_reported_before_crs_checks() {
    let service = service();

    let err = service.execute("POLYGON((0 0,1 0,1 1,0 1))", None, None).unwrap_err();
    std::assert!(matches!(err, GeoError::MalformedGeometry(_)));
    std::assert_eq!(err.status_code(), 400);
}

#[test]
fn test_projection_failure_is_server_error() {
    let err = service()
        .execute("POLYGON((0 0,10 0,10 90,0 0))", None, Some("epsg:3857"))
        .unwrap_err();

    std::assert!(matches!(err, GeoError::ProjectionFailure(_)));
    std::assert_eq!(err.status_code(), 500);
    std::assert!(!err.is_client_error());
}

#[test]
fn test_source_priority() {
    let service = service();

    // Embedded SRID wins over the requested source
    let output = service
        .execute("SRID=4326;POLYGON((0 0,10 0,10 10,0 10,0 0))", Some("epsg:3857"), Some("epsg:4326"))
        .unwrap();
    std::assert_eq!(output, SQUARE);

    // Requested source applies to bare geometry
    let output = service.execute(SQUARE, Some("epsg:3857"), Some("epsg:4326")).unwrap();
    std::assert_ne!(output, SQUARE);

    // Default SRID applies when neither is given
    let output = service.execute(SQUARE, None, Some("epsg:4326")).unwrap();
    std::assert_eq!(output, SQUARE);

    let mercator_default = TransformService::new(Arc::new(CrsRegistry::new())).with_default_srid(3857);
    let output = mercator_default.execute(SQUARE, None, Some("epsg:4326")).unwrap();
    std::assert_ne!(output, SQUARE);
}

#[test]
fn test_output_formats() {
    let service = service();

    let prefixed = TransformService::new(Arc::new(CrsRegistry::new()))
        .with_srid_prefix(true)
        .execute(SCENARIO, None, Some("epsg:32644"))
        .unwrap();
    std::assert!(prefixed.starts_with("SRID=32644;POLYGON(("));

    let request = TransformRequest::new(SCENARIO, None, Some("epsg:32644")).with_format(OutputFormat::EwkbHex);
    let hex = service.execute_request(&request).unwrap();
    std::assert!(hex.starts_with("0103000020"));

    let (polygon, srid) = wkb::decode_ewkb_hex(&hex, 0).unwrap();
    std::assert_eq!(srid, 32644);
    std::assert_eq!(polygon.vertex_count(), 6);

    let (from_wkt, _) = wkt::decode(&prefixed, 0).unwrap();
    std::assert_eq!(polygon, from_wkt);
}

#[test]
fn test_hex_ewkb_input() {
    let service = service();
    let (square, _) = wkt::decode(SQUARE, 0).unwrap();
    let expected = service.execute(SQUARE, Some("epsg:4326"), Some("epsg:3857")).unwrap();

    // Embedded SRID is honoured
    let with_srid = wkb::encode_ewkb_hex(&square, Some(4326), ByteOrder::LittleEndian).unwrap();
    let output = service.execute(&with_srid, Some("epsg:32644"), Some("epsg:3857")).unwrap();
    std::assert_eq!(output, expected);

    // Plain WKB falls back to the requested source
    let plain = wkb::encode_ewkb_hex(&square, None, ByteOrder::BigEndian).unwrap();
    let output = service.execute(&plain, Some("epsg:4326"), Some("epsg:3857")).unwrap();
    std::assert_eq!(output, expected);

    let err = service.execute(&with_srid[..with_srid.len() - 4], None, Some("epsg:3857")).unwrap_err();
    std::assert!(matches!(err, GeoError::MalformedGeometry(_)));
}

#[test]
fn test_service_from_settings() {
    let settings = Settings {
        default_srid: 3857,
        include_srid_prefix: true,
        ..Settings::default()
    };
    let service = TransformService::from_settings(Arc::new(CrsRegistry::new()), &settings);

    let output = service.execute(SQUARE, None, Some("epsg:3857")).unwrap();
    std::assert_eq!(output, "SRID=3857;POLYGON((0 0,10 0,10 10,0 10,0 0))");
}

#[test]
fn test_concurrent_requests_share_one_registry() {
    let registry = Arc::new(CrsRegistry::new());
    let service = Arc::new(TransformService::new(Arc::clone(&registry)));

    let handles: Vec<_> = (0..4)
        .map(|_| {
            let service = Arc::clone(&service);
            std::thread::spawn(move || service.execute(SCENARIO, None, Some("epsg:32644")).unwrap())
        })
        .collect();

    let outputs: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    std::assert!(outputs.windows(2).all(|w| w[0] == w[1]));
    std::assert_eq!(registry.cached_count(), 2);
}

#[test]
fn test_store_lifecycle() {
    let store = InMemoryPolygonStore::new();

    let created = store.create(NewPolygon {
        name: "north field".to_string(),
        class_id: None,
        props: Some("{\"crop\":\"wheat\"}".to_string()),
        geom: SQUARE.to_string(),
    }).unwrap();

    std::assert_eq!(created.id, 1);
    std::assert_eq!(created.class_id, DEFAULT_CLASS_ID);
    std::assert_eq!(created.srid, 4326);
    std::assert_eq!(created.geom, format!("SRID=4326;{}", SQUARE));

    let second = store.create(NewPolygon {
        name: "south field".to_string(),
        class_id: Some(7),
        props: None,
        geom: "SRID=3857;POLYGON((0 0,1 0,1 1,0 0))".to_string(),
    }).unwrap();
    std::assert_eq!(second.id, 2);
    std::assert_eq!(second.srid, 3857);

    let renamed = store.update(1, PolygonUpdate {
        name: Some("renamed".to_string()),
        ..PolygonUpdate::default()
    }).unwrap();
    std::assert_eq!(renamed.name, "renamed");
    std::assert_eq!(renamed.geom, created.geom);
    std::assert_eq!(renamed.props, created.props);

    let ids: Vec<i64> = store.list().unwrap().iter().map(|r| r.id).collect();
    std::assert_eq!(ids, vec![1, 2]);

    store.delete(1).unwrap();
    std::assert!(matches!(store.get(1), Err(GeoError::NotFound(1))));
    std::assert!(matches!(store.delete(1), Err(GeoError::NotFound(1))));
    std::assert_eq!(store.list().unwrap().len(), 1);
}

#[test]
fn test_store_timestamps() {
    let store = InMemoryPolygonStore::new();
    let before = chrono::Utc::now();

    let created = store.create(NewPolygon {
        name: "orchard".to_string(),
        geom: SQUARE.to_string(),
        ..NewPolygon::default()
    }).unwrap();
    std::assert!(created.created >= before);
    std::assert_eq!(created.created, created.updated);
    std::assert_eq!(store.get(created.id).unwrap().created, created.created);

    let updated = store.update(created.id, PolygonUpdate {
        props: Some("{}".to_string()),
        ..PolygonUpdate::default()
    }).unwrap();
    std::assert_eq!(updated.created, created.created);
    std::assert!(updated.updated >= created.updated);

    let text = format_timestamp(&updated.created);
    std::assert_eq!(text.len(), "2024-01-01T00:00:00".len());
    std::assert_eq!(&text[10..11], "T");
}

#[test]
fn test_store_validation() {
    let store = InMemoryPolygonStore::new();

    let missing_name = store.create(NewPolygon {
        geom: SQUARE.to_string(),
        ..NewPolygon::default()
    });
    std::assert!(matches!(missing_name, Err(GeoError::InvalidRecord(_))));

    let missing_geom = store.create(NewPolygon {
        name: "empty".to_string(),
        ..NewPolygon::default()
    });
    std::assert!(matches!(missing_geom, Err(GeoError::InvalidRecord(_))));

    let bad_geom = store.create(NewPolygon {
        name: "open".to_string(),
        geom: "POLYGON((0 0,1 0,1 1,0 1))".to_string(),
        ..NewPolygon::default()
    });
    std::assert!(matches!(bad_geom, Err(GeoError::MalformedGeometry(_))));
    std::assert!(store.list().unwrap().is_empty());

    let bad_update = store.update(5, PolygonUpdate {
        name: Some("ghost".to_string()),
        ..PolygonUpdate::default()
    });
    std::assert!(matches!(bad_update, Err(GeoError::NotFound(5))));
}

#[test]
fn test_execute_stored() {
    let store = InMemoryPolygonStore::new();
    let service = service();

    let record = store.create(NewPolygon {
        name: "scenario".to_string(),
        geom: SCENARIO.to_string(),
        ..NewPolygon::default()
    }).unwrap();

    let stored = service.execute_stored(&store, record.id, Some("epsg:32644")).unwrap();
    let direct = service.execute(SCENARIO, None, Some("epsg:32644")).unwrap();
    std::assert_eq!(stored, direct);

    let err = service.execute_stored(&store, 42, Some("epsg:32644")).unwrap_err();
    std::assert!(matches!(err, GeoError::NotFound(42)));
    std::assert_eq!(err.status_code(), 404);
}

#[test]
fn test_settings_parsing() {
    let settings = Settings::from_str(r#"
        default_srid = 3857
        default_target = "epsg:32644"
        include_srid_prefix = true
        definitions = "/etc/gispoly/crs.toml"
        unrelated = 1
    "#).unwrap();

    std::assert_eq!(settings.default_srid, 3857);
    std::assert_eq!(settings.default_target.as_deref(), Some("epsg:32644"));
    std::assert!(settings.include_srid_prefix);
    std::assert_eq!(settings.definitions.as_deref(), Some("/etc/gispoly/crs.toml"));
    std::assert_eq!(settings.log_file, None);

    std::assert_eq!(Settings::from_str("").unwrap(), Settings::default());
    std::assert!(Settings::from_str("default_srid = \"4326\"").is_err());
    std::assert!(Settings::from_str("default_srid = -1").is_err());
    std::assert!(Settings::from_str("include_srid_prefix = \"yes\"").is_err());
}

#[test]
fn test_settings_overrides() {
    let settings = Settings::default()
        .with_overrides(|key| match key {
            "GISPOLY_DEFAULT_SRID" => Some("32644".to_string()),
            "GISPOLY_DEFAULT_TARGET" => Some("epsg:4326".to_string()),
            _ => None,
        })
        .unwrap();

    std::assert_eq!(settings.default_srid, 32644);
    std::assert_eq!(settings.default_target.as_deref(), Some("epsg:4326"));
    std::assert_eq!(settings.definitions, None);

    let bad = Settings::default().with_overrides(|key| {
        (key == "GISPOLY_DEFAULT_SRID").then(|| "wgs84".to_string())
    });
    std::assert!(bad.is_err());
}

#[test]
fn test_error_display() {
    std::assert_eq!(
        GeoError::UnknownCrs("epsg:999999".to_string()).to_string(),
        "Unknown coordinate reference system: epsg:999999"
    );
    std::assert_eq!(
        GeoError::NotFound(3).to_string(),
        "Object 3 does not exist or id is incorrect"
    );
}

#[test]
fn test_inspect_command_report() {
    let logger = Logger::disabled();
    let matches = command_matches(&["--inspect", "SRID=32644;POLYGON((0 0,10 0,10 10,0 10,0 0),(4 4,6 4,6 6,4 4))"]);
    let context = CommandContext {
        settings: Settings::default(),
        registry: Arc::new(CrsRegistry::new()),
        logger: &logger,
    };

    let report = InspectCommand::new(&matches, context).unwrap().report().unwrap();

    std::assert!(report.starts_with("Polygon Inspection Results:\n"));
    std::assert!(report.contains("Encoding: WKT"));
    std::assert!(report.contains("SRID: 32644 (WGS 84 / UTM zone 44N)"));
    std::assert!(report.contains("Vertices: 9"));
    std::assert!(report.contains("Envelope: 0,0,10,10 (EPSG:32644)\n"));
    std::assert!(report.contains("Extent: 10 x 10, center 5 5\n"));
}

#[test]
fn test_inspect_command_reads_hex_ewkb() {
    let logger = Logger::disabled();
    let (polygon, _) = wkt::decode(SQUARE, 4326).unwrap();
    let hex = wkb::encode_ewkb_hex(&polygon, Some(3857), ByteOrder::LittleEndian).unwrap();

    let matches = command_matches(&["--inspect", &hex]);
    let context = CommandContext {
        settings: Settings::default(),
        registry: Arc::new(CrsRegistry::new()),
        logger: &logger,
    };

    let report = InspectCommand::new(&matches, context).unwrap().report().unwrap();
    std::assert!(report.contains("Encoding: EWKB"));
    std::assert!(report.contains("SRID: 3857 (WGS 84 / Pseudo-Mercator)"));
    std::assert!(report.contains("(EPSG:3857)"));
}

#[test]
fn test_list_crs_command() {
    let logger = Logger::disabled();
    let context = CommandContext {
        settings: Settings::default(),
        registry: Arc::new(CrsRegistry::new()),
        logger: &logger,
    };

    let lines = ListCrsCommand::new(context).lines();
    std::assert_eq!(lines.len(), 5);
    std::assert!(lines[0].starts_with("epsg:3857"));
    std::assert!(lines[3].contains("lon_0=81"));
    std::assert!(lines[4].contains("by rule"));
}
