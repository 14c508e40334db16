//! Tests for the projection mathematics

extern crate std;

use crate::coordinate::{
    normalize_longitude, CrsDefinition, Ellipsoid, Point, Projection, TransverseMercator,
    TransverseMercatorParams,
};
use crate::errors::GeoError;

fn utm(zone: u8, north: bool) -> TransverseMercator {
    TransverseMercator::new(TransverseMercatorParams::utm(zone, north), &Ellipsoid::wgs84())
}

fn web_mercator() -> Projection {
    Projection::WebMercator { radius: 6378137.0 }
}

fn assert_close(actual: f64, expected: f64, tolerance: f64) {
    std::assert!(
        (actual - expected).abs() <= tolerance,
        "expected {} within {}, got {}", expected, tolerance, actual
    );
}

#[test]
fn test_utm_params() {
    let params = TransverseMercatorParams::utm(44, true);
    std::assert_eq!(params.central_meridian, 81.0);
    std::assert_eq!(params.false_northing, 0.0);

    let south = TransverseMercatorParams::utm(1, false);
    std::assert_eq!(south.central_meridian, -177.0);
    std::assert_eq!(south.false_northing, 10000000.0);
}

#[test]
fn test_central_meridian_on_equator() {
    let p = utm(44, true).forward(81.0, 0.0).unwrap();
    assert_close(p.x, 500000.0, 1e-9);
    assert_close(p.y, 0.0, 1e-9);
}

#[test]
fn test_meridian_arc_at_45_degrees() {
    // 0.9996 times the WGS 84 meridian arc length to 45N
    let p = utm(31, true).forward(3.0, 45.0).unwrap();
    assert_close(p.x, 500000.0, 1e-6);
    assert_close(p.y, 4982950.4002, 1e-3);
}

#[test]
fn test_forward_known_points() {
    let p = utm(44, true).forward(78.0, 20.0).unwrap();
    assert_close(p.x, 186073.6796, 1e-3);
    assert_close(p.y, 2214294.0263, 1e-3);

    let south = utm(44, false).forward(80.5, -10.0).unwrap();
    assert_close(south.x, 445201.5878, 1e-3);
    assert_close(south.y, 8894545.9881, 1e-3);
}

#[test]
fn test_round_trip_within_zone() {
    let tm = utm(44, true);
    for (lon, lat) in [(81.0, 0.0), (78.0, 20.0), (83.9, 45.5), (79.25, 84.0), (84.0, 0.001)] {
        let p = tm.forward(lon, lat).unwrap();
        let back = tm.inverse(p.x, p.y).unwrap();
        assert_close(back.x, lon, 1e-9);
        assert_close(back.y, lat, 1e-9);
    }
}

#[test]
fn test_round_trip_far_from_zone() {
    let tm = utm(44, true);
    for (lon, lat) in [(-73.08373, 47.76313), (-73.0840, 47.36266), (150.0, -30.0)] {
        let p = tm.forward(lon, lat).unwrap();
        let back = tm.inverse(p.x, p.y).unwrap();
        assert_close(back.x, lon, 1e-6);
        assert_close(back.y, lat, 1e-6);
    }
}

#[test]
fn test_inverse_then_forward_in_meters() {
    let tm = utm(44, true);
    for (x, y) in [(500000.0, 0.0), (186073.68, 2214294.03), (700000.0, 5000000.0)] {
        let geo = tm.inverse(x, y).unwrap();
        let p = tm.forward(geo.x, geo.y).unwrap();
        assert_close(p.x, x, 0.01);
        assert_close(p.y, y, 0.01);
    }
}

#[test]
fn test_latitude_of_origin_offsets_northing() {
    let params = TransverseMercatorParams {
        central_meridian: 24.0,
        latitude_of_origin: 45.0,
        scale_factor: 1.0,
        false_easting: 0.0,
        false_northing: 0.0,
    };
    let tm = TransverseMercator::new(params, &Ellipsoid::wgs84());

    let origin = tm.forward(24.0, 45.0).unwrap();
    assert_close(origin.x, 0.0, 1e-6);
    assert_close(origin.y, 0.0, 1e-6);

    let back = tm.inverse(0.0, 0.0).unwrap();
    assert_close(back.y, 45.0, 1e-9);
}

#[test]
fn test_singularity_fails() {
    let result = utm(44, true).forward(171.0, 0.0);
    std::assert!(matches!(result, Err(GeoError::ProjectionFailure(_))));
}

#[test]
fn test_invalid_geographic_input_fails() {
    let tm = utm(44, true);
    std::assert!(matches!(tm.forward(81.0, 91.0), Err(GeoError::ProjectionFailure(_))));
    std::assert!(matches!(tm.forward(f64::NAN, 0.0), Err(GeoError::ProjectionFailure(_))));
    std::assert!(matches!(tm.inverse(f64::INFINITY, 0.0), Err(GeoError::ProjectionFailure(_))));

    let geographic = Projection::Geographic;
    std::assert!(geographic.forward(Point::new(10.0, -90.5)).is_err());
    std::assert!(geographic.inverse(Point::new(10.0, 95.0)).is_err());
}

#[test]
fn test_geographic_is_identity() {
    let p = Point::new(-73.08373, 47.76313);
    std::assert_eq!(Projection::Geographic.forward(p).unwrap(), p);
    std::assert_eq!(Projection::Geographic.inverse(p).unwrap(), p);
}

#[test]
fn test_web_mercator_known_values() {
    let wm = web_mercator();

    let edge = wm.forward(Point::new(180.0, 0.0)).unwrap();
    assert_close(edge.x, 20037508.342789244, 1e-6);
    assert_close(edge.y, 0.0, 1e-9);

    let mid = wm.forward(Point::new(0.0, 45.0)).unwrap();
    assert_close(mid.y, 5621521.486192066, 1e-6);

    let back = wm.inverse(mid).unwrap();
    assert_close(back.x, 0.0, 1e-12);
    assert_close(back.y, 45.0, 1e-9);
}

#[test]
fn test_web_mercator_wraps_longitude() {
    let wm = web_mercator();

    let back = wm.inverse(Point::new(3.0e7, 0.0)).unwrap();
    assert_close(back.x, -90.50541476414361, 1e-9);
    let back = wm.inverse(Point::new(-3.0e7, 0.0)).unwrap();
    assert_close(back.x, 90.50541476414361, 1e-9);

    let wrapped = wm.forward(Point::new(400.0, 10.0)).unwrap();
    let plain = wm.forward(Point::new(40.0, 10.0)).unwrap();
    assert_close(wrapped.x, 4452779.631730943, 1e-6);
    assert_close(wrapped.x, plain.x, 1e-6);
    assert_close(wrapped.y, plain.y, 1e-9);

    // the antimeridian edges keep their sign
    let west = wm.forward(Point::new(-180.0, 0.0)).unwrap();
    assert_close(west.x, -20037508.342789244, 1e-6);
    assert_close(wm.inverse(west).unwrap().x, -180.0, 1e-9);
}

#[test]
fn test_web_mercator_fails_at_poles() {
    let wm = web_mercator();
    std::assert!(matches!(wm.forward(Point::new(0.0, 90.0)), Err(GeoError::ProjectionFailure(_))));
    std::assert!(matches!(wm.forward(Point::new(0.0, -90.0)), Err(GeoError::ProjectionFailure(_))));
}

#[test]
fn test_projection_family_names() {
    std::assert_eq!(Projection::Geographic.family(), "geographic");
    std::assert_eq!(web_mercator().family(), "web_mercator");

    let srs = CrsDefinition::utm(44, true).build();
    std::assert_eq!(srs.projection().family(), "transverse_mercator");
    std::assert!(!srs.is_geographic());
}

#[test]
fn test_normalize_longitude() {
    std::assert_eq!(normalize_longitude(190.0), -170.0);
    std::assert_eq!(normalize_longitude(-190.0), 170.0);
    std::assert_eq!(normalize_longitude(180.0), 180.0);
    std::assert_eq!(normalize_longitude(-180.0), 180.0);
    std::assert_eq!(normalize_longitude(540.0), 180.0);
    std::assert_eq!(normalize_longitude(45.5), 45.5);
}

#[test]
fn test_ellipsoid_constants() {
    let wgs84 = Ellipsoid::wgs84();
    assert_close(wgs84.eccentricity(), 0.0818191908426215, 1e-15);
    assert_close(wgs84.third_flattening(), 0.0016792203863837047, 1e-15);
}
