//! Projection families and their forward/inverse mathematics
//!
//! Forward maps geographic longitude/latitude (degrees) to projected
//! coordinates (meters); inverse maps back. The set of families is closed,
//! so dispatch is a plain enum rather than a trait object.
//!
//! Transverse Mercator uses Krüger's series to sixth order in the third
//! flattening, which keeps forward/inverse round trips well below a
//! millimetre across a UTM zone and usable far outside it.

use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use log::debug;

use super::ellipsoid::Ellipsoid;
use super::point::Point;
use crate::errors::{GeoError, GeoResult};

/// Upper bound on Newton steps when recovering latitude
const MAX_ITERATIONS: usize = 10;

/// Parameters of a Transverse Mercator projection, as read from a definition
#[derive(Debug, Clone, PartialEq)]
pub struct TransverseMercatorParams {
    /// Longitude of the central meridian in degrees
    pub central_meridian: f64,
    /// Latitude of origin in degrees
    pub latitude_of_origin: f64,
    /// Scale factor on the central meridian
    pub scale_factor: f64,
    /// False easting in meters
    pub false_easting: f64,
    /// False northing in meters
    pub false_northing: f64,
}

impl TransverseMercatorParams {
    /// Parameters of a WGS 84 UTM zone
    pub fn utm(zone: u8, is_northern: bool) -> Self {
        TransverseMercatorParams {
            central_meridian: zone as f64 * 6.0 - 183.0,
            latitude_of_origin: 0.0,
            scale_factor: 0.9996,
            false_easting: 500000.0,
            false_northing: if is_northern { 0.0 } else { 10000000.0 },
        }
    }
}

/// Transverse Mercator with the series coefficients precomputed for one ellipsoid
#[derive(Debug, Clone)]
pub struct TransverseMercator {
    params: TransverseMercatorParams,
    e: f64,
    e2m: f64,
    rectifying_radius: f64,
    alpha: [f64; 6],
    beta: [f64; 6],
    origin_northing: f64,
}

impl TransverseMercator {
    /// Build the projection for the given parameters and ellipsoid
    pub fn new(params: TransverseMercatorParams, ellipsoid: &Ellipsoid) -> Self {
        let n = ellipsoid.third_flattening();
        let n2 = n * n;
        let n3 = n2 * n;
        let n4 = n3 * n;
        let n5 = n4 * n;
        let n6 = n5 * n;

        let rectifying_radius = ellipsoid.semi_major / (1.0 + n)
            * (1.0 + n2 / 4.0 + n4 / 64.0 + n6 / 256.0);

        let alpha = [
            n / 2.0 - 2.0 * n2 / 3.0 + 5.0 * n3 / 16.0 + 41.0 * n4 / 180.0
                - 127.0 * n5 / 288.0 + 7891.0 * n6 / 37800.0,
            13.0 * n2 / 48.0 - 3.0 * n3 / 5.0 + 557.0 * n4 / 1440.0
                + 281.0 * n5 / 630.0 - 1983433.0 * n6 / 1935360.0,
            61.0 * n3 / 240.0 - 103.0 * n4 / 140.0 + 15061.0 * n5 / 26880.0
                + 167603.0 * n6 / 181440.0,
            49561.0 * n4 / 161280.0 - 179.0 * n5 / 168.0 + 6601661.0 * n6 / 7257600.0,
            34729.0 * n5 / 80640.0 - 3418889.0 * n6 / 1995840.0,
            212378941.0 * n6 / 319334400.0,
        ];

        let beta = [
            n / 2.0 - 2.0 * n2 / 3.0 + 37.0 * n3 / 96.0 - n4 / 360.0
                - 81.0 * n5 / 512.0 + 96199.0 * n6 / 604800.0,
            n2 / 48.0 + n3 / 15.0 - 437.0 * n4 / 1440.0 + 46.0 * n5 / 105.0
                - 1118711.0 * n6 / 3870720.0,
            17.0 * n3 / 480.0 - 37.0 * n4 / 840.0 - 209.0 * n5 / 4480.0
                + 5569.0 * n6 / 90720.0,
            4397.0 * n4 / 161280.0 - 11.0 * n5 / 504.0 - 830251.0 * n6 / 7257600.0,
            4583.0 * n5 / 161280.0 - 108847.0 * n6 / 3991680.0,
            20648693.0 * n6 / 638668800.0,
        ];

        let e = ellipsoid.eccentricity();
        let mut tm = TransverseMercator {
            params,
            e,
            e2m: 1.0 - e * e,
            rectifying_radius,
            alpha,
            beta,
            origin_northing: 0.0,
        };

        // Meridian distance from the equator to the latitude of origin
        let origin_taup = conformal_tau(tm.params.latitude_of_origin.to_radians().tan(), e);
        let (origin_xi, _) = apply_series(&tm.alpha, origin_taup.atan(), 0.0, 1.0);
        tm.origin_northing = rectifying_radius * origin_xi;

        tm
    }

    /// Projection parameters
    pub fn params(&self) -> &TransverseMercatorParams {
        &self.params
    }

    /// Geographic (degrees) to projected (meters)
    pub fn forward(&self, lon: f64, lat: f64) -> GeoResult<Point> {
        check_geographic(lon, lat)?;

        let lam = normalize_longitude(lon - self.params.central_meridian).to_radians();
        let taup = conformal_tau(lat.to_radians().tan(), self.e);

        let xip = taup.atan2(lam.cos());
        let etap = (lam.sin() / (1.0 + taup * taup).sqrt()).atanh();
        if !etap.is_finite() {
            return Err(GeoError::ProjectionFailure(format!(
                "point ({}, {}) lies on the Transverse Mercator singularity 90 degrees from central meridian {}",
                lon, lat, self.params.central_meridian
            )));
        }

        let (xi, eta) = apply_series(&self.alpha, xip, etap, 1.0);

        let k0 = self.params.scale_factor;
        let x = self.params.false_easting + k0 * self.rectifying_radius * eta;
        let y = self.params.false_northing
            + k0 * (self.rectifying_radius * xi - self.origin_northing);

        finite_or_fail(Point::new(x, y), "Transverse Mercator forward", lon, lat)
    }

    /// Projected (meters) to geographic (degrees)
    pub fn inverse(&self, x: f64, y: f64) -> GeoResult<Point> {
        if !x.is_finite() || !y.is_finite() {
            return Err(GeoError::ProjectionFailure(format!(
                "non-finite projected coordinate ({}, {})", x, y
            )));
        }

        let k0 = self.params.scale_factor;
        let xi = ((y - self.params.false_northing) / k0 + self.origin_northing)
            / self.rectifying_radius;
        let eta = (x - self.params.false_easting) / (k0 * self.rectifying_radius);

        let (xip, etap) = apply_series(&self.beta, xi, eta, -1.0);

        let s = etap.sinh();
        let c = xip.cos();
        let r = s.hypot(c);

        let (phi, lam) = if r == 0.0 {
            // Pole: longitude is arbitrary, report the central meridian
            (FRAC_PI_2.copysign(xip.sin()), 0.0)
        } else {
            let taup = xip.sin() / r;
            let tau = solve_tau(taup, self.e, self.e2m)?;
            (tau.atan(), s.atan2(c))
        };

        let lon = normalize_longitude(self.params.central_meridian + lam.to_degrees());
        let lat = phi.to_degrees();

        let point = finite_or_fail(Point::new(lon, lat), "Transverse Mercator inverse", x, y)?;
        check_geographic(point.x, point.y)?;
        Ok(point)
    }
}

/// A projection family with its parameters
#[derive(Debug, Clone)]
pub enum Projection {
    /// Longitude/latitude in degrees; forward and inverse are identities
    Geographic,
    /// Ellipsoidal Transverse Mercator (UTM zones and friends)
    TransverseMercator(TransverseMercator),
    /// Spherical Mercator on the ellipsoid's semi-major axis (EPSG:3857)
    WebMercator {
        /// Sphere radius in meters
        radius: f64,
    },
}

impl Projection {
    /// Short name of the projection family
    pub fn family(&self) -> &'static str {
        match self {
            Projection::Geographic => "geographic",
            Projection::TransverseMercator(_) => "transverse_mercator",
            Projection::WebMercator { .. } => "web_mercator",
        }
    }

    /// Whether coordinates are longitude/latitude
    pub fn is_geographic(&self) -> bool {
        matches!(self, Projection::Geographic)
    }

    /// Geographic longitude/latitude to this projection's coordinates
    pub fn forward(&self, lonlat: Point) -> GeoResult<Point> {
        match self {
            Projection::Geographic => {
                check_geographic(lonlat.x, lonlat.y)?;
                Ok(lonlat)
            }
            Projection::TransverseMercator(tm) => tm.forward(lonlat.x, lonlat.y),
            Projection::WebMercator { radius } => web_mercator_forward(*radius, lonlat.x, lonlat.y),
        }
    }

    /// This projection's coordinates to geographic longitude/latitude
    pub fn inverse(&self, point: Point) -> GeoResult<Point> {
        match self {
            Projection::Geographic => {
                check_geographic(point.x, point.y)?;
                Ok(point)
            }
            Projection::TransverseMercator(tm) => tm.inverse(point.x, point.y),
            Projection::WebMercator { radius } => web_mercator_inverse(*radius, point.x, point.y),
        }
    }
}

/// Convert from geographic degrees to spherical Web Mercator meters
fn web_mercator_forward(radius: f64, lon: f64, lat: f64) -> GeoResult<Point> {
    check_geographic(lon, lat)?;
    if lat.abs() >= 90.0 {
        return Err(GeoError::ProjectionFailure(format!(
            "Web Mercator is undefined at latitude {}", lat
        )));
    }

    let x = radius * wrap_longitude(lon).to_radians();
    let y = radius * (FRAC_PI_4 + lat.to_radians() / 2.0).tan().ln();

    finite_or_fail(Point::new(x, y), "Web Mercator forward", lon, lat)
}

/// Convert from spherical Web Mercator meters to geographic degrees
fn web_mercator_inverse(radius: f64, x: f64, y: f64) -> GeoResult<Point> {
    let lon = wrap_longitude((x / radius).to_degrees());
    let lat = (2.0 * (y / radius).exp().atan() - FRAC_PI_2).to_degrees();

    finite_or_fail(Point::new(lon, lat), "Web Mercator inverse", x, y)
}

/// Tangent of the conformal latitude for a given tangent of geodetic latitude
fn conformal_tau(tau: f64, e: f64) -> f64 {
    let tau1 = (1.0 + tau * tau).sqrt();
    let sig = (e * (e * tau / tau1).atanh()).sinh();
    tau * (1.0 + sig * sig).sqrt() - sig * tau1
}

/// Invert `conformal_tau` with Newton's method
fn solve_tau(taup: f64, e: f64, e2m: f64) -> GeoResult<f64> {
    let tol = f64::EPSILON.sqrt() / 10.0 * taup.abs().max(1.0);
    let mut tau = taup / e2m;

    for i in 0..MAX_ITERATIONS {
        let taupa = conformal_tau(tau, e);
        let dtau = (taup - taupa) * (1.0 + e2m * tau * tau)
            / (e2m * (1.0 + tau * tau).sqrt() * (1.0 + taupa * taupa).sqrt());
        tau += dtau;

        if !tau.is_finite() {
            break;
        }
        if dtau.abs() < tol {
            debug!("Latitude converged after {} iterations", i + 1);
            return Ok(tau);
        }
    }

    Err(GeoError::ProjectionFailure(format!(
        "latitude did not converge for conformal tangent {}", taup
    )))
}

/// Evaluate the Krüger trigonometric series; `sign` is +1 for forward, -1 for inverse
fn apply_series(coeffs: &[f64; 6], xi: f64, eta: f64, sign: f64) -> (f64, f64) {
    let mut out_xi = xi;
    let mut out_eta = eta;

    for (j, c) in coeffs.iter().enumerate() {
        let k = 2.0 * (j + 1) as f64;
        out_xi += sign * c * (k * xi).sin() * (k * eta).cosh();
        out_eta += sign * c * (k * xi).cos() * (k * eta).sinh();
    }

    (out_xi, out_eta)
}

/// Wrap a longitude in degrees into (-180, 180]
pub fn normalize_longitude(lon: f64) -> f64 {
    let wrapped = lon % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped <= -180.0 {
        wrapped + 360.0
    } else {
        wrapped
    }
}

/// Bring a longitude past the antimeridian back into range
///
/// Values within rounding noise of +/-180 keep their sign.
fn wrap_longitude(lon: f64) -> f64 {
    if lon.abs() > 180.0 + 1e-9 {
        normalize_longitude(lon)
    } else {
        lon
    }
}

fn check_geographic(lon: f64, lat: f64) -> GeoResult<()> {
    if !lon.is_finite() || !lat.is_finite() {
        return Err(GeoError::ProjectionFailure(format!(
            "non-finite geographic coordinate ({}, {})", lon, lat
        )));
    }
    if lat.abs() > 90.0 {
        return Err(GeoError::ProjectionFailure(format!(
            "latitude {} is outside [-90, 90]", lat
        )));
    }
    Ok(())
}

fn finite_or_fail(point: Point, step: &str, in_x: f64, in_y: f64) -> GeoResult<Point> {
    if point.is_finite() {
        Ok(point)
    } else {
        Err(GeoError::ProjectionFailure(format!(
            "{} produced no finite result for ({}, {})", step, in_x, in_y
        )))
    }
}
