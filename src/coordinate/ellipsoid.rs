//! Reference ellipsoid parameters

/// An oblate reference ellipsoid
#[derive(Debug, Clone, PartialEq)]
pub struct Ellipsoid {
    /// Ellipsoid name as listed in the definition table
    pub name: String,
    /// Semi-major axis in meters
    pub semi_major: f64,
    /// Inverse flattening (1/f)
    pub inverse_flattening: f64,
}

impl Ellipsoid {
    /// Create a new ellipsoid
    pub fn new(name: &str, semi_major: f64, inverse_flattening: f64) -> Self {
        Ellipsoid {
            name: name.to_string(),
            semi_major,
            inverse_flattening,
        }
    }

    /// WGS 84 ellipsoid
    pub fn wgs84() -> Self {
        Ellipsoid::new("WGS84", 6378137.0, 298.257223563)
    }

    /// Flattening f
    pub fn flattening(&self) -> f64 {
        1.0 / self.inverse_flattening
    }

    /// First eccentricity e
    pub fn eccentricity(&self) -> f64 {
        let f = self.flattening();
        (f * (2.0 - f)).sqrt()
    }

    /// Third flattening n = f / (2 - f)
    pub fn third_flattening(&self) -> f64 {
        let f = self.flattening();
        f / (2.0 - f)
    }
}
