//! Latitude-dependent distance scale on the WGS84 reference ellipsoid.
//!
//! A 2dsphere-style geospatial index interprets its "max distance" parameter
//! in linear units (meters) on a terrestrial reference body, not in angular
//! degrees. To query such an index with an angular radius, the radius is
//! multiplied by the meters-per-degree scale at the search center's latitude;
//! annotated distances coming back are divided by the same factor.
//!
//! # Precision boundary
//!
//! The scale is evaluated at the *center's* latitude only, never at the
//! target's. The resulting distances are internally consistent with the
//! query but are not exact great-circle separations: the error grows with
//! absolute latitude and with separation size — empirically below 0.1° for
//! separations under ~20°, approaching ~1° near 180°. Exact re-ranking, when
//! needed, uses [`crate::Coordinate::angular_separation`] instead.

use crate::constants::{DEG_TO_RAD, WGS84_ECCENTRICITY_SQUARED, WGS84_SEMI_MAJOR_AXIS_M};

/// Meters of meridian arc per degree of latitude at `lat_deg`.
///
/// Computes the meridian radius of curvature
/// `Rm = a·(1-e²) / (1 - e²·sin²φ)^{3/2}` and scales it by π/180.
/// Pure and total over [-90, 90]; on the oblate WGS84 spheroid the value
/// is smallest at the equator (≈110,574 m/deg) and largest at the poles
/// (≈111,694 m/deg).
pub fn meters_per_degree(lat_deg: f64) -> f64 {
    let sin_lat = libm::sin(lat_deg * DEG_TO_RAD);
    let denom = 1.0 - WGS84_ECCENTRICITY_SQUARED * sin_lat * sin_lat;
    let meridian_radius =
        WGS84_SEMI_MAJOR_AXIS_M * (1.0 - WGS84_ECCENTRICITY_SQUARED) / (denom * libm::sqrt(denom));
    meridian_radius * DEG_TO_RAD
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equator_reference_value() {
        let m = meters_per_degree(0.0);
        assert!((m - 110_574.3).abs() < 0.5, "m/deg at equator = {}", m);
    }

    #[test]
    fn test_pole_reference_value() {
        let m = meters_per_degree(90.0);
        assert!((m - 111_694.0).abs() < 0.5, "m/deg at pole = {}", m);
    }

    #[test]
    fn test_monotonic_from_equator_to_pole() {
        // Meridian curvature flattens toward the poles on an oblate
        // spheroid, so the arc per degree must strictly increase.
        let mut prev = meters_per_degree(0.0);
        for lat in [15.0, 30.0, 45.0, 60.0, 75.0, 90.0] {
            let m = meters_per_degree(lat);
            assert!(m > prev, "not increasing at lat {}: {} <= {}", lat, m, prev);
            prev = m;
        }
    }

    #[test]
    fn test_symmetric_in_hemisphere() {
        for lat in [10.0, 35.0, 80.0] {
            let north = meters_per_degree(lat);
            let south = meters_per_degree(-lat);
            assert!((north - south).abs() < 1e-9);
        }
    }
}
