//! Celestial coordinates and angular separation.
//!
//! [`Coordinate`] stores a right ascension / declination pair in the catalog
//! convention (RA in [0, 360), Dec in [-90, 90]). Construction validates and
//! normalizes, so downstream code never re-checks ranges.
//!
//! Two distinct distance notions live in this crate; only one is here:
//!
//! - [`Coordinate::angular_separation`] — the exact great-circle separation
//!   on a perfect sphere (Vincenty formula, accurate at all separations).
//!   Used for final re-ranking and verification.
//! - [`crate::ellipsoid::meters_per_degree`] — an approximate, index-side
//!   scale factor. Never used for re-ranking.

use serde::{Deserialize, Serialize};

use crate::constants::{DEG_TO_RAD, RAD_TO_DEG};
use crate::errors::{SearchError, SearchResult};

/// A sky position in the ICRS catalog convention.
///
/// RA is normalized into [0, 360) at construction; Dec must lie in
/// [-90, 90]. Fields are private so every live value is valid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    ra_deg: f64,
    dec_deg: f64,
}

impl Coordinate {
    /// Creates a validated coordinate.
    ///
    /// RA is reduced modulo 360 into [0, 360) — an input of exactly 360
    /// becomes 0. Dec outside [-90, 90], or any non-finite input, fails
    /// with [`SearchError::InvalidCoordinate`].
    pub fn new(ra_deg: f64, dec_deg: f64) -> SearchResult<Self> {
        if !ra_deg.is_finite() || !dec_deg.is_finite() {
            return Err(SearchError::invalid_coordinate(
                ra_deg,
                dec_deg,
                "coordinate components must be finite",
            ));
        }
        if !(-90.0..=90.0).contains(&dec_deg) {
            return Err(SearchError::invalid_coordinate(
                ra_deg,
                dec_deg,
                "declination outside [-90, 90]",
            ));
        }
        let mut ra = libm::fmod(ra_deg, 360.0);
        if ra < 0.0 {
            ra += 360.0;
        }
        Ok(Self {
            ra_deg: ra,
            dec_deg,
        })
    }

    /// Right ascension in degrees, in [0, 360).
    pub fn ra_deg(&self) -> f64 {
        self.ra_deg
    }

    /// Declination in degrees, in [-90, 90].
    pub fn dec_deg(&self) -> f64 {
        self.dec_deg
    }

    /// Converts to the longitude/latitude convention of a terrestrial
    /// sphere index: `lon = ra - 180`, `lat = dec`.
    ///
    /// The output longitude is always in [-180, 180). The mapping is lossy
    /// at the seam: RA 0 and RA 360 both land on lon -180, so queries that
    /// straddle the seam rely on the store's spherical distance math rather
    /// than longitude range arithmetic.
    pub fn to_lon_lat(&self) -> (f64, f64) {
        (self.ra_deg - 180.0, self.dec_deg)
    }

    /// Exact great-circle separation from `other`, in degrees.
    ///
    /// Vincenty formula on the unit sphere; numerically stable from
    /// coincident points out to antipodes.
    pub fn angular_separation(&self, other: &Coordinate) -> f64 {
        let dec1 = self.dec_deg * DEG_TO_RAD;
        let dec2 = other.dec_deg * DEG_TO_RAD;
        let delta_lon = (other.ra_deg - self.ra_deg) * DEG_TO_RAD;

        let (d1_sin, d1_cos) = libm::sincos(dec1);
        let (d2_sin, d2_cos) = libm::sincos(dec2);

        vincenty_angular_separation(d1_sin, d1_cos, d2_sin, d2_cos, delta_lon) * RAD_TO_DEG
    }
}

/// Angular separation in radians from precomputed sines/cosines.
#[inline]
pub(crate) fn vincenty_angular_separation(
    sin_lat1: f64,
    cos_lat1: f64,
    sin_lat2: f64,
    cos_lat2: f64,
    delta_lon: f64,
) -> f64 {
    let (sin_delta_lon, cos_delta_lon) = libm::sincos(delta_lon);

    let num = libm::sqrt(
        (cos_lat2 * sin_delta_lon).powi(2)
            + (cos_lat1 * sin_lat2 - sin_lat1 * cos_lat2 * cos_delta_lon).powi(2),
    );
    let den = sin_lat1 * sin_lat2 + cos_lat1 * cos_lat2 * cos_delta_lon;

    libm::atan2(num, den)
}

// Deserialization funnels through `new` so stored documents with bad
// ranges are rejected at the boundary, not at first use.
impl<'de> Deserialize<'de> for Coordinate {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        #[derive(Deserialize)]
        struct Raw {
            ra_deg: f64,
            dec_deg: f64,
        }
        let raw = Raw::deserialize(deserializer)?;
        Coordinate::new(raw.ra_deg, raw.dec_deg).map_err(serde::de::Error::custom)
    }
}
