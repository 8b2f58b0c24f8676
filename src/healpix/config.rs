//! Pixel index configuration.
//!
//! A dataset indexed with one [`PixelIndexConfig`] can only be queried with
//! the same config: pixel ids from a different nside or ordering never match
//! the stored buckets, and the naive failure mode is a silent empty result
//! set. The [`fingerprint`](PixelIndexConfig::fingerprint) string is stored
//! alongside the indexed data so that mismatch is detected and surfaced as
//! [`ConfigMismatch`](crate::SearchError::ConfigMismatch) instead.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{ARCSEC_PER_DEGREE, HEALPIX_PIXEL_SCALE_DEG};
use crate::errors::{SearchError, SearchResult};

/// Largest supported order; 12·nside² must stay within i64 for stored ids.
const MAX_ORDER: u32 = 29;

/// Pixel numbering convention. Must match between index build and query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ordering {
    /// Z-order within each base face; children of a pixel are contiguous.
    Nested,
    /// Consecutive numbering along isolatitude rings from the north pole.
    Ring,
}

impl fmt::Display for Ordering {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ordering::Nested => write!(f, "nested"),
            Ordering::Ring => write!(f, "ring"),
        }
    }
}

/// Reference frame tag carried with the config.
///
/// The pixel math is frame-agnostic; the tag exists so a query against data
/// indexed in a different frame is caught by the fingerprint check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Frame {
    Icrs,
    Galactic,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Frame::Icrs => write!(f, "icrs"),
            Frame::Galactic => write!(f, "galactic"),
        }
    }
}

/// Fixed parameters of a hierarchical pixelization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelIndexConfig {
    /// Requested angular resolution in arcseconds.
    pub resolution_arcsec: f64,
    /// Power-of-two resolution parameter; total pixel count is 12·nside².
    pub nside: u32,
    pub ordering: Ordering,
    pub frame: Frame,
}

impl PixelIndexConfig {
    /// Derives the smallest power-of-two nside whose pixel edge is no
    /// larger than `resolution_arcsec`.
    ///
    /// Rounding always goes toward finer granularity; a coarser grid would
    /// silently miss matches near pixel boundaries.
    ///
    /// # Errors
    /// [`InvalidConfig`](SearchError::InvalidConfig) for a non-positive or
    /// non-finite resolution, or one fine enough to overflow the supported
    /// order range.
    pub fn for_resolution(
        resolution_arcsec: f64,
        ordering: Ordering,
        frame: Frame,
    ) -> SearchResult<Self> {
        if !resolution_arcsec.is_finite() || resolution_arcsec <= 0.0 {
            return Err(SearchError::invalid_config(format!(
                "resolution must be positive, got {} arcsec",
                resolution_arcsec
            )));
        }
        let edge = |nside: u32| HEALPIX_PIXEL_SCALE_DEG * ARCSEC_PER_DEGREE / nside as f64;
        let mut nside: u32 = 1;
        while edge(nside) > resolution_arcsec {
            if nside.trailing_zeros() + 1 > MAX_ORDER {
                return Err(SearchError::invalid_config(format!(
                    "resolution {} arcsec needs nside beyond 2^{}",
                    resolution_arcsec, MAX_ORDER
                )));
            }
            nside <<= 1;
        }
        Ok(Self {
            resolution_arcsec,
            nside,
            ordering,
            frame,
        })
    }

    /// Builds a config from an explicit nside.
    ///
    /// # Errors
    /// [`InvalidConfig`](SearchError::InvalidConfig) unless nside is a
    /// power of two in [1, 2^29].
    pub fn with_nside(nside: u32, ordering: Ordering, frame: Frame) -> SearchResult<Self> {
        if nside == 0 || !nside.is_power_of_two() || nside.trailing_zeros() > MAX_ORDER {
            return Err(SearchError::invalid_config(format!(
                "nside must be a power of two in [1, 2^{}], got {}",
                MAX_ORDER, nside
            )));
        }
        let resolution_arcsec = HEALPIX_PIXEL_SCALE_DEG * ARCSEC_PER_DEGREE / nside as f64;
        Ok(Self {
            resolution_arcsec,
            nside,
            ordering,
            frame,
        })
    }

    /// HEALPix order: nside = 2^order.
    pub fn order(&self) -> u32 {
        self.nside.trailing_zeros()
    }

    /// Total pixel count, 12·nside².
    pub fn npix(&self) -> u64 {
        12 * (self.nside as u64) * (self.nside as u64)
    }

    /// Characteristic pixel edge length in arcseconds.
    pub fn pixel_edge_arcsec(&self) -> f64 {
        HEALPIX_PIXEL_SCALE_DEG * ARCSEC_PER_DEGREE / self.nside as f64
    }

    /// Characteristic pixel edge length in degrees.
    pub fn pixel_edge_deg(&self) -> f64 {
        HEALPIX_PIXEL_SCALE_DEG / self.nside as f64
    }

    /// Stable identity of the indexing parameters.
    ///
    /// Stored as collection metadata at index-build time and compared at
    /// query time. Resolution is deliberately excluded: two requested
    /// resolutions that derive the same nside produce identical buckets.
    pub fn fingerprint(&self) -> String {
        format!(
            "nside={};ordering={};frame={}",
            self.nside, self.ordering, self.frame
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_resolution_rounds_finer() {
        // 10 arcsec: edge at nside 16384 is ~12.9", at 32768 it is ~6.4".
        let config =
            PixelIndexConfig::for_resolution(10.0, Ordering::Nested, Frame::Icrs).unwrap();
        assert_eq!(config.nside, 32768);
        assert!(config.pixel_edge_arcsec() <= 10.0);

        // Half of that edge still fits the same nside.
        let half = PixelIndexConfig::for_resolution(
            config.pixel_edge_arcsec(),
            Ordering::Nested,
            Frame::Icrs,
        )
        .unwrap();
        assert_eq!(half.nside, 32768);
    }

    #[test]
    fn test_for_resolution_coarse() {
        // Anything coarser than the base grid stays at nside 1.
        let config =
            PixelIndexConfig::for_resolution(300_000.0, Ordering::Ring, Frame::Icrs).unwrap();
        assert_eq!(config.nside, 1);
        assert_eq!(config.npix(), 12);
    }

    #[test]
    fn test_for_resolution_rejects_bad_input() {
        assert!(PixelIndexConfig::for_resolution(0.0, Ordering::Nested, Frame::Icrs).is_err());
        assert!(PixelIndexConfig::for_resolution(-1.0, Ordering::Nested, Frame::Icrs).is_err());
        assert!(
            PixelIndexConfig::for_resolution(f64::NAN, Ordering::Nested, Frame::Icrs).is_err()
        );
        // Finer than 2^29 can resolve.
        assert!(PixelIndexConfig::for_resolution(1e-6, Ordering::Nested, Frame::Icrs).is_err());
    }

    #[test]
    fn test_with_nside_validation() {
        assert!(PixelIndexConfig::with_nside(0, Ordering::Nested, Frame::Icrs).is_err());
        assert!(PixelIndexConfig::with_nside(12, Ordering::Nested, Frame::Icrs).is_err());
        let config = PixelIndexConfig::with_nside(256, Ordering::Nested, Frame::Icrs).unwrap();
        assert_eq!(config.order(), 8);
        assert_eq!(config.npix(), 786_432);
    }

    #[test]
    fn test_fingerprint_distinguishes_parameters() {
        let a = PixelIndexConfig::with_nside(256, Ordering::Nested, Frame::Icrs).unwrap();
        let b = PixelIndexConfig::with_nside(512, Ordering::Nested, Frame::Icrs).unwrap();
        let c = PixelIndexConfig::with_nside(256, Ordering::Ring, Frame::Icrs).unwrap();
        let d = PixelIndexConfig::with_nside(256, Ordering::Nested, Frame::Galactic).unwrap();

        assert_eq!(a.fingerprint(), "nside=256;ordering=nested;frame=icrs");
        assert_ne!(a.fingerprint(), b.fingerprint());
        assert_ne!(a.fingerprint(), c.fingerprint());
        assert_ne!(a.fingerprint(), d.fingerprint());
    }
}
