//! Cone-to-pixel enumeration.
//!
//! [`cone_pixels`] lists every pixel whose footprint may intersect a disc
//! on the sky. The set is conservative: it can include pixels that only
//! graze the cone, but it never misses one that overlaps, so callers can
//! filter candidates by exact separation afterwards without losing matches.
//!
//! The enumeration samples a half-pixel-pitch grid over the disc's bounding
//! declination band, widening the RA span as the meridians converge and
//! falling back to full RA coverage within a degree of the poles. Sample
//! points are reduced modulo 360° so a disc straddling the 0/360 seam
//! collects pixels from both sides.

use std::collections::BTreeSet;

use crate::constants::DEG_TO_RAD;
use crate::coords::Coordinate;
use crate::errors::{SearchError, SearchResult};
use crate::healpix::config::PixelIndexConfig;
use crate::healpix::pixel::coordinate_to_pixel;

/// Enumerates pixel ids intersecting the disc of `radius_deg` around
/// `center`.
///
/// Always contains the center's own pixel. The result size grows roughly
/// with (radius / pixel edge)²; the search facade caps the radius before
/// calling this.
///
/// # Errors
/// [`InvalidRadius`](SearchError::InvalidRadius) for a non-positive or
/// non-finite radius.
pub fn cone_pixels(
    center: &Coordinate,
    radius_deg: f64,
    config: &PixelIndexConfig,
) -> SearchResult<BTreeSet<u64>> {
    if !radius_deg.is_finite() || radius_deg <= 0.0 {
        return Err(SearchError::invalid_radius(
            radius_deg,
            "cone radius must be positive",
        ));
    }

    let pixel_edge_deg = config.pixel_edge_deg();
    let step = pixel_edge_deg * 0.5;

    let mut pixels = BTreeSet::new();
    pixels.insert(coordinate_to_pixel(center, config));

    let ra_center = center.ra_deg();
    let dec_center = center.dec_deg();

    // Pad by one pixel so footprints straddling the rim are kept.
    let dec_min = (dec_center - radius_deg - pixel_edge_deg).max(-90.0);
    let dec_max = (dec_center + radius_deg + pixel_edge_deg).min(90.0);

    let mut dec = dec_min;
    while dec <= dec_max {
        let cos_dec = libm::cos(dec * DEG_TO_RAD).max(0.01);
        let ra_step = step / cos_dec;

        // Within a degree of a pole every RA passes through the disc's
        // bounding band, so sweep the full circle there.
        let ra_span = if libm::fabs(dec) > 89.0 {
            360.0
        } else {
            (radius_deg / cos_dec).min(180.0) * 2.0
        };

        let ra_min = ra_center - ra_span / 2.0;
        let ra_max = ra_center + ra_span / 2.0;

        let mut ra = ra_min;
        while ra <= ra_max {
            let ra_norm = ((ra % 360.0) + 360.0) % 360.0;
            let sample = Coordinate::new(ra_norm, dec)?;
            // Keep a sample if its pixel could still reach into the cone.
            if center.angular_separation(&sample) <= radius_deg + pixel_edge_deg {
                pixels.insert(coordinate_to_pixel(&sample, config));
            }
            ra += ra_step;
        }

        dec += step;
    }

    Ok(pixels)
}
