//! Coordinate-to-pixel and pixel-to-coordinate conversion.
//!
//! Implements the Gorski et al. (2005) equal-area pixelization for both the
//! nested and ring numbering conventions. [`coordinate_to_pixel`] is total
//! and deliberately non-injective: any two points closer together than the
//! pixel edge may share an id, and only exact re-ranking can tell them
//! apart. [`pixel_to_coordinate`] returns the pixel *center*, so a round
//! trip moves a point by at most the pixel edge length.
//!
//! Internally everything works in (phi, z) where phi is the azimuth in
//! radians and z the sine of the declination.

use crate::constants::{DEG_TO_RAD, HALF_PI, PI, RAD_TO_DEG, TWOPI};
use crate::coords::Coordinate;
use crate::errors::{SearchError, SearchResult};
use crate::healpix::config::{Ordering, PixelIndexConfig};

/// Northernmost ring crossed by each base face, in units of nside.
const JRLL: [i64; 12] = [2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4];
/// Azimuth offset of each base face, in units of π/4.
const JPLL: [i64; 12] = [1, 3, 5, 7, 0, 2, 4, 6, 1, 3, 5, 7];

/// Maps a coordinate to its pixel id under `config`.
pub fn coordinate_to_pixel(coord: &Coordinate, config: &PixelIndexConfig) -> u64 {
    let phi = coord.ra_deg() * DEG_TO_RAD;
    let z = libm::sin(coord.dec_deg() * DEG_TO_RAD);
    match config.ordering {
        Ordering::Nested => ang2pix_nest(config.order(), phi, z),
        Ordering::Ring => ang2pix_ring(config.nside as u64, phi, z),
    }
}

/// Returns the center coordinate of `pixel` under `config`.
///
/// Not a left-inverse of [`coordinate_to_pixel`]; see the module docs.
///
/// # Errors
/// [`InvalidConfig`](SearchError::InvalidConfig) if `pixel` is outside
/// [0, 12·nside²).
pub fn pixel_to_coordinate(pixel: u64, config: &PixelIndexConfig) -> SearchResult<Coordinate> {
    if pixel >= config.npix() {
        return Err(SearchError::invalid_config(format!(
            "pixel id {} out of range for npix {}",
            pixel,
            config.npix()
        )));
    }
    let (phi, z) = match config.ordering {
        Ordering::Nested => pix2ang_nest(config.order(), pixel),
        Ordering::Ring => pix2ang_ring(config.nside as u64, pixel),
    };
    let ra_deg = phi * RAD_TO_DEG;
    let dec_deg = libm::asin(z.clamp(-1.0, 1.0)) * RAD_TO_DEG;
    Coordinate::new(ra_deg, dec_deg)
}

/// Nested-scheme pixel index for (phi, z).
pub(crate) fn ang2pix_nest(order: u32, phi: f64, z: f64) -> u64 {
    let nside = 1u64 << order;
    let (face, ix, iy) = base_face_and_xy(phi, z, nside);
    face as u64 * nside * nside + interleave_xy(ix, iy, order)
}

/// Ring-scheme pixel index for (phi, z).
pub(crate) fn ang2pix_ring(nside: u64, phi: f64, z: f64) -> u64 {
    let tt = phi_to_tt(phi);
    let z_abs = libm::fabs(z);
    let nside_i = nside as i64;

    if z_abs <= 2.0 / 3.0 {
        // Equatorial belt: rings of constant length 4·nside.
        let temp1 = nside as f64 * (0.5 + tt);
        let temp2 = nside as f64 * z * 0.75;
        let jp = (temp1 - temp2) as i64;
        let jm = (temp1 + temp2) as i64;

        let ir = nside_i + 1 + jp - jm;
        let kshift = 1 - (ir & 1);

        let mut ip = (jp + jm - nside_i + kshift + 1) >> 1;
        if ip >= 4 * nside_i {
            ip -= 4 * nside_i;
        }

        (2 * nside * (nside - 1)) + ((ir - 1) as u64) * 4 * nside + ip as u64
    } else {
        // Polar caps: ring r counted from the nearer pole has length 4r.
        let tp = tt - libm::floor(tt);
        let tmp = nside as f64 * libm::sqrt(3.0 * (1.0 - z_abs));
        let jp = (tp * tmp) as i64;
        let jm = ((1.0 - tp) * tmp) as i64;

        let ir = jp + jm + 1;
        let mut ip = (tt * ir as f64) as i64;
        if ip >= 4 * ir {
            ip -= 4 * ir;
        }

        if z > 0.0 {
            (2 * ir * (ir - 1) + ip) as u64
        } else {
            12 * nside * nside - (2 * ir * (ir + 1)) as u64 + ip as u64
        }
    }
}

/// Center (phi, z) of a nested-scheme pixel.
pub(crate) fn pix2ang_nest(order: u32, pixel: u64) -> (f64, f64) {
    let nside = 1u64 << order;
    let npface = nside * nside;
    let face = (pixel / npface) as usize;
    let (ix, iy) = deinterleave_xy(pixel % npface, order);

    let nside_i = nside as i64;
    let jrt = (ix + iy) as i64;
    let jpt = ix as i64 - iy as i64;
    let jr = JRLL[face] * nside_i - jrt - 1;

    let (nr, z, kshift) = ring_geometry(nside_i, jr);

    let mut jp = (JPLL[face] * nr + jpt + 1 + kshift) / 2;
    if jp > 4 * nside_i {
        jp -= 4 * nside_i;
    }
    if jp < 1 {
        jp += 4 * nside_i;
    }

    let phi = (jp as f64 - (kshift as f64 + 1.0) * 0.5) * HALF_PI / nr as f64;
    (phi, z)
}

/// Center (phi, z) of a ring-scheme pixel.
pub(crate) fn pix2ang_ring(nside: u64, pixel: u64) -> (f64, f64) {
    let npix = 12 * nside * nside;
    let ncap = 2 * nside * (nside - 1);
    let fact2 = 1.0 / (3.0 * (nside * nside) as f64);

    if pixel < ncap {
        // North polar cap.
        let iring = (1 + isqrt(1 + 2 * pixel)) >> 1;
        let iphi = (pixel + 1) - 2 * iring * (iring - 1);
        let z = 1.0 - (iring * iring) as f64 * fact2;
        let phi = (iphi as f64 - 0.5) * PI / (2.0 * iring as f64);
        (phi, z)
    } else if pixel < npix - ncap {
        // Equatorial belt.
        let ip = pixel - ncap;
        let iring = ip / (4 * nside) + nside;
        let iphi = ip % (4 * nside) + 1;
        let fodd = 0.5 * (1 + ((iring + nside) & 1)) as f64;
        let z = (2 * nside) as f64 * fact2 * (2.0 * nside as f64 - iring as f64);
        let phi = (iphi as f64 - fodd) * PI / (2.0 * nside as f64);
        (phi, z)
    } else {
        // South polar cap.
        let ip = npix - pixel;
        let iring = (1 + isqrt(2 * ip - 1)) >> 1;
        let iphi = 4 * iring + 1 - (ip - 2 * iring * (iring - 1));
        let z = (iring * iring) as f64 * fact2 - 1.0;
        let phi = (iphi as f64 - 0.5) * PI / (2.0 * iring as f64);
        (phi, z)
    }
}

/// Determines the base face containing (phi, z) and the (ix, iy) position
/// within it.
fn base_face_and_xy(phi: f64, z: f64, nside: u64) -> (u32, u64, u64) {
    let tt = phi_to_tt(phi);
    if libm::fabs(z) <= 2.0 / 3.0 {
        equatorial_face_xy(tt, z, nside)
    } else {
        polar_face_xy(tt, z, nside)
    }
}

/// Folds phi into the [0, 4) quadrant coordinate.
fn phi_to_tt(phi: f64) -> f64 {
    let phi_norm = if phi < 0.0 { phi + TWOPI } else { phi };
    phi_norm * 2.0 / PI
}

/// Face and position for the equatorial belt (|z| <= 2/3).
fn equatorial_face_xy(tt: f64, z: f64, nside: u64) -> (u32, u64, u64) {
    let temp1 = nside as f64 * (0.5 + tt);
    let temp2 = nside as f64 * z * 0.75;
    // Indexes along the two face diagonals; the quotient picks the face,
    // the remainder the position within it.
    let jp = (temp1 - temp2) as i64;
    let jm = (temp1 + temp2) as i64;
    let nside_i = nside as i64;
    let ifp = jp / nside_i;
    let ifm = jm / nside_i;
    let face = if ifp == ifm {
        ((ifp & 3) + 4) as u32
    } else if ifp < ifm {
        (ifp & 3) as u32
    } else {
        ((ifm & 3) + 8) as u32
    };
    let ix = jm & (nside_i - 1);
    let iy = nside_i - (jp & (nside_i - 1)) - 1;
    (face, ix as u64, iy as u64)
}

/// Face and position for the polar caps (|z| > 2/3).
fn polar_face_xy(tt: f64, z: f64, nside: u64) -> (u32, u64, u64) {
    let z_abs = libm::fabs(z);
    let tp = tt - libm::floor(tt);
    let tmp = nside as f64 * libm::sqrt(3.0 * (1.0 - z_abs));
    let jp = ((tp * tmp) as i64).min(nside as i64 - 1);
    let jm = (((1.0 - tp) * tmp) as i64).min(nside as i64 - 1);
    let ntt = libm::floor(tt) as u32;
    let face_offset = if z > 0.0 { 0 } else { 8 };
    let face = (ntt % 4) + face_offset;
    let (ix, iy) = if z > 0.0 {
        (nside as i64 - jm - 1, nside as i64 - jp - 1)
    } else {
        (jp, jm)
    };
    (face, ix as u64, iy as u64)
}

/// Ring number, z, and phase shift for nested ring index `jr`.
fn ring_geometry(nside: i64, jr: i64) -> (i64, f64, i64) {
    let npface = (nside * nside) as f64;
    if jr < nside {
        let nr = jr;
        let tmp = (nr * nr) as f64 / (3.0 * npface);
        (nr, 1.0 - tmp, 0)
    } else if jr > 3 * nside {
        let nr = 4 * nside - jr;
        let tmp = (nr * nr) as f64 / (3.0 * npface);
        (nr, tmp - 1.0, 0)
    } else {
        let z = (2 * nside - jr) as f64 * 2.0 / (3.0 * nside as f64);
        (nside, z, (jr - nside) & 1)
    }
}

/// Z-order interleave of (ix, iy) into a within-face pixel index.
fn interleave_xy(ix: u64, iy: u64, order: u32) -> u64 {
    let mut result: u64 = 0;
    for i in 0..order {
        let bit_x = (ix >> i) & 1;
        let bit_y = (iy >> i) & 1;
        result |= (bit_x << (2 * i)) | (bit_y << (2 * i + 1));
    }
    result
}

fn deinterleave_xy(pix_in_face: u64, order: u32) -> (u64, u64) {
    let mut ix: u64 = 0;
    let mut iy: u64 = 0;
    for i in 0..order {
        ix |= ((pix_in_face >> (2 * i)) & 1) << i;
        iy |= ((pix_in_face >> (2 * i + 1)) & 1) << i;
    }
    (ix, iy)
}

/// Integer square root with correction for f64 rounding near squares.
fn isqrt(v: u64) -> u64 {
    let r = libm::sqrt(v as f64) as u64;
    if r > 0 && r * r > v {
        r - 1
    } else if (r + 1) * (r + 1) <= v {
        r + 1
    } else {
        r
    }
}
