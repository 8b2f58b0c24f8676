//! Numeric constants shared across the crate.

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const PI: f64 = 3.141592653589793238462643;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const HALF_PI: f64 = 1.5707963267948966192313216;

#[allow(clippy::excessive_precision)]
#[allow(clippy::approx_constant)]
pub const TWOPI: f64 = 6.283185307179586476925287;

#[allow(clippy::excessive_precision)]
pub const DEG_TO_RAD: f64 = 1.745329251994329576923691e-2;

#[allow(clippy::excessive_precision)]
pub const RAD_TO_DEG: f64 = 57.29577951308232087679815;

pub const ARCSEC_PER_DEGREE: f64 = 3600.0;

/// WGS84 semi-major axis in meters.
pub const WGS84_SEMI_MAJOR_AXIS_M: f64 = 6_378_137.0;

/// WGS84 first eccentricity squared: e² = (a² - b²) / a².
pub const WGS84_ECCENTRICITY_SQUARED: f64 = 6.6943799901413165e-3;

/// Square root of the mean HEALPix pixel area at nside = 1, in degrees.
///
/// The sphere covers 4π·(180/π)² ≈ 41252.96 deg²; divided over the 12 base
/// pixels and square-rooted this gives the characteristic pixel edge scale.
/// The edge at a given nside is this value divided by nside.
pub const HEALPIX_PIXEL_SCALE_DEG: f64 = 58.6323;
