//! Hierarchical equal-area pixelization of the sphere.
//!
//! Three submodules cover the pixel-index surface:
//!
//! - [`config`] — [`PixelIndexConfig`], nside derivation from a requested
//!   resolution, and the config fingerprint used for mismatch detection
//! - [`pixel`] — coordinate/pixel conversion in both numbering conventions
//! - [`disc`] — enumeration of the pixels intersecting a cone

pub mod config;
pub mod disc;
pub mod pixel;

pub use config::{Frame, Ordering, PixelIndexConfig};
pub use disc::cone_pixels;
pub use pixel::{coordinate_to_pixel, pixel_to_coordinate};
