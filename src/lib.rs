//! Sky-position cone searches over a document-store catalog.
//!
//! Stores astronomical catalog records (positions plus photometry) in a
//! document collection and answers cone searches — all records within an
//! angular radius of a sky position — through either of two indexing
//! strategies:
//!
//! 1. **Ellipsoid strategy** — the store's native 2dsphere geometry index,
//!    with the angular radius translated to linear meters through the WGS84
//!    meridian-arc scale at the search center's latitude.
//! 2. **Pixel strategy** — a HEALPix equal-area pixelization: each record
//!    carries an integer pixel id, a cone becomes a set-membership query
//!    over the pixels it intersects, and candidates are re-ranked by exact
//!    great-circle separation.
//!
//! # Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`coords`] | [`Coordinate`], lon/lat conversion, exact angular separation |
//! | [`ellipsoid`] | WGS84 meters-per-degree scale factor |
//! | [`record`] | Typed [`CatalogRecord`] schema and document conversion |
//! | [`store`] | [`DocumentStore`] abstraction and the in-memory backend |
//! | [`healpix`] | Pixelization config, pixel math, cone enumeration |
//! | [`geo`] | [`GeoIndex`](geo::GeoIndex) adapter over the 2dsphere index |
//! | [`search`] | [`ConeSearcher`] facade, [`SearchRequest`], [`Strategy`] |
//!
//! # Quick Start
//!
//! ```
//! use skyvault::healpix::{Frame, Ordering, PixelIndexConfig};
//! use skyvault::store::MemoryStore;
//! use skyvault::{CatalogRecord, ConeSearcher, Coordinate, SearchRequest, Strategy};
//!
//! # fn main() -> Result<(), skyvault::SearchError> {
//! let store = MemoryStore::new();
//! let config = PixelIndexConfig::for_resolution(10.0, Ordering::Nested, Frame::Icrs)?;
//! let searcher = ConeSearcher::new(&store, config);
//!
//! searcher.index_records(&[CatalogRecord::new(
//!     "2MASS J12073336-3932540",
//!     Coordinate::new(181.889, -39.548)?,
//! )])?;
//!
//! let request = SearchRequest::new(Coordinate::new(181.9, -39.5)?, 180.0 / 3600.0);
//! let matches = searcher.search(&request, Strategy::PixelIndex)?;
//! assert_eq!(matches.len(), 1);
//! # Ok(())
//! # }
//! ```
//!
//! # Consistency caveats
//!
//! Derived index fields (point geometry, pixel id) are caches rebuilt from
//! the source coordinate; queries running mid-rebuild may see a stale
//! index, which the core tolerates. Indexing and querying must share one
//! [`PixelIndexConfig`](healpix::PixelIndexConfig) — a mismatch is detected
//! via a stored fingerprint and fails loudly instead of matching nothing.

pub mod constants;
pub mod coords;
pub mod ellipsoid;
pub mod errors;
pub mod geo;
pub mod healpix;
pub mod record;
pub mod search;
pub mod store;

pub use coords::Coordinate;
pub use errors::{SearchError, SearchResult};
pub use record::{CatalogRecord, Photometry};
pub use search::{ConeSearcher, SearchMatch, SearchRequest, Strategy};
pub use store::{DocumentStore, FieldFilter, FilterOp, IndexKind, MemoryStore};
