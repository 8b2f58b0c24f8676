//! Typed catalog records and their document-store representation.
//!
//! The store itself speaks loosely-typed JSON documents; this module is the
//! validation boundary. [`CatalogRecord`] is the typed schema, converted to
//! and from the store's [`Document`](crate::store::Document) form here and
//! nowhere else. Range checks happen on the way in ([`CatalogRecord::from_document`]),
//! so the query core can trust every record it touches.
//!
//! Derived fields (`loc` point geometry, `healpix` pixel id) are cache
//! entries computed from the source coordinate at index time. They are
//! written through [`upsert_derived_field`](crate::store::DocumentStore::upsert_derived_field)
//! whenever the coordinate changes and never appear in the typed schema.

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::coords::Coordinate;
use crate::errors::{SearchError, SearchResult};
use crate::store::Document;

/// A single photometric measurement in one band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Photometry {
    /// Band designation, e.g. "J", "H", "Ks".
    pub band: String,
    /// Apparent magnitude in that band.
    pub magnitude: f64,
    /// One-sigma magnitude uncertainty, when the catalog provides it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uncertainty: Option<f64>,
}

/// A catalog entry: designation, sky position, and per-band photometry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogRecord {
    /// Immutable survey designation, e.g. "2MASS J14482563+1031590".
    pub designation: String,
    /// Sky position in the catalog frame.
    pub coord: Coordinate,
    /// Photometry, one entry per measured band.
    #[serde(default)]
    pub photometry: Vec<Photometry>,
}

impl CatalogRecord {
    pub fn new(designation: impl Into<String>, coord: Coordinate) -> Self {
        Self {
            designation: designation.into(),
            coord,
            photometry: Vec::new(),
        }
    }

    /// Adds a photometry entry, builder style.
    pub fn with_photometry(mut self, band: &str, magnitude: f64, uncertainty: Option<f64>) -> Self {
        self.photometry.push(Photometry {
            band: band.to_string(),
            magnitude,
            uncertainty,
        });
        self
    }

    /// Store identity, derived solely from the immutable designation.
    ///
    /// No counter, timestamp, or mutable field contributes, so re-ingesting
    /// the same catalog entry upserts rather than duplicates.
    pub fn record_id(&self) -> String {
        self.designation.clone()
    }

    /// Converts to the store's document form.
    ///
    /// RA and Dec are flattened to top-level scalars so field filters can
    /// address them directly. Derived index fields are *not* written here;
    /// they belong to index maintenance.
    pub fn to_document(&self) -> Document {
        json!({
            "_id": self.record_id(),
            "designation": self.designation,
            "ra": self.coord.ra_deg(),
            "dec": self.coord.dec_deg(),
            "photometry": self.photometry,
        })
    }

    /// Reconstructs a typed record from a stored document.
    ///
    /// # Errors
    /// Fails with [`SearchError::Store`] on missing or mistyped fields and
    /// [`SearchError::InvalidCoordinate`] on out-of-range positions.
    pub fn from_document(doc: &Document) -> SearchResult<Self> {
        let designation = doc
            .get("designation")
            .or_else(|| doc.get("_id"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| SearchError::store("from_document", "missing designation"))?
            .to_string();

        let ra = scalar_f64(doc, "ra")?;
        let dec = scalar_f64(doc, "dec")?;
        let coord = Coordinate::new(ra, dec)?;

        let photometry = match doc.get("photometry") {
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| SearchError::store("from_document", e.to_string()))?,
            None => Vec::new(),
        };

        Ok(Self {
            designation,
            coord,
            photometry,
        })
    }
}

fn scalar_f64(doc: &Document, field: &str) -> SearchResult<f64> {
    doc.get(field)
        .and_then(|v| v.as_f64())
        .ok_or_else(|| SearchError::store("from_document", format!("missing numeric '{}'", field)))
}
