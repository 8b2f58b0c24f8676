//! Geometry-index adapter: cone searches through a 2dsphere store index.
//!
//! The store's spherical index thinks in terrestrial terms — GeoJSON points
//! in longitude/latitude and max distances in meters on the WGS84 body.
//! This adapter does the unit bookkeeping both ways: angular radius in,
//! scaled through [`meters_per_degree`] at the search center's declination;
//! linear distances out, divided by the same factor. The degrees it returns
//! are therefore internally consistent with the query but only approximate
//! great-circle separations (see [`crate::ellipsoid`] for the boundary).

use serde_json::json;

use crate::coords::Coordinate;
use crate::ellipsoid::meters_per_degree;
use crate::errors::SearchResult;
use crate::record::CatalogRecord;
use crate::search::SearchRequest;
use crate::store::{DocumentStore, IndexKind};

/// Default document field holding the derived point geometry.
pub const DEFAULT_GEO_FIELD: &str = "loc";

/// Cone-search adapter over a store's spherical geometry index.
pub struct GeoIndex<'a> {
    store: &'a dyn DocumentStore,
    field: String,
}

impl<'a> GeoIndex<'a> {
    pub fn new(store: &'a dyn DocumentStore) -> Self {
        Self::with_field(store, DEFAULT_GEO_FIELD)
    }

    pub fn with_field(store: &'a dyn DocumentStore, field: &str) -> Self {
        Self {
            store,
            field: field.to_string(),
        }
    }

    /// Idempotently creates the backing 2dsphere index.
    pub fn build_index(&self) -> SearchResult<()> {
        self.store.ensure_index(&self.field, IndexKind::GeoSphere)
    }

    /// Rewrites the derived point field from the record's coordinate.
    ///
    /// Must run whenever the source coordinate changes; the point is a
    /// cache entry, not independent data.
    pub fn write_point(&self, record: &CatalogRecord) -> SearchResult<()> {
        self.store.upsert_derived_field(
            &record.record_id(),
            &self.field,
            point_geometry(&record.coord),
        )
    }

    /// Records within the request radius of its center, nearest first.
    pub fn cone_point(&self, request: &SearchRequest) -> SearchResult<Vec<CatalogRecord>> {
        request.validate_radius()?;
        let (lon, lat) = request.center.to_lon_lat();
        let max_distance_m = request.radius_deg * meters_per_degree(request.center.dec_deg());
        let docs = self.store.find_by_geo_near(
            &self.field,
            lon,
            lat,
            max_distance_m,
            request.filter.as_ref(),
        )?;
        docs.iter().map(CatalogRecord::from_document).collect()
    }

    /// Like [`cone_point`](Self::cone_point), each record annotated with
    /// its distance converted back to degrees.
    ///
    /// The conversion divides by the same center-latitude scale used to
    /// build the query, so radius-in and distance-out agree with each
    /// other even where both deviate from the exact separation.
    pub fn cone_aggregate(
        &self,
        request: &SearchRequest,
    ) -> SearchResult<Vec<(CatalogRecord, f64)>> {
        request.validate_radius()?;
        let (lon, lat) = request.center.to_lon_lat();
        let scale = meters_per_degree(request.center.dec_deg());
        let max_distance_m = request.radius_deg * scale;
        let hits = self.store.find_by_geo_near_with_distance(
            &self.field,
            lon,
            lat,
            max_distance_m,
            request.filter.as_ref(),
        )?;
        hits.iter()
            .map(|(doc, meters)| Ok((CatalogRecord::from_document(doc)?, meters / scale)))
            .collect()
    }
}

/// GeoJSON point for a coordinate, in the store's lon/lat convention.
pub(crate) fn point_geometry(coord: &Coordinate) -> serde_json::Value {
    let (lon, lat) = coord.to_lon_lat();
    json!({"type": "Point", "coordinates": [lon, lat]})
}
