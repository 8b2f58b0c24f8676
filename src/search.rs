//! Cone search facade.
//!
//! [`ConeSearcher`] is the single entry point hiding the strategy choice:
//! the same [`SearchRequest`] runs against either the store's ellipsoid-
//! corrected 2dsphere index or the HEALPix pixel buckets. It is stateless
//! request/response — the only configuration it carries is the immutable
//! pixel config and the radius cap, and concurrent callers can share one
//! instance freely.
//!
//! The pixel strategy guards against the classic footgun of bucketed
//! spatial indexes: querying with a different pixelization than the one
//! the data was indexed with silently matches nothing. The indexing
//! config's fingerprint is stored as collection metadata by
//! [`index_records`](ConeSearcher::index_records) and checked on every
//! pixel-strategy search.

use serde_json::json;

use crate::coords::Coordinate;
use crate::errors::{SearchError, SearchResult};
use crate::geo::GeoIndex;
use crate::healpix::{cone_pixels, coordinate_to_pixel, PixelIndexConfig};
use crate::record::CatalogRecord;
use crate::store::{DocumentStore, FieldFilter, IndexKind};

/// Document field holding the derived pixel id.
pub const PIXEL_FIELD: &str = "healpix";
/// Metadata key under which the indexing config fingerprint is stored.
pub const CONFIG_METADATA_KEY: &str = "healpix_config";
/// Default pixel-strategy radius cap, in degrees.
pub const DEFAULT_MAX_RADIUS_DEG: f64 = 0.5;

/// Which index answers the cone search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// 2dsphere geometry index with the WGS84 meters-per-degree correction.
    EllipsoidIndex,
    /// HEALPix pixel buckets with set-membership lookup and exact re-ranking.
    PixelIndex,
}

/// Parameters for one cone search.
#[derive(Debug, Clone)]
pub struct SearchRequest {
    /// Cone center.
    pub center: Coordinate,
    /// Search radius, in degrees.
    pub radius_deg: f64,
    /// If set, drop records not matching this predicate.
    pub filter: Option<FieldFilter>,
    /// If set, return at most this many results (closest first).
    pub limit: Option<usize>,
}

impl SearchRequest {
    pub fn new(center: Coordinate, radius_deg: f64) -> Self {
        Self {
            center,
            radius_deg,
            filter: None,
            limit: None,
        }
    }

    pub(crate) fn validate_radius(&self) -> SearchResult<()> {
        if !self.radius_deg.is_finite() || self.radius_deg <= 0.0 {
            return Err(SearchError::invalid_radius(
                self.radius_deg,
                "search radius must be positive",
            ));
        }
        Ok(())
    }
}

/// A record returned from a cone search.
#[derive(Debug, Clone)]
pub struct SearchMatch {
    pub record: CatalogRecord,
    /// Distance from the search center, in degrees.
    ///
    /// Exact great-circle separation for the pixel strategy; for the
    /// ellipsoid strategy it is the index's linear distance mapped back
    /// through the center-latitude scale, consistent with the query radius
    /// but not exact.
    pub separation_deg: f64,
}

/// Strategy-agnostic cone search over one indexed dataset.
pub struct ConeSearcher<'a> {
    store: &'a dyn DocumentStore,
    config: PixelIndexConfig,
    max_radius_deg: f64,
}

impl<'a> ConeSearcher<'a> {
    /// Creates a searcher with the default pixel-strategy radius cap.
    pub fn new(store: &'a dyn DocumentStore, config: PixelIndexConfig) -> Self {
        Self {
            store,
            config,
            max_radius_deg: DEFAULT_MAX_RADIUS_DEG,
        }
    }

    /// Overrides the pixel-strategy radius cap, in degrees.
    pub fn with_max_radius(mut self, max_radius_deg: f64) -> Self {
        self.max_radius_deg = max_radius_deg;
        self
    }

    pub fn pixel_config(&self) -> &PixelIndexConfig {
        &self.config
    }

    /// Ingests records and builds both indexes.
    ///
    /// Inserts each document, writes its derived point geometry and pixel
    /// id, creates the store indexes, and records the pixel config
    /// fingerprint in collection metadata. Re-running with the same
    /// records is an upsert, not a duplication.
    pub fn index_records(&self, records: &[CatalogRecord]) -> SearchResult<()> {
        let geo = GeoIndex::new(self.store);
        geo.build_index()?;
        self.store.ensure_index(PIXEL_FIELD, IndexKind::Ascending)?;

        for record in records {
            self.store.insert(record.to_document())?;
            geo.write_point(record)?;
            let pixel = coordinate_to_pixel(&record.coord, &self.config);
            self.store.upsert_derived_field(
                &record.record_id(),
                PIXEL_FIELD,
                json!(pixel as i64),
            )?;
        }

        self.store
            .put_metadata(CONFIG_METADATA_KEY, &self.config.fingerprint())
    }

    /// Runs a cone search with the chosen strategy.
    ///
    /// Results are sorted by increasing separation. Either a complete
    /// result set is returned or the call fails; there is no partial
    /// success.
    pub fn search(
        &self,
        request: &SearchRequest,
        strategy: Strategy,
    ) -> SearchResult<Vec<SearchMatch>> {
        request.validate_radius()?;
        match strategy {
            Strategy::EllipsoidIndex => self.search_ellipsoid(request),
            Strategy::PixelIndex => self.search_pixels(request),
        }
    }

    fn search_ellipsoid(&self, request: &SearchRequest) -> SearchResult<Vec<SearchMatch>> {
        let geo = GeoIndex::new(self.store);
        let mut matches: Vec<SearchMatch> = geo
            .cone_aggregate(request)?
            .into_iter()
            .map(|(record, separation_deg)| SearchMatch {
                record,
                separation_deg,
            })
            .collect();
        if let Some(limit) = request.limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }

    fn search_pixels(&self, request: &SearchRequest) -> SearchResult<Vec<SearchMatch>> {
        if request.radius_deg > self.max_radius_deg {
            return Err(SearchError::RadiusTooLarge {
                radius_deg: request.radius_deg,
                max_radius_deg: self.max_radius_deg,
            });
        }
        self.check_config_fingerprint()?;

        let pixels = cone_pixels(&request.center, request.radius_deg, &self.config)?;
        let values = pixels.into_iter().map(|p| p as i64).collect();
        let docs =
            self.store
                .find_by_field_membership(PIXEL_FIELD, &values, request.filter.as_ref())?;

        // Pixel candidates are a conservative superset and carry no order;
        // re-rank by exact separation and drop the overshoot.
        let mut matches = Vec::new();
        for doc in &docs {
            let record = CatalogRecord::from_document(doc)?;
            let separation_deg = request.center.angular_separation(&record.coord);
            if separation_deg <= request.radius_deg {
                matches.push(SearchMatch {
                    record,
                    separation_deg,
                });
            }
        }
        matches.sort_by(|a, b| {
            a.separation_deg
                .partial_cmp(&b.separation_deg)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        if let Some(limit) = request.limit {
            matches.truncate(limit);
        }
        Ok(matches)
    }

    fn check_config_fingerprint(&self) -> SearchResult<()> {
        let stored = self.store.get_metadata(CONFIG_METADATA_KEY)?;
        match stored {
            None => Err(SearchError::index_missing(PIXEL_FIELD, "pixel")),
            Some(fingerprint) if fingerprint != self.config.fingerprint() => Err(
                SearchError::config_mismatch(&fingerprint, &self.config.fingerprint()),
            ),
            Some(_) => Ok(()),
        }
    }
}
