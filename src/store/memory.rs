//! In-process reference backend for [`DocumentStore`].
//!
//! Documents live in a `BTreeMap` behind an `RwLock`; reads take the shared
//! lock, writes the exclusive one. Geospatial queries compute great-circle
//! haversine distances in meters on a sphere of WGS84 semi-major radius,
//! which is how a production 2dsphere index interprets its max-distance
//! parameter. Because distance comes from spherical trigonometry rather
//! than longitude range arithmetic, the ±180 seam needs no special casing.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::RwLock;

use serde_json::Value;

use crate::constants::{DEG_TO_RAD, WGS84_SEMI_MAJOR_AXIS_M};
use crate::errors::{SearchError, SearchResult};
use crate::store::{field_value, Document, DocumentStore, FieldFilter, IndexKind};

#[derive(Default)]
struct Inner {
    documents: BTreeMap<String, Document>,
    indexes: HashSet<(String, IndexKind)>,
    metadata: HashMap<String, String>,
}

/// Thread-safe in-memory document collection.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered indexes; exposed so idempotence is observable.
    pub fn index_count(&self) -> usize {
        self.inner.read().expect("store lock poisoned").indexes.len()
    }

    fn read_geo_candidates(
        &self,
        field: &str,
        lon_deg: f64,
        lat_deg: f64,
        max_distance_m: f64,
        filter: Option<&FieldFilter>,
    ) -> SearchResult<Vec<(Document, f64)>> {
        let inner = self.inner.read().expect("store lock poisoned");
        if !inner
            .indexes
            .contains(&(field.to_string(), IndexKind::GeoSphere))
        {
            return Err(SearchError::index_missing(field, "2dsphere"));
        }

        let mut hits = Vec::new();
        for doc in inner.documents.values() {
            let Some((doc_lon, doc_lat)) = point_coordinates(doc, field) else {
                continue;
            };
            if let Some(f) = filter {
                if !f.matches(doc) {
                    continue;
                }
            }
            let distance = haversine_meters(lon_deg, lat_deg, doc_lon, doc_lat);
            if distance <= max_distance_m {
                hits.push((doc.clone(), distance));
            }
        }
        hits.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(hits)
    }
}

impl DocumentStore for MemoryStore {
    fn ensure_index(&self, field: &str, kind: IndexKind) -> SearchResult<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.indexes.insert((field.to_string(), kind));
        Ok(())
    }

    fn insert(&self, doc: Document) -> SearchResult<()> {
        let id = doc
            .get("_id")
            .and_then(|v| v.as_str())
            .ok_or_else(|| SearchError::store("insert", "document has no string '_id'"))?
            .to_string();
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.documents.insert(id, doc);
        Ok(())
    }

    fn find_by_geo_near(
        &self,
        field: &str,
        lon_deg: f64,
        lat_deg: f64,
        max_distance_m: f64,
        filter: Option<&FieldFilter>,
    ) -> SearchResult<Vec<Document>> {
        Ok(self
            .read_geo_candidates(field, lon_deg, lat_deg, max_distance_m, filter)?
            .into_iter()
            .map(|(doc, _)| doc)
            .collect())
    }

    fn find_by_geo_near_with_distance(
        &self,
        field: &str,
        lon_deg: f64,
        lat_deg: f64,
        max_distance_m: f64,
        filter: Option<&FieldFilter>,
    ) -> SearchResult<Vec<(Document, f64)>> {
        self.read_geo_candidates(field, lon_deg, lat_deg, max_distance_m, filter)
    }

    fn find_by_field_membership(
        &self,
        field: &str,
        values: &BTreeSet<i64>,
        filter: Option<&FieldFilter>,
    ) -> SearchResult<Vec<Document>> {
        let inner = self.inner.read().expect("store lock poisoned");
        let mut hits = Vec::new();
        for doc in inner.documents.values() {
            let Some(pixel) = field_value(doc, field).and_then(|v| v.as_i64()) else {
                continue;
            };
            if !values.contains(&pixel) {
                continue;
            }
            if let Some(f) = filter {
                if !f.matches(doc) {
                    continue;
                }
            }
            hits.push(doc.clone());
        }
        Ok(hits)
    }

    fn upsert_derived_field(&self, record_id: &str, field: &str, value: Value) -> SearchResult<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        let doc = inner.documents.get_mut(record_id).ok_or_else(|| {
            SearchError::store(
                "upsert_derived_field",
                format!("no document with id '{}'", record_id),
            )
        })?;
        let obj = doc
            .as_object_mut()
            .ok_or_else(|| SearchError::store("upsert_derived_field", "document is not an object"))?;
        obj.insert(field.to_string(), value);
        Ok(())
    }

    fn get_metadata(&self, key: &str) -> SearchResult<Option<String>> {
        let inner = self.inner.read().expect("store lock poisoned");
        Ok(inner.metadata.get(key).cloned())
    }

    fn put_metadata(&self, key: &str, value: &str) -> SearchResult<()> {
        let mut inner = self.inner.write().expect("store lock poisoned");
        inner.metadata.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn len(&self) -> usize {
        self.inner.read().expect("store lock poisoned").documents.len()
    }
}

/// Extracts `[lon, lat]` from a GeoJSON-style point field.
fn point_coordinates(doc: &Document, field: &str) -> Option<(f64, f64)> {
    let coords = field_value(doc, field)?.get("coordinates")?.as_array()?;
    let lon = coords.first()?.as_f64()?;
    let lat = coords.get(1)?.as_f64()?;
    Some((lon, lat))
}

/// Haversine great-circle distance in meters on the WGS84 semi-major sphere.
fn haversine_meters(lon1_deg: f64, lat1_deg: f64, lon2_deg: f64, lat2_deg: f64) -> f64 {
    let lat1 = lat1_deg * DEG_TO_RAD;
    let lat2 = lat2_deg * DEG_TO_RAD;
    let dlat = (lat2_deg - lat1_deg) * DEG_TO_RAD;
    let dlon = (lon2_deg - lon1_deg) * DEG_TO_RAD;

    let sin_dlat = libm::sin(dlat * 0.5);
    let sin_dlon = libm::sin(dlon * 0.5);
    let a = sin_dlat * sin_dlat + libm::cos(lat1) * libm::cos(lat2) * sin_dlon * sin_dlon;
    2.0 * libm::asin(libm::sqrt(a.min(1.0))) * WGS84_SEMI_MAJOR_AXIS_M
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, lon: f64, lat: f64) -> Document {
        json!({
            "_id": id,
            "designation": id,
            "loc": {"type": "Point", "coordinates": [lon, lat]},
        })
    }

    #[test]
    fn test_ensure_index_is_idempotent() {
        let store = MemoryStore::new();
        store.ensure_index("loc", IndexKind::GeoSphere).unwrap();
        store.ensure_index("loc", IndexKind::GeoSphere).unwrap();
        assert_eq!(store.index_count(), 1);

        store.ensure_index("healpix", IndexKind::Ascending).unwrap();
        assert_eq!(store.index_count(), 2);
    }

    #[test]
    fn test_geo_near_requires_index() {
        let store = MemoryStore::new();
        store.insert(doc("a", 0.0, 0.0)).unwrap();
        let err = store
            .find_by_geo_near("loc", 0.0, 0.0, 1000.0, None)
            .unwrap_err();
        assert!(matches!(err, SearchError::IndexMissing { .. }));
    }

    #[test]
    fn test_geo_near_distance_ordering() {
        let store = MemoryStore::new();
        store.ensure_index("loc", IndexKind::GeoSphere).unwrap();
        store.insert(doc("far", 1.0, 0.0)).unwrap();
        store.insert(doc("near", 0.1, 0.0)).unwrap();

        let hits = store
            .find_by_geo_near_with_distance("loc", 0.0, 0.0, 500_000.0, None)
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0["_id"], "near");
        assert!(hits[0].1 < hits[1].1);

        // One degree on the equator of the reference sphere.
        assert!((hits[1].1 - 111_319.5).abs() < 10.0, "distance {}", hits[1].1);
    }

    #[test]
    fn test_geo_near_handles_meridian_seam() {
        let store = MemoryStore::new();
        store.ensure_index("loc", IndexKind::GeoSphere).unwrap();
        store.insert(doc("west_of_seam", 179.95, 0.0)).unwrap();

        // Query from the other side of the ±180 seam; spherical distance
        // must see these as ~0.1° apart, not ~359.9°.
        let hits = store
            .find_by_geo_near("loc", -179.95, 0.0, 50_000.0, None)
            .unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_geo_near_respects_filter() {
        let store = MemoryStore::new();
        store.ensure_index("loc", IndexKind::GeoSphere).unwrap();
        store.insert(doc("a", 0.0, 0.0)).unwrap();
        store.insert(doc("b", 0.01, 0.0)).unwrap();

        let filter = FieldFilter::eq("designation", json!("b"));
        let hits = store
            .find_by_geo_near("loc", 0.0, 0.0, 10_000.0, Some(&filter))
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["_id"], "b");
    }

    #[test]
    fn test_membership_query() {
        let store = MemoryStore::new();
        store
            .insert(json!({"_id": "a", "healpix": 42_i64}))
            .unwrap();
        store
            .insert(json!({"_id": "b", "healpix": 43_i64}))
            .unwrap();
        store.insert(json!({"_id": "c"})).unwrap();

        let values: BTreeSet<i64> = [42, 99].into_iter().collect();
        let hits = store
            .find_by_field_membership("healpix", &values, None)
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0]["_id"], "a");
    }

    #[test]
    fn test_insert_replaces_by_id() {
        let store = MemoryStore::new();
        store.insert(json!({"_id": "a", "v": 1})).unwrap();
        store.insert(json!({"_id": "a", "v": 2})).unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_insert_requires_id() {
        let store = MemoryStore::new();
        assert!(store.insert(json!({"v": 1})).is_err());
    }

    #[test]
    fn test_upsert_derived_field() {
        let store = MemoryStore::new();
        store.insert(json!({"_id": "a"})).unwrap();
        store
            .upsert_derived_field("a", "healpix", json!(7_i64))
            .unwrap();

        let values: BTreeSet<i64> = [7].into_iter().collect();
        let hits = store
            .find_by_field_membership("healpix", &values, None)
            .unwrap();
        assert_eq!(hits.len(), 1);

        assert!(store
            .upsert_derived_field("missing", "healpix", json!(7_i64))
            .is_err());
    }

    #[test]
    fn test_metadata_round_trip() {
        let store = MemoryStore::new();
        assert_eq!(store.get_metadata("k").unwrap(), None);
        store.put_metadata("k", "v1").unwrap();
        store.put_metadata("k", "v2").unwrap();
        assert_eq!(store.get_metadata("k").unwrap(), Some("v2".to_string()));
    }
}
