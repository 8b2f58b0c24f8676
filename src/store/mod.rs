//! Document store abstraction.
//!
//! The query core's only external dependency is a document collection that
//! can create indexes, answer geospatial near-queries in linear units,
//! answer set-membership queries over a scalar field, and upsert derived
//! fields atomically by record id. [`DocumentStore`] captures exactly that
//! surface; any backend exposing equivalent primitives can sit behind it.
//!
//! [`MemoryStore`](memory::MemoryStore) is the in-process reference backend
//! used by the tests and the CLI. Every component takes its store as an
//! explicit `&dyn DocumentStore` argument — there is no ambient connection
//! state anywhere in the crate.

pub mod memory;

use std::collections::BTreeSet;
use std::fmt;

use serde_json::Value;

use crate::errors::SearchResult;

pub use memory::MemoryStore;

/// The store's native record representation: a JSON object with an `_id`.
pub type Document = Value;

/// Index kinds the query core relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IndexKind {
    /// Spherical geometry index over a GeoJSON point field; near-queries
    /// take a max distance in meters on the reference body.
    GeoSphere,
    /// Ascending scalar index, used for pixel-id membership lookups.
    Ascending,
}

impl fmt::Display for IndexKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexKind::GeoSphere => write!(f, "2dsphere"),
            IndexKind::Ascending => write!(f, "ascending"),
        }
    }
}

/// Comparison operator for a [`FieldFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Ne,
    Lt,
    Lte,
    Gt,
    Gte,
}

/// A typed predicate over one document field.
///
/// Field paths are dot-separated (`"photometry.0.band"` style traversal is
/// supported for nested objects and arrays). Numeric comparisons apply the
/// operator to f64 values; everything else supports equality only.
#[derive(Debug, Clone)]
pub struct FieldFilter {
    pub field: String,
    pub op: FilterOp,
    pub value: Value,
}

impl FieldFilter {
    pub fn new(field: &str, op: FilterOp, value: Value) -> Self {
        Self {
            field: field.to_string(),
            op,
            value,
        }
    }

    /// Equality shorthand.
    pub fn eq(field: &str, value: Value) -> Self {
        Self::new(field, FilterOp::Eq, value)
    }

    /// Evaluates the predicate against a document. Documents lacking the
    /// field never match.
    pub fn matches(&self, doc: &Document) -> bool {
        let Some(actual) = field_value(doc, &self.field) else {
            return false;
        };
        match self.op {
            FilterOp::Eq => actual == &self.value,
            FilterOp::Ne => actual != &self.value,
            FilterOp::Lt | FilterOp::Lte | FilterOp::Gt | FilterOp::Gte => {
                let (Some(a), Some(b)) = (actual.as_f64(), self.value.as_f64()) else {
                    return false;
                };
                match self.op {
                    FilterOp::Lt => a < b,
                    FilterOp::Lte => a <= b,
                    FilterOp::Gt => a > b,
                    FilterOp::Gte => a >= b,
                    _ => unreachable!(),
                }
            }
        }
    }
}

/// Resolves a dot-separated field path inside a document.
pub(crate) fn field_value<'a>(doc: &'a Document, path: &str) -> Option<&'a Value> {
    let mut current = doc;
    for part in path.split('.') {
        current = match current {
            Value::Object(map) => map.get(part)?,
            Value::Array(items) => items.get(part.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Minimal document-collection surface required by the query core.
///
/// All methods take `&self`; interior synchronization and consistency are
/// the backend's concern. The core assumes only that a completed write is
/// visible to subsequent reads by the same caller, and tolerates results
/// that reflect a stale index during an external rebuild.
pub trait DocumentStore: Send + Sync {
    /// Idempotently creates an index over `field`. Calling twice with the
    /// same arguments leaves the store in the same indexed state.
    fn ensure_index(&self, field: &str, kind: IndexKind) -> SearchResult<()>;

    /// Inserts or replaces a document keyed by its `_id` field.
    fn insert(&self, doc: Document) -> SearchResult<()>;

    /// Documents whose `field` point lies within `max_distance_m` meters of
    /// (`lon_deg`, `lat_deg`), nearest first.
    ///
    /// # Errors
    /// [`IndexMissing`](crate::SearchError::IndexMissing) if no
    /// [`GeoSphere`](IndexKind::GeoSphere) index exists on `field`.
    fn find_by_geo_near(
        &self,
        field: &str,
        lon_deg: f64,
        lat_deg: f64,
        max_distance_m: f64,
        filter: Option<&FieldFilter>,
    ) -> SearchResult<Vec<Document>>;

    /// Like [`find_by_geo_near`](Self::find_by_geo_near), but each result
    /// carries its linear distance in meters, sorted ascending.
    fn find_by_geo_near_with_distance(
        &self,
        field: &str,
        lon_deg: f64,
        lat_deg: f64,
        max_distance_m: f64,
        filter: Option<&FieldFilter>,
    ) -> SearchResult<Vec<(Document, f64)>>;

    /// Documents whose integer `field` value is a member of `values`.
    /// Unordered.
    fn find_by_field_membership(
        &self,
        field: &str,
        values: &BTreeSet<i64>,
        filter: Option<&FieldFilter>,
    ) -> SearchResult<Vec<Document>>;

    /// Atomically sets `field` on the document with the given id.
    ///
    /// This is the one write path for derived index fields; there is no
    /// check-then-write race to worry about.
    fn upsert_derived_field(&self, record_id: &str, field: &str, value: Value) -> SearchResult<()>;

    /// Reads a collection-level metadata entry.
    fn get_metadata(&self, key: &str) -> SearchResult<Option<String>>;

    /// Writes a collection-level metadata entry.
    fn put_metadata(&self, key: &str, value: &str) -> SearchResult<()>;

    /// Number of stored documents.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
