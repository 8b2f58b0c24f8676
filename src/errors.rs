//! Error types for catalog cone searches.
//!
//! A single [`SearchError`] enum covers every failure mode of the query core.
//! All variants indicate caller misuse or missing setup rather than transient
//! conditions: the core performs no retries, and a failed search returns no
//! partial results. Transient store unavailability surfaces through
//! [`Store`](SearchError::Store) unchanged; retry policy belongs to the caller.
//!
//! # Error Categories
//!
//! | Variant | Use Case |
//! |---------|----------|
//! | [`InvalidCoordinate`](SearchError::InvalidCoordinate) | RA/Dec outside the legal domain |
//! | [`InvalidRadius`](SearchError::InvalidRadius) | Non-positive or non-finite search radius |
//! | [`InvalidConfig`](SearchError::InvalidConfig) | Malformed pixel index configuration |
//! | [`IndexMissing`](SearchError::IndexMissing) | Required store index was never created |
//! | [`RadiusTooLarge`](SearchError::RadiusTooLarge) | Pixel-strategy radius exceeds the configured cap |
//! | [`ConfigMismatch`](SearchError::ConfigMismatch) | Query-time pixel config differs from the indexed one |
//! | [`Store`](SearchError::Store) | Backend failure, surfaced unchanged |

use thiserror::Error;

/// Unified error type for cone-search operations.
///
/// Use the constructor methods ([`invalid_coordinate`](Self::invalid_coordinate),
/// [`store`](Self::store), etc.) for consistent error creation.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Right ascension or declination outside the legal domain.
    #[error("Invalid coordinate (ra {ra_deg}, dec {dec_deg}): {message}")]
    InvalidCoordinate {
        ra_deg: f64,
        dec_deg: f64,
        message: String,
    },

    /// Search radius is non-positive or non-finite.
    #[error("Invalid search radius {radius_deg}°: {message}")]
    InvalidRadius { radius_deg: f64, message: String },

    /// Malformed pixel index configuration.
    #[error("Invalid pixel index config: {message}")]
    InvalidConfig { message: String },

    /// A required index is absent on the backing store.
    #[error("Missing {kind} index on field '{field}'")]
    IndexMissing { field: String, kind: String },

    /// Pixel-strategy radius exceeds the configured cap.
    ///
    /// The cap bounds the pixel candidate set, which grows roughly with
    /// (radius / resolution)². Exceeding it is a usage error, never a
    /// silent truncation.
    #[error("Search radius {radius_deg}° exceeds the configured cap of {max_radius_deg}°")]
    RadiusTooLarge {
        radius_deg: f64,
        max_radius_deg: f64,
    },

    /// Query-time pixel config differs from the one used at index time.
    ///
    /// Without this check a mismatched query silently returns an empty
    /// result set, since pixel ids from one config never match buckets
    /// built with another.
    #[error("Pixel index config mismatch: stored '{stored}', requested '{requested}'")]
    ConfigMismatch { stored: String, requested: String },

    /// Backend store failure.
    #[error("Store error during {operation}: {message}")]
    Store { operation: String, message: String },
}

/// Convenience alias for `Result<T, SearchError>`.
pub type SearchResult<T> = Result<T, SearchError>;

impl SearchError {
    /// Creates an [`InvalidCoordinate`](Self::InvalidCoordinate) error.
    pub fn invalid_coordinate(ra_deg: f64, dec_deg: f64, reason: &str) -> Self {
        Self::InvalidCoordinate {
            ra_deg,
            dec_deg,
            message: reason.to_string(),
        }
    }

    /// Creates an [`InvalidRadius`](Self::InvalidRadius) error.
    pub fn invalid_radius(radius_deg: f64, reason: &str) -> Self {
        Self::InvalidRadius {
            radius_deg,
            message: reason.to_string(),
        }
    }

    /// Creates an [`InvalidConfig`](Self::InvalidConfig) error.
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: reason.into(),
        }
    }

    /// Creates an [`IndexMissing`](Self::IndexMissing) error.
    pub fn index_missing(field: &str, kind: &str) -> Self {
        Self::IndexMissing {
            field: field.to_string(),
            kind: kind.to_string(),
        }
    }

    /// Creates a [`ConfigMismatch`](Self::ConfigMismatch) error.
    pub fn config_mismatch(stored: &str, requested: &str) -> Self {
        Self::ConfigMismatch {
            stored: stored.to_string(),
            requested: requested.to_string(),
        }
    }

    /// Creates a [`Store`](Self::Store) error.
    pub fn store(operation: &str, reason: impl Into<String>) -> Self {
        Self::Store {
            operation: operation.to_string(),
            message: reason.into(),
        }
    }
}
