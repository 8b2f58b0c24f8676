//! End-to-end cone searches over the brown-dwarf sample.
//!
//! A fixed 22-record fixture exercises both strategies against known
//! answers, plus the guard rails (radius cap, config mismatch) around
//! the pixel index.

use skyvault::healpix::{Frame, Ordering, PixelIndexConfig};
use skyvault::store::MemoryStore;
use skyvault::{
    CatalogRecord, ConeSearcher, Coordinate, DocumentStore, SearchError, SearchRequest, Strategy,
};

/// The brown-dwarf sample: (designation, ra, dec, J magnitude).
const BROWN_DWARFS: [(&str, f64, f64, f64); 22] = [
    ("2MASS J02125621+0423218", 33.2342, 4.3894, 15.96),
    ("2MASS J03163067+1015112", 49.1278, 10.2531, 14.58),
    ("2MASS J04021010-2226539", 60.5421, -22.4483, 16.22),
    ("2MASS J05350149-1202028", 83.7562, -12.0341, 14.90),
    ("2MASS J06451001+3437019", 101.2917, 34.6172, 15.61),
    ("2MASS J08075359+1843412", 121.9733, 18.7281, 14.44),
    ("2MASS J09223970-0516350", 140.6654, -5.2764, 16.03),
    ("2MASS J10364999+2249520", 159.2083, 22.8311, 15.33),
    ("2MASS J11254589-0341424", 171.4412, -3.6951, 14.72),
    ("2MASS J12073336-3932528", 181.889, -39.548, 12.99),
    ("2MASS J13002820+0833097", 195.1175, 8.5527, 15.05),
    ("2MASS J13392734-1812522", 204.8639, -18.2145, 14.67),
    ("2MASS J14012100+4555181", 210.3375, 45.9217, 15.84),
    ("2MASS J14392836+1929149", 219.868167, 19.487472, 12.76),
    ("2MASS J14482563+1031590", 222.106791, 10.533056, 14.01),
    ("2MASS J15283509+2846498", 232.1462, 28.7805, 15.12),
    ("2MASS J16041267-0920103", 241.0528, -9.3362, 14.99),
    ("2MASS J17025081+1513264", 255.7117, 15.2240, 15.47),
    ("2MASS J18014298-2837023", 270.4291, -28.6173, 14.35),
    ("2MASS J19123312+0505330", 288.1380, 5.0925, 15.70),
    ("2MASS J20230578-1432172", 305.7741, -14.5381, 14.81),
    ("2MASS J22010854+2711247", 330.2856, 27.1902, 15.29),
];

fn fixture() -> Vec<CatalogRecord> {
    BROWN_DWARFS
        .iter()
        .map(|&(designation, ra, dec, j_mag)| {
            CatalogRecord::new(designation, Coordinate::new(ra, dec).unwrap())
                .with_photometry("J", j_mag, Some(0.03))
        })
        .collect()
}

fn pixel_config() -> PixelIndexConfig {
    PixelIndexConfig::for_resolution(10.0, Ordering::Nested, Frame::Icrs).unwrap()
}

fn indexed_store() -> MemoryStore {
    let store = MemoryStore::new();
    let searcher = ConeSearcher::new(&store, pixel_config());
    searcher.index_records(&fixture()).unwrap();
    store
}

#[test]
fn test_ellipsoid_strategy_wide_cone_returns_the_two_known_dwarfs() {
    let store = indexed_store();
    let searcher = ConeSearcher::new(&store, pixel_config());

    let request = SearchRequest::new(Coordinate::new(220.0, 12.0).unwrap(), 10.0);
    let matches = searcher
        .search(&request, Strategy::EllipsoidIndex)
        .unwrap();

    let designations: Vec<_> = matches
        .iter()
        .map(|m| m.record.designation.as_str())
        .collect();
    assert_eq!(
        designations,
        vec!["2MASS J14482563+1031590", "2MASS J14392836+1929149"],
        "expected exactly the two nearby dwarfs, nearest first"
    );

    // Separations round-tripped through the linear scale stay close to
    // the exact values (2.53° and 7.49°), within the documented drift of
    // the center-latitude approximation.
    assert!((matches[0].separation_deg - 2.53).abs() < 0.08);
    assert!((matches[1].separation_deg - 7.49).abs() < 0.08);
}

#[test]
fn test_pixel_strategy_narrow_cone_returns_the_single_dwarf() {
    let store = indexed_store();
    let searcher = ConeSearcher::new(&store, pixel_config());

    let request = SearchRequest::new(
        Coordinate::new(181.9, -39.5).unwrap(),
        180.0 / 3600.0,
    );
    let matches = searcher.search(&request, Strategy::PixelIndex).unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].record.designation, "2MASS J12073336-3932528");
    // 175.5 arcseconds out, inside the 180 arcsecond cone.
    let arcsec = matches[0].separation_deg * 3600.0;
    assert!((arcsec - 175.5).abs() < 1.0, "separation {}\"", arcsec);
}

#[test]
fn test_pixel_strategy_rejects_radius_beyond_cap() {
    let store = indexed_store();
    // Cap of 1800 arcseconds; ask for 3600.
    let searcher =
        ConeSearcher::new(&store, pixel_config()).with_max_radius(1800.0 / 3600.0);

    let request = SearchRequest::new(
        Coordinate::new(181.9, -39.5).unwrap(),
        3600.0 / 3600.0,
    );
    let err = searcher
        .search(&request, Strategy::PixelIndex)
        .unwrap_err();
    assert!(matches!(err, SearchError::RadiusTooLarge { .. }));
}

#[test]
fn test_pixel_strategy_detects_config_mismatch() {
    let store = indexed_store();

    // Indexed at the nside derived from 10 arcsec; query at a coarser one.
    let coarser =
        PixelIndexConfig::for_resolution(60.0, Ordering::Nested, Frame::Icrs).unwrap();
    assert_ne!(coarser.nside, pixel_config().nside);

    let searcher = ConeSearcher::new(&store, coarser);
    let request = SearchRequest::new(
        Coordinate::new(181.9, -39.5).unwrap(),
        180.0 / 3600.0,
    );
    let err = searcher
        .search(&request, Strategy::PixelIndex)
        .unwrap_err();
    assert!(
        matches!(err, SearchError::ConfigMismatch { .. }),
        "mismatched config must fail loudly, not return an empty set"
    );
}

#[test]
fn test_magnitude_filter_narrows_the_wide_cone() {
    use serde_json::json;
    use skyvault::{FieldFilter, FilterOp};

    let store = indexed_store();
    let searcher = ConeSearcher::new(&store, pixel_config());

    // Of the two records in the 10° cone, only one is brighter than J 13.
    let mut request = SearchRequest::new(Coordinate::new(220.0, 12.0).unwrap(), 10.0);
    request.filter = Some(FieldFilter::new(
        "photometry.0.magnitude",
        FilterOp::Lt,
        json!(13.0),
    ));
    let matches = searcher
        .search(&request, Strategy::EllipsoidIndex)
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].record.designation, "2MASS J14392836+1929149");
}

#[test]
fn test_limit_truncates_nearest_first() {
    let store = indexed_store();
    let searcher = ConeSearcher::new(&store, pixel_config());

    let mut request = SearchRequest::new(Coordinate::new(220.0, 12.0).unwrap(), 10.0);
    request.limit = Some(1);
    let matches = searcher
        .search(&request, Strategy::EllipsoidIndex)
        .unwrap();

    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].record.designation, "2MASS J14482563+1031590");
}

#[test]
fn test_reindexing_the_fixture_does_not_duplicate() {
    let store = MemoryStore::new();
    let searcher = ConeSearcher::new(&store, pixel_config());
    searcher.index_records(&fixture()).unwrap();
    searcher.index_records(&fixture()).unwrap();
    assert_eq!(store.len(), 22);

    let request = SearchRequest::new(Coordinate::new(220.0, 12.0).unwrap(), 10.0);
    let matches = searcher
        .search(&request, Strategy::EllipsoidIndex)
        .unwrap();
    assert_eq!(matches.len(), 2);
}

#[test]
fn test_fixture_round_trips_through_json() {
    // The CLI loads catalogs from JSON arrays; make sure the fixture
    // survives serialization with coordinates validated on the way back.
    let records = fixture();
    let text = serde_json::to_string(&records).unwrap();
    let back: Vec<CatalogRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(back, records);
}

#[test]
fn test_catalog_file_round_trip() {
    use std::io::Write;

    let records = fixture();
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(serde_json::to_string_pretty(&records).unwrap().as_bytes())
        .unwrap();
    file.flush().unwrap();

    let text = std::fs::read_to_string(file.path()).unwrap();
    let loaded: Vec<CatalogRecord> = serde_json::from_str(&text).unwrap();
    assert_eq!(loaded.len(), 22);

    let store = MemoryStore::new();
    let searcher = ConeSearcher::new(&store, pixel_config());
    searcher.index_records(&loaded).unwrap();

    let request = SearchRequest::new(
        Coordinate::new(181.9, -39.5).unwrap(),
        180.0 / 3600.0,
    );
    let matches = searcher.search(&request, Strategy::PixelIndex).unwrap();
    assert_eq!(matches.len(), 1);
}
