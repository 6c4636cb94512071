use polylocate::prelude::*;
use polylocate::{Entry, RTree};

fn unit_square(x: f64, y: f64, name: &str) -> PolygonRecord {
    PolygonRecord::from_rings(
        vec![vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]],
        properties([("name", name)]),
    )
}

/// Test 1: Large dataset built in bulk
#[test]
fn test_large_dataset_build() {
    let records = (0..10_000).map(|i| {
        let x = (i % 100) as f64 * 2.0;
        let y = (i / 100) as f64 * 2.0;
        unit_square(x, y, &i.to_string())
    });
    let index = PolygonIndex::build(records);

    assert_eq!(index.len(), 10_000);
    assert_eq!(index.query_xy(198.5, 198.5).unwrap()["name"], "9999");
    assert!(index.query_xy(199.5, 199.5).is_none());

    let stats = index.stats();
    assert_eq!(stats.height, 5);
    assert!(stats.leaves >= 10_000 / 9);
}

/// Test 2: Large dataset inserted one by one
#[test]
fn test_large_dataset_insertion() {
    let mut index = PolygonIndex::new();
    for i in 0..5_000 {
        let x = (i * 7919 % 5_000) as f64 * 2.0;
        index
            .insert(unit_square(x, 0.0, &i.to_string()))
            .unwrap_or_else(|_| panic!("Failed to insert record {}", i));
    }

    assert_eq!(index.len(), 5_000);
    assert!(index.query_xy(0.5, 0.5).is_some());
    assert!(index.query_xy(1.5, 0.5).is_none());
}

/// Test 3: Identical polygons stacked on top of each other
#[test]
fn test_duplicate_polygons() {
    let records = (0..50).map(|i| unit_square(0.0, 0.0, &i.to_string()));
    let index = PolygonIndex::build(records);

    assert_eq!(index.query_xy(0.5, 0.5).unwrap()["name"], "0");
    assert_eq!(index.query_all(&Point::new(0.5, 0.5)).len(), 50);
}

/// Test 4: Extreme and degenerate coordinates
#[test]
fn test_extreme_coordinates() {
    let huge = 1.0e300;
    let index = PolygonIndex::build(vec![
        PolygonRecord::from_rings(
            vec![vec![(-huge, -huge), (huge, -huge), (huge, huge), (-huge, huge)]],
            properties([("name", "world")]),
        ),
        unit_square(-180.0, -90.0, "corner"),
    ]);

    assert_eq!(index.query_xy(0.0, 0.0).unwrap()["name"], "world");
    assert_eq!(index.query_xy(-179.5, -89.5).unwrap()["name"], "world");
    assert_eq!(index.query_all(&Point::new(-179.5, -89.5)).len(), 2);
    assert!(index.query_xy(f64::INFINITY, 0.0).is_none());
}

/// Test 5: Boundary points never panic
#[test]
fn test_boundary_queries() {
    let index = PolygonIndex::build(vec![unit_square(0.0, 0.0, "A"), unit_square(1.0, 0.0, "B")]);

    for &(x, y) in &[(0.0, 0.0), (1.0, 0.5), (1.0, 1.0), (2.0, 0.0), (0.5, 1.0)] {
        let _ = index.query_xy(x, y);
    }
}

/// Test 6: Every record rejected
#[test]
fn test_all_records_invalid() {
    let records = vec![
        PolygonRecord::from_rings(vec![vec![(0.0, 0.0), (1.0, 1.0)]], Properties::new()),
        PolygonRecord::from_rings(Vec::new(), Properties::new()),
        PolygonRecord::from_rings(
            vec![vec![(0.0, 0.0), (f64::NAN, 1.0), (1.0, 0.0)]],
            Properties::new(),
        ),
    ];
    let index = PolygonIndex::build(records);

    assert!(index.is_empty());
    assert_eq!(index.stats().skipped_records, 3);
    assert!(index.query_xy(0.5, 0.5).is_none());
}

/// Test 7: Empty GeoJSON collection
#[test]
fn test_empty_feature_collection() {
    let index =
        PolygonIndex::from_geojson_str(r#"{"type": "FeatureCollection", "features": []}"#)
            .unwrap();
    assert!(index.is_empty());
    assert_eq!(index.height(), 1);
}

/// Test 8: Malformed GeoJSON
#[test]
fn test_malformed_geojson() {
    assert!(matches!(
        PolygonIndex::from_geojson_str("{\"type\": \"FeatureCollection\""),
        Err(LocateError::InvalidFormat(_))
    ));
    assert!(matches!(
        PolygonIndex::from_geojson_str(r#"{"type": "Point", "coordinates": [0, 0]}"#),
        Err(LocateError::InvalidFormat(_))
    ));
}

/// Test 9: Minimum fan-out and clamped fan-out
#[test]
fn test_fan_out_clamping() {
    let tree: RTree<u32> = RTree::new(1);
    assert_eq!(tree.max_entries(), 4);
    assert_eq!(tree.min_entries(), 2);

    let items = (0..1_000u32)
        .map(|i| Entry::new(BoundingBox::from_point(i as f64, 0.0), i))
        .collect();
    let tree = RTree::build(4, items);
    assert_eq!(tree.len(), 1_000);
    assert_eq!(tree.height(), 5);
    assert_eq!(tree.search(&BoundingBox::new(10.0, 0.0, 19.0, 0.0)).len(), 10);
}

/// Test 10: Clearing and reusing an index
#[test]
fn test_clear_and_reuse() {
    let mut index = PolygonIndex::build((0..100).map(|i| unit_square(i as f64 * 2.0, 0.0, "x")));
    index.clear();
    assert!(index.is_empty());
    assert!(index.query_xy(0.5, 0.5).is_none());

    index.insert(unit_square(0.0, 0.0, "again")).unwrap();
    assert_eq!(index.query_xy(0.5, 0.5).unwrap()["name"], "again");
    assert_eq!(index.query_record(&Point::new(0.5, 0.5)).unwrap().ordinal(), 0);
}
