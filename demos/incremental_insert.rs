//! Incremental Insert Example
//!
//! Builds an index in bulk, then grows it with single inserts and batch
//! loads, printing the tree shape after each step.

use polylocate::{Config, OverlapPolicy, PolygonIndex, PolygonRecord, properties};
use std::error::Error;

fn parcel(x: f64, y: f64, size: f64, id: usize) -> PolygonRecord {
    PolygonRecord::from_rings(
        vec![vec![(x, y), (x + size, y), (x + size, y + size), (x, y + size)]],
        properties([("parcel", id.to_string())]),
    )
}

fn report(step: &str, index: &PolygonIndex) {
    let stats = index.stats();
    println!(
        "{:<28} records={:<6} height={} nodes={:<5} leaves={}",
        step, stats.records, stats.height, stats.nodes, stats.leaves
    );
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let config = Config::default()
        .with_max_entries(16)
        .with_overlap_policy(OverlapPolicy::SmallestArea);

    let initial = (0..1_000).map(|i| parcel((i % 40) as f64, (i / 40) as f64, 1.0, i));
    let mut index = PolygonIndex::build_with_config(initial, config)?;
    report("bulk build", &index);

    for i in 0..200 {
        index.insert(parcel(100.0 + i as f64, 0.0, 1.0, 1_000 + i))?;
    }
    report("after 200 inserts", &index);

    let batch = (0..500).map(|i| parcel(200.0 + (i % 20) as f64, (i / 20) as f64, 1.0, 1_200 + i));
    let added = index.load(batch)?;
    report(&format!("after loading {}", added), &index);

    // A small parcel inside an existing one wins under SmallestArea.
    index.insert(parcel(10.25, 10.25, 0.5, 9_999))?;
    let hit = index.query_xy(10.5, 10.5).map(|p| p["parcel"].clone());
    println!("\nparcel at (10.5, 10.5): {:?}", hit);

    let overlapping: Vec<_> = index
        .query_all(&polylocate::Point::new(10.5, 10.5))
        .into_iter()
        .map(|r| r.properties()["parcel"].clone())
        .collect();
    println!("all parcels there:      {:?}", overlapping);

    Ok(())
}
