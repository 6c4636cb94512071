//! Reverse Geocoding Example
//!
//! Loads a GeoJSON FeatureCollection of regions and reports which region
//! contains each query point. Pass a file path to use your own data:
//!
//! ```text
//! cargo run --example reverse_geocode -- regions.geojson 2.35 48.85
//! ```

use polylocate::{Point, PolygonIndex};
use std::error::Error;

const SAMPLE: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {
            "type": "Feature",
            "properties": {"name": "Northland", "iso": "NL"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[0, 5], [10, 5], [10, 10], [0, 10], [0, 5]]]
            }
        },
        {
            "type": "Feature",
            "properties": {"name": "Southland", "iso": "SL"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [
                    [[0, 0], [10, 0], [10, 5], [0, 5], [0, 0]],
                    [[4, 1], [6, 1], [6, 3], [4, 3], [4, 1]]
                ]
            }
        },
        {
            "type": "Feature",
            "properties": {"name": "Lake Inland", "iso": "LI"},
            "geometry": {
                "type": "Polygon",
                "coordinates": [[[4, 1], [6, 1], [6, 3], [4, 3], [4, 1]]]
            }
        }
    ]
}"#;

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();

    let index = match args.first() {
        Some(path) => PolygonIndex::from_geojson_path(path)?,
        None => PolygonIndex::from_geojson_str(SAMPLE)?,
    };

    let stats = index.stats();
    println!(
        "Indexed {} polygons ({} skipped), tree height {}, {} nodes\n",
        stats.records, stats.skipped_records, stats.height, stats.nodes
    );

    let points = if args.len() >= 3 {
        vec![Point::new(args[1].parse()?, args[2].parse()?)]
    } else {
        vec![
            Point::new(2.0, 8.0),
            Point::new(2.0, 2.0),
            Point::new(5.0, 2.0),
            Point::new(20.0, 20.0),
        ]
    };

    for point in points {
        match index.query(&point) {
            Some(props) => {
                let name = props.get("name").map(String::as_str).unwrap_or("<unnamed>");
                println!("   ({:>6.2}, {:>6.2}) -> {}", point.x(), point.y(), name);
                for (key, value) in props {
                    println!("        {} = {}", key, value);
                }
            }
            None => println!("   ({:>6.2}, {:>6.2}) -> not found", point.x(), point.y()),
        }
    }

    Ok(())
}
