//! Shared Index Example
//!
//! Serves point lookups from several threads while a background thread
//! rebuilds the index and swaps it in.

use polylocate::{PolygonRecord, SyncPolygonIndex, properties};
use std::error::Error;
use std::thread;
use std::time::Duration;

fn zones(generation: usize) -> Vec<PolygonRecord> {
    (0..100)
        .map(|i| {
            let x = (i % 10) as f64 * 10.0;
            let y = (i / 10) as f64 * 10.0;
            PolygonRecord::from_rings(
                vec![vec![(x, y), (x + 10.0, y), (x + 10.0, y + 10.0), (x, y + 10.0)]],
                properties([
                    ("zone", i.to_string()),
                    ("generation", generation.to_string()),
                ]),
            )
        })
        .collect()
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let index = SyncPolygonIndex::build(zones(0));

    let readers: Vec<_> = (0..4)
        .map(|t| {
            let index = index.clone();
            thread::spawn(move || {
                let mut seen = std::collections::BTreeSet::new();
                for i in 0..200 {
                    let (x, y) = ((i * 7 % 100) as f64 + 0.5, (i * 13 % 100) as f64 + 0.5);
                    if let Some(props) = index.query_xy(x, y) {
                        seen.insert(props["generation"].clone());
                    }
                    thread::sleep(Duration::from_micros(200));
                }
                println!("reader {} saw generations {:?}", t, seen);
            })
        })
        .collect();

    for generation in 1..=3 {
        thread::sleep(Duration::from_millis(10));
        index.replace(zones(generation))?;
        println!("swapped in generation {}", generation);
    }

    for reader in readers {
        reader.join().map_err(|_| "reader thread panicked")?;
    }

    println!("\nfinal stats: {:?}", index.stats());
    Ok(())
}
