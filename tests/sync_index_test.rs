use polylocate::prelude::*;
use std::sync::Barrier;
use std::sync::Arc;
use std::thread;

fn cell(i: usize) -> PolygonRecord {
    let x = (i % 50) as f64 * 2.0;
    let y = (i / 50) as f64 * 2.0;
    PolygonRecord::from_rings(
        vec![vec![(x, y), (x + 1.0, y), (x + 1.0, y + 1.0), (x, y + 1.0)]],
        properties([("cell", i.to_string())]),
    )
}

fn centre(i: usize) -> (f64, f64) {
    ((i % 50) as f64 * 2.0 + 0.5, (i / 50) as f64 * 2.0 + 0.5)
}

#[test]
fn test_readers_during_writes() {
    let index = SyncPolygonIndex::build((0..500).map(cell));
    let barrier = Arc::new(Barrier::new(5));

    let writer = {
        let index = index.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            for i in 500..1_000 {
                index.insert(cell(i)).unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let index = index.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                for i in 0..500 {
                    let (x, y) = centre(i);
                    let found = index.query_xy(x, y).expect("pre-built cell missing");
                    assert_eq!(found["cell"], i.to_string());
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(index.len(), 1_000);
    let (x, y) = centre(999);
    assert_eq!(index.query_xy(x, y).unwrap()["cell"], "999");
}

#[test]
fn test_replace_keeps_configuration() {
    let config = Config::default()
        .with_max_entries(6)
        .with_overlap_policy(OverlapPolicy::SmallestArea);
    let index = SyncPolygonIndex::with_config(config).unwrap();
    index.load((0..20).map(cell)).unwrap();

    index.replace((100..140).map(cell)).unwrap();

    let stats = index.stats();
    assert_eq!(stats.records, 40);
    assert_eq!(stats.max_entries, 6);
    assert_eq!(index.read().config().overlap_policy, OverlapPolicy::SmallestArea);

    let (x, y) = centre(0);
    assert!(index.query_xy(x, y).is_none());
    let (x, y) = centre(120);
    assert_eq!(index.query_xy(x, y).unwrap()["cell"], "120");
}

#[test]
fn test_guards_and_query_all() {
    let index = SyncPolygonIndex::from(PolygonIndex::build((0..10).map(cell)));

    index.write().insert(cell(0)).unwrap();
    let matches = index.query_all(&Point::new(0.5, 0.5));
    assert_eq!(matches.len(), 2);

    let guard = index.read();
    assert_eq!(guard.len(), 11);
    assert!(guard.height() >= 1);
}
