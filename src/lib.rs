//! Point-in-polygon lookup over property-tagged polygons, backed by a
//! bulk-loaded R-tree.
//!
//! ```rust
//! use polylocate::{Point, PolygonIndex};
//!
//! let geojson = r#"{
//!     "type": "FeatureCollection",
//!     "features": [{
//!         "type": "Feature",
//!         "properties": {"name": "A"},
//!         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 1], [0, 0]]]}
//!     }]
//! }"#;
//!
//! let index = PolygonIndex::from_geojson_str(geojson)?;
//! let found = index.query(&Point::new(0.5, 0.5)).unwrap();
//! assert_eq!(found["name"], "A");
//! assert_eq!(found["_index"], "1");
//! assert!(index.query(&Point::new(5.0, 5.0)).is_none());
//! # Ok::<(), polylocate::LocateError>(())
//! ```

pub mod builder;
pub mod compute;
pub mod config;
pub mod error;
pub mod index;

#[cfg(feature = "sync")]
pub mod sync;

pub use builder::IndexBuilder;
pub use config::{Config, OverlapPolicy};
pub use error::{LocateError, Result};
pub use index::{IndexStats, IndexedPolygon, PolygonIndex, PolygonRecord};

pub use compute::spatial::{Entry, RTree, TreeShape, polygon_contains};

pub use polylocate_types::bbox::BoundingBox;
pub use polylocate_types::geo::{
    Point, Polygon, Properties, SharedProperties, polygon_from_rings, properties,
};

#[cfg(feature = "sync")]
pub use sync::SyncPolygonIndex;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Common imports
pub mod prelude {

    pub use crate::{IndexBuilder, LocateError, PolygonIndex, PolygonRecord, Result};

    pub use crate::{BoundingBox, Point, Polygon, Properties, polygon_from_rings, properties};

    pub use crate::{Config, IndexStats, OverlapPolicy};

    #[cfg(feature = "sync")]
    pub use crate::SyncPolygonIndex;
}
