//! Compute layer for indexing and query algorithms.
//!
//! This module separates the index algorithms from data loading. It provides:
//! - Spatial primitives: the R-tree, partial selection, point-in-polygon
//! - Geometry validation for incoming records
//! - GeoJSON conversion at the loading boundary
//!
//! The spatial algorithms never see GeoJSON; the loaders feed them plain
//! polygons and property maps.

#[cfg(feature = "geojson")]
pub mod geojson;
pub mod spatial;
pub mod validation;
