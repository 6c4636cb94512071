//! Index builder for flexible configuration
//!
//! Collects configuration and records from several sources (in-memory
//! records, GeoJSON documents) and bulk-builds a [`PolygonIndex`] once.

use crate::config::{Config, OverlapPolicy};
use crate::error::Result;
use crate::index::{PolygonIndex, PolygonRecord};

/// Builder that gathers records and settings before a single bulk build.
///
/// GeoJSON sources are converted when added, using the feature index key and
/// `skip_invalid` setting configured at that moment, so set the configuration
/// first.
///
/// # Examples
///
/// ```
/// use polylocate::{IndexBuilder, OverlapPolicy, PolygonRecord, properties};
///
/// let index = IndexBuilder::new()
///     .max_entries(16)
///     .overlap_policy(OverlapPolicy::SmallestArea)
///     .record(PolygonRecord::from_rings(
///         vec![vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0)]],
///         properties([("zone", "outer")]),
///     ))
///     .record(PolygonRecord::from_rings(
///         vec![vec![(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 2.0)]],
///         properties([("zone", "inner")]),
///     ))
///     .build()
///     .unwrap();
///
/// assert_eq!(index.query_xy(1.5, 1.5).unwrap()["zone"], "inner");
/// assert_eq!(index.query_xy(3.0, 3.0).unwrap()["zone"], "outer");
/// ```
#[derive(Debug, Default)]
pub struct IndexBuilder {
    config: Config,
    records: Vec<PolygonRecord>,
    skipped: usize,
}

impl IndexBuilder {
    /// Create a new builder with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.config = self.config.with_max_entries(max_entries);
        self
    }

    pub fn overlap_policy(mut self, policy: OverlapPolicy) -> Self {
        self.config = self.config.with_overlap_policy(policy);
        self
    }

    /// Property key for GeoJSON feature positions; `None` disables tagging.
    pub fn feature_index_key<S: Into<String>>(mut self, key: Option<S>) -> Self {
        self.config = self.config.with_feature_index_key(key);
        self
    }

    pub fn skip_invalid(mut self, skip: bool) -> Self {
        self.config = self.config.with_skip_invalid(skip);
        self
    }

    pub fn record(mut self, record: PolygonRecord) -> Self {
        self.records.push(record);
        self
    }

    pub fn records<I>(mut self, records: I) -> Self
    where
        I: IntoIterator<Item = PolygonRecord>,
    {
        self.records.extend(records);
        self
    }

    /// Number of records collected so far.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[cfg(feature = "geojson")]
    fn collection(mut self, collection: &geojson::FeatureCollection) -> Result<Self> {
        let loaded = crate::compute::geojson::collection_records(
            collection,
            self.config.feature_index_key.as_deref(),
            self.config.skip_invalid,
        )?;
        self.records.extend(loaded.records);
        self.skipped += loaded.skipped;
        Ok(self)
    }

    /// Add every polygonal feature of a GeoJSON document.
    #[cfg(feature = "geojson")]
    pub fn geojson_str(self, geojson: &str) -> Result<Self> {
        let collection = crate::compute::geojson::parse_str(geojson)?;
        self.collection(&collection)
    }

    #[cfg(feature = "geojson")]
    pub fn geojson_reader<R: std::io::Read>(self, reader: R) -> Result<Self> {
        let collection = crate::compute::geojson::parse_reader(reader)?;
        self.collection(&collection)
    }

    #[cfg(feature = "geojson")]
    pub fn geojson_path<P: AsRef<std::path::Path>>(self, path: P) -> Result<Self> {
        let collection = crate::compute::geojson::parse_path(path)?;
        self.collection(&collection)
    }

    /// Validate the configuration and bulk-build the index.
    pub fn build(self) -> Result<PolygonIndex> {
        let mut index = PolygonIndex::build_with_config(self.records, self.config)?;
        index.add_skipped(self.skipped);
        Ok(index)
    }
}
