//! Point-location index over property-tagged polygons.
//!
//! [`PolygonIndex`] keeps one [`RTree`] whose entries are keyed by each
//! polygon's exterior bounding box. A query runs a degenerate-box range
//! search to collect candidates and confirms each one with the ray-casting
//! predicate. When several polygons contain the point the configured
//! [`OverlapPolicy`] picks the answer.

use geo::Area;
use polylocate_types::bbox::BoundingBox;
use polylocate_types::geo::{Point, Polygon, Properties, SharedProperties, exterior_bbox};

use crate::compute::spatial::pip::polygon_contains;
use crate::compute::spatial::rtree::{Entry, Node, RTree};
use crate::compute::validation::validate_polygon;
use crate::config::{Config, OverlapPolicy};
use crate::error::{LocateError, Result};

/// Input record: a polygon plus the properties returned when it matches.
#[derive(Debug, Clone, PartialEq)]
pub struct PolygonRecord {
    pub polygon: Polygon<f64>,
    pub properties: SharedProperties,
}

impl PolygonRecord {
    pub fn new(polygon: Polygon<f64>, properties: impl Into<SharedProperties>) -> Self {
        Self {
            polygon,
            properties: properties.into(),
        }
    }

    /// Build a record from raw rings; ring 0 is the exterior.
    ///
    /// # Examples
    ///
    /// ```
    /// use polylocate::{PolygonRecord, properties};
    ///
    /// let record = PolygonRecord::from_rings(
    ///     vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]],
    ///     properties([("name", "A")]),
    /// );
    /// assert_eq!(record.properties["name"], "A");
    /// ```
    pub fn from_rings(
        rings: Vec<Vec<(f64, f64)>>,
        properties: impl Into<SharedProperties>,
    ) -> Self {
        Self::new(
            polylocate_types::geo::polygon_from_rings(rings),
            properties,
        )
    }
}

/// A record as stored in the tree.
#[derive(Debug, Clone)]
pub struct IndexedPolygon {
    polygon: Polygon<f64>,
    properties: SharedProperties,
    ordinal: usize,
    area: f64,
}

impl IndexedPolygon {
    fn new(record: PolygonRecord, ordinal: usize) -> Self {
        let area = record.polygon.unsigned_area();
        Self {
            polygon: record.polygon,
            properties: record.properties,
            ordinal,
            area,
        }
    }

    fn into_entry(self) -> Entry<Self> {
        Entry::new(exterior_bbox(&self.polygon), self)
    }

    pub fn polygon(&self) -> &Polygon<f64> {
        &self.polygon
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// The shared property handle, identical across parts of one feature.
    pub fn shared_properties(&self) -> &SharedProperties {
        &self.properties
    }

    /// Position of the record in insertion order, counted from 0.
    pub fn ordinal(&self) -> usize {
        self.ordinal
    }

    /// Unsigned polygon area, holes subtracted.
    pub fn area(&self) -> f64 {
        self.area
    }

    pub fn contains(&self, point: &Point<f64>) -> bool {
        polygon_contains(&self.polygon, point)
    }
}

/// Snapshot of index size and tree shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub struct IndexStats {
    pub records: usize,
    pub skipped_records: usize,
    pub height: usize,
    pub nodes: usize,
    pub leaves: usize,
    pub max_entries: usize,
    pub min_entries: usize,
}

/// Polygon point-location index.
///
/// # Examples
///
/// ```
/// use polylocate::{Point, PolygonIndex, PolygonRecord, properties};
///
/// let index = PolygonIndex::build(vec![
///     PolygonRecord::from_rings(
///         vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]],
///         properties([("name", "A")]),
///     ),
///     PolygonRecord::from_rings(
///         vec![vec![(10.0, 10.0), (11.0, 10.0), (11.0, 11.0), (10.0, 11.0)]],
///         properties([("name", "B")]),
///     ),
/// ]);
///
/// assert_eq!(index.query(&Point::new(0.5, 0.5)).unwrap()["name"], "A");
/// assert_eq!(index.query_xy(10.5, 10.5).unwrap()["name"], "B");
/// assert!(index.query_xy(5.0, 5.0).is_none());
/// ```
/// Outcome of validating one batch of records.
#[derive(Default)]
struct Prepared {
    entries: Vec<Entry<IndexedPolygon>>,
    seen: usize,
    rejected: usize,
    first_error: Option<LocateError>,
}

#[derive(Debug, Clone)]
pub struct PolygonIndex {
    tree: RTree<IndexedPolygon>,
    config: Config,
    next_ordinal: usize,
    skipped: usize,
}

impl Default for PolygonIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl PolygonIndex {
    /// Create an empty index with the default configuration.
    pub fn new() -> Self {
        Self::empty(Config::default())
    }

    /// Create an empty index with a validated configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self::empty(config))
    }

    fn empty(config: Config) -> Self {
        Self {
            tree: RTree::new(config.max_entries),
            config,
            next_ordinal: 0,
            skipped: 0,
        }
    }

    /// Bulk-build an index with the default configuration.
    ///
    /// Malformed records are logged and skipped.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PolygonRecord>,
    {
        let mut index = Self::new();
        let prepared = index.prepare(records);
        index.commit(prepared);
        index.log_built();
        index
    }

    /// Bulk-build an index with a custom configuration.
    ///
    /// Fails on the first malformed record unless `skip_invalid` is set.
    pub fn build_with_config<I>(records: I, config: Config) -> Result<Self>
    where
        I: IntoIterator<Item = PolygonRecord>,
    {
        let mut index = Self::with_config(config)?;
        index.load(records)?;
        index.log_built();
        Ok(index)
    }

    /// Build from a GeoJSON `FeatureCollection` string with the default configuration.
    #[cfg(feature = "geojson")]
    pub fn from_geojson_str(geojson: &str) -> Result<Self> {
        crate::builder::IndexBuilder::new()
            .geojson_str(geojson)?
            .build()
    }

    /// Build from a reader yielding a GeoJSON `FeatureCollection`.
    #[cfg(feature = "geojson")]
    pub fn from_geojson_reader<R: std::io::Read>(reader: R) -> Result<Self> {
        crate::builder::IndexBuilder::new()
            .geojson_reader(reader)?
            .build()
    }

    /// Build from a GeoJSON file.
    #[cfg(feature = "geojson")]
    pub fn from_geojson_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        crate::builder::IndexBuilder::new()
            .geojson_path(path)?
            .build()
    }

    /// Validate records and turn them into tree entries.
    ///
    /// Ordinals continue from the index but no counter moves until the
    /// result is handed to [`commit`](Self::commit).
    fn prepare<I>(&self, records: I) -> Prepared
    where
        I: IntoIterator<Item = PolygonRecord>,
    {
        let mut prepared = Prepared::default();

        for record in records {
            let ordinal = self.next_ordinal + prepared.seen;
            prepared.seen += 1;

            match validate_polygon(&record.polygon) {
                Ok(()) => prepared
                    .entries
                    .push(IndexedPolygon::new(record, ordinal).into_entry()),
                Err(e) => {
                    log::warn!("invalid polygon record {}: {}", ordinal, e);
                    prepared.rejected += 1;
                    prepared.first_error.get_or_insert(e);
                }
            }
        }
        prepared
    }

    fn commit(&mut self, prepared: Prepared) -> usize {
        self.next_ordinal += prepared.seen;
        self.skipped += prepared.rejected;
        let added = prepared.entries.len();
        self.tree.load(prepared.entries);
        added
    }

    /// Bulk-add records to the index, which may already hold data.
    ///
    /// Returns the number of records added. With `skip_invalid` unset, a
    /// malformed record aborts the load and leaves the index untouched,
    /// including its skipped count and the ordinals handed out next.
    pub fn load<I>(&mut self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = PolygonRecord>,
    {
        let mut prepared = self.prepare(records);
        if let Some(e) = prepared.first_error.take()
            && !self.config.skip_invalid
        {
            return Err(e);
        }
        Ok(self.commit(prepared))
    }

    /// Insert one record.
    pub fn insert(&mut self, record: PolygonRecord) -> Result<()> {
        validate_polygon(&record.polygon)?;
        let ordinal = self.next_ordinal;
        self.next_ordinal += 1;

        let entry = IndexedPolygon::new(record, ordinal).into_entry();
        self.tree.insert(entry.bbox, entry.payload);
        Ok(())
    }

    pub(crate) fn add_skipped(&mut self, count: usize) {
        self.skipped += count;
    }

    fn log_built(&self) {
        log::debug!(
            "polygon index built: {} records, {} skipped, tree height {}",
            self.tree.len(),
            self.skipped,
            self.tree.height()
        );
    }

    /// Properties of the polygon containing `point`, chosen by the overlap policy.
    pub fn query(&self, point: &Point<f64>) -> Option<&Properties> {
        self.query_record(point).map(IndexedPolygon::properties)
    }

    pub fn query_xy(&self, x: f64, y: f64) -> Option<&Properties> {
        self.query(&Point::new(x, y))
    }

    /// Like [`query`](Self::query), returning the whole stored record.
    pub fn query_record(&self, point: &Point<f64>) -> Option<&IndexedPolygon> {
        let mut matches = self.candidates(point).filter(|p| p.contains(point));

        match self.config.overlap_policy {
            OverlapPolicy::FirstMatch => matches.next(),
            OverlapPolicy::InputOrder => matches.min_by_key(|p| p.ordinal),
            OverlapPolicy::SmallestArea => matches.min_by(|a, b| {
                a.area
                    .total_cmp(&b.area)
                    .then(a.ordinal.cmp(&b.ordinal))
            }),
        }
    }

    /// Every record containing `point`, in input order.
    pub fn query_all(&self, point: &Point<f64>) -> Vec<&IndexedPolygon> {
        let mut matches: Vec<_> = self
            .candidates(point)
            .filter(|p| p.contains(point))
            .collect();
        matches.sort_by_key(|p| p.ordinal);
        matches
    }

    fn candidates(&self, point: &Point<f64>) -> impl Iterator<Item = &IndexedPolygon> {
        self.tree
            .search(&BoundingBox::from_point(point.x(), point.y()))
            .into_iter()
            .map(|entry| &entry.payload)
    }

    /// Every stored record, in tree traversal order.
    pub fn all_items(&self) -> Vec<&IndexedPolygon> {
        self.tree
            .all_items()
            .into_iter()
            .map(|entry| &entry.payload)
            .collect()
    }

    pub fn tree(&self) -> &RTree<IndexedPolygon> {
        &self.tree
    }

    /// Root node of the underlying tree, for diagnostics.
    pub fn root(&self) -> &Node<IndexedPolygon> {
        self.tree.root()
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    pub fn height(&self) -> usize {
        self.tree.height()
    }

    /// Remove every record and reset the counters.
    pub fn clear(&mut self) {
        self.tree.clear();
        self.next_ordinal = 0;
        self.skipped = 0;
    }

    pub fn stats(&self) -> IndexStats {
        let shape = self.tree.shape();
        IndexStats {
            records: self.tree.len(),
            skipped_records: self.skipped,
            height: shape.height,
            nodes: shape.nodes,
            leaves: shape.leaves,
            max_entries: self.tree.max_entries(),
            min_entries: self.tree.min_entries(),
        }
    }

    /// Export the stored records as a feature collection, in input order.
    #[cfg(feature = "geojson")]
    pub fn to_feature_collection(&self) -> geojson::FeatureCollection {
        let mut items = self.all_items();
        items.sort_by_key(|p| p.ordinal);

        geojson::FeatureCollection {
            bbox: None,
            features: items
                .into_iter()
                .map(|p| crate::compute::geojson::polygon_feature(&p.polygon, &p.properties))
                .collect(),
            foreign_members: None,
        }
    }
}

impl FromIterator<PolygonRecord> for PolygonIndex {
    fn from_iter<I: IntoIterator<Item = PolygonRecord>>(iter: I) -> Self {
        Self::build(iter)
    }
}
