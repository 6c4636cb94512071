//! Thread-safe wrapper for sharing an index between threads.
//!
//! This module provides `SyncPolygonIndex`, a wrapper around [`PolygonIndex`]
//! that uses `Arc<RwLock<PolygonIndex>>` internally: queries take a shared
//! read lock, incremental inserts take the exclusive write lock, and
//! [`replace`](SyncPolygonIndex::replace) rebuilds a fresh index off-lock and
//! swaps it in.
//!
//! # Features
//!
//! Enable the `sync` feature to use this module:
//!
//! ```toml
//! [dependencies]
//! polylocate = { version = "0.1", features = ["sync"] }
//! ```
//!
//! # Examples
//!
//! ```rust
//! use polylocate::{PolygonRecord, SyncPolygonIndex, properties};
//! use std::thread;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let index = SyncPolygonIndex::new();
//! let writer = index.clone();
//!
//! let handle = thread::spawn(move || {
//!     writer
//!         .insert(PolygonRecord::from_rings(
//!             vec![vec![(0.0, 0.0), (1.0, 0.0), (1.0, 1.0), (0.0, 1.0)]],
//!             properties([("name", "A")]),
//!         ))
//!         .unwrap();
//! });
//! handle.join().unwrap();
//!
//! assert_eq!(index.query_xy(0.5, 0.5).unwrap()["name"], "A");
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::config::Config;
use crate::error::Result;
use crate::index::{IndexStats, PolygonIndex, PolygonRecord};
use crate::{Point, SharedProperties};

/// Thread-safe wrapper around `PolygonIndex` using `Arc<RwLock<PolygonIndex>>`.
///
/// Query results are returned as shared property handles so no lock is held
/// once a call returns.
#[derive(Clone, Default)]
pub struct SyncPolygonIndex {
    inner: Arc<RwLock<PolygonIndex>>,
}

impl std::fmt::Debug for SyncPolygonIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncPolygonIndex")
            .field("stats", &self.stats())
            .finish()
    }
}

impl From<PolygonIndex> for SyncPolygonIndex {
    fn from(index: PolygonIndex) -> Self {
        Self {
            inner: Arc::new(RwLock::new(index)),
        }
    }
}

impl SyncPolygonIndex {
    /// Creates an empty index with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty index with a custom configuration.
    pub fn with_config(config: Config) -> Result<Self> {
        Ok(PolygonIndex::with_config(config)?.into())
    }

    /// Bulk-builds the wrapped index.
    pub fn build<I>(records: I) -> Self
    where
        I: IntoIterator<Item = PolygonRecord>,
    {
        PolygonIndex::build(records).into()
    }

    /// Properties of the polygon containing `point`.
    pub fn query(&self, point: &Point<f64>) -> Option<SharedProperties> {
        self.inner
            .read()
            .query_record(point)
            .map(|record| Arc::clone(record.shared_properties()))
    }

    pub fn query_xy(&self, x: f64, y: f64) -> Option<SharedProperties> {
        self.query(&Point::new(x, y))
    }

    /// Properties of every polygon containing `point`, in input order.
    pub fn query_all(&self, point: &Point<f64>) -> Vec<SharedProperties> {
        self.inner
            .read()
            .query_all(point)
            .into_iter()
            .map(|record| Arc::clone(record.shared_properties()))
            .collect()
    }

    /// Inserts one record under the write lock.
    pub fn insert(&self, record: PolygonRecord) -> Result<()> {
        self.inner.write().insert(record)
    }

    /// Bulk-adds records under the write lock.
    pub fn load<I>(&self, records: I) -> Result<usize>
    where
        I: IntoIterator<Item = PolygonRecord>,
    {
        self.inner.write().load(records)
    }

    /// Rebuilds from `records` with the current configuration and swaps the
    /// result in. Readers keep using the old index until the swap.
    pub fn replace<I>(&self, records: I) -> Result<()>
    where
        I: IntoIterator<Item = PolygonRecord>,
    {
        let config = self.inner.read().config().clone();
        let rebuilt = PolygonIndex::build_with_config(records, config)?;
        self.swap(rebuilt);
        Ok(())
    }

    /// Swaps in a prebuilt index, returning the previous one.
    pub fn swap(&self, index: PolygonIndex) -> PolygonIndex {
        let previous = std::mem::replace(&mut *self.inner.write(), index);
        log::debug!("swapped polygon index ({} records)", previous.len());
        previous
    }

    pub fn stats(&self) -> IndexStats {
        self.inner.read().stats()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    /// Shared access to the wrapped index for multi-step reads.
    pub fn read(&self) -> RwLockReadGuard<'_, PolygonIndex> {
        self.inner.read()
    }

    /// Exclusive access to the wrapped index.
    pub fn write(&self) -> RwLockWriteGuard<'_, PolygonIndex> {
        self.inner.write()
    }
}
