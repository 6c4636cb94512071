//! Geometry and property types attached to indexed polygons.
//!
//! Points and polygons are the `geo` crate's own types so that callers can
//! feed geometry produced by any `geo`-based pipeline straight into the index.

use std::collections::BTreeMap;
use std::sync::Arc;

pub use ::geo::{Coord, LineString, Point, Polygon};

use crate::bbox::BoundingBox;

/// String properties attached to an indexed polygon.
///
/// Ordered so that serialized output is deterministic.
pub type Properties = BTreeMap<String, String>;

/// Properties shared between the parts of one multi-part feature.
pub type SharedProperties = Arc<Properties>;

/// Build a polygon from raw rings: ring 0 is the exterior, the rest are holes.
///
/// Rings do not need to repeat their first point; `geo` closes them.
///
/// # Examples
///
/// ```
/// use polylocate_types::geo::polygon_from_rings;
///
/// let square = polygon_from_rings(vec![vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0)]]);
/// assert_eq!(square.exterior().0.len(), 5);
/// assert!(square.interiors().is_empty());
/// ```
pub fn polygon_from_rings(rings: Vec<Vec<(f64, f64)>>) -> Polygon<f64> {
    let mut rings = rings.into_iter().map(LineString::from);
    let exterior = rings.next().unwrap_or_else(|| LineString::new(Vec::new()));
    Polygon::new(exterior, rings.collect())
}

/// Bounding box of the exterior ring. Holes always lie inside the exterior.
pub fn exterior_bbox(polygon: &Polygon<f64>) -> BoundingBox {
    BoundingBox::from_coords(polygon.exterior().coords().copied())
}

/// Iterate over the exterior ring followed by every hole.
pub fn rings(polygon: &Polygon<f64>) -> impl Iterator<Item = &LineString<f64>> {
    std::iter::once(polygon.exterior()).chain(polygon.interiors())
}

/// Collect `(key, value)` pairs into a [`Properties`] map.
pub fn properties<K, V, I>(pairs: I) -> Properties
where
    K: Into<String>,
    V: Into<String>,
    I: IntoIterator<Item = (K, V)>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}
