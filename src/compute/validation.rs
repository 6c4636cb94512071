//! Validation for indexed polygon geometry.

use crate::error::{LocateError, Result};
use polylocate_types::geo::{Coord, LineString, Point, Polygon};

/// Minimum number of distinct vertices a ring needs to enclose an area.
pub const MIN_RING_POINTS: usize = 3;

/// Validates that a coordinate has finite components.
///
/// # Examples
///
/// ```
/// use polylocate::compute::validation::validate_point;
/// use polylocate::Point;
///
/// assert!(validate_point(&Point::new(2.35, 48.85)).is_ok());
/// assert!(validate_point(&Point::new(f64::NAN, 48.85)).is_err());
/// ```
pub fn validate_point(point: &Point<f64>) -> Result<()> {
    validate_coord(&point.0)
}

fn validate_coord(coord: &Coord<f64>) -> Result<()> {
    if !coord.x.is_finite() {
        return Err(LocateError::InvalidGeometry(format!(
            "x must be finite, got: {}",
            coord.x
        )));
    }

    if !coord.y.is_finite() {
        return Err(LocateError::InvalidGeometry(format!(
            "y must be finite, got: {}",
            coord.y
        )));
    }

    Ok(())
}

/// Number of distinct vertices in a ring. The closing repeat is not counted.
fn distinct_points(ring: &LineString<f64>) -> usize {
    let mut coords: Vec<(f64, f64)> = ring.coords().map(|c| (c.x, c.y)).collect();
    coords.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.total_cmp(&b.1)));
    coords.dedup();
    coords.len()
}

/// Validates a single ring: finite coordinates and at least three distinct points.
pub fn validate_ring(ring: &LineString<f64>) -> Result<()> {
    for (idx, coord) in ring.coords().enumerate() {
        validate_coord(coord).map_err(|e| {
            LocateError::InvalidGeometry(format!("point at index {}: {}", idx, e))
        })?;
    }

    let distinct = distinct_points(ring);
    if distinct < MIN_RING_POINTS {
        return Err(LocateError::InvalidGeometry(format!(
            "ring needs at least {} distinct points, got {}",
            MIN_RING_POINTS, distinct
        )));
    }

    Ok(())
}

/// Validates all polygon rings (exterior and holes).
///
/// # Examples
///
/// ```
/// use polylocate::compute::validation::validate_polygon;
/// use polylocate::polygon_from_rings;
///
/// let poly = polygon_from_rings(vec![vec![(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]]);
/// assert!(validate_polygon(&poly).is_ok());
///
/// let sliver = polygon_from_rings(vec![vec![(0.0, 0.0), (10.0, 0.0), (0.0, 0.0)]]);
/// assert!(validate_polygon(&sliver).is_err());
/// ```
pub fn validate_polygon(polygon: &Polygon<f64>) -> Result<()> {
    if polygon.exterior().0.is_empty() {
        return Err(LocateError::InvalidGeometry(
            "exterior ring is empty".to_string(),
        ));
    }

    validate_ring(polygon.exterior())
        .map_err(|e| LocateError::InvalidGeometry(format!("exterior ring: {}", e)))?;

    for (ring_idx, interior) in polygon.interiors().iter().enumerate() {
        validate_ring(interior).map_err(|e| {
            LocateError::InvalidGeometry(format!("interior ring {}: {}", ring_idx, e))
        })?;
    }

    Ok(())
}
