//! Point-in-polygon test by ray casting (even-odd rule).
//!
//! A horizontal ray is cast from the query point towards +x and every ring
//! edge it crosses flips the inside/outside parity. All rings of a polygon
//! share one parity, so a point inside a hole crosses the hole's boundary
//! once more and ends up outside.
//!
//! Points lying exactly on an edge or vertex may be classified either way.

use polylocate_types::geo::{Coord, Point, Polygon, rings};

/// Returns true if the ray from `p` towards +x crosses the edge from `a` to `b`.
///
/// Exactly one endpoint must lie strictly above `p`, which makes the test
/// well defined when the ray passes through a shared vertex.
#[inline]
fn ray_crosses(p: Coord<f64>, a: Coord<f64>, b: Coord<f64>) -> bool {
    (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x
}

/// Even-odd membership of `point` in `polygon`, holes included.
///
/// # Examples
///
/// ```
/// use polylocate::compute::spatial::pip::polygon_contains;
/// use polylocate::{Point, polygon_from_rings};
///
/// let square = polygon_from_rings(vec![
///     vec![(0.0, 0.0), (0.0, 10.0), (10.0, 10.0), (10.0, 0.0), (0.0, 0.0)],
///     vec![(3.0, 3.0), (3.0, 7.0), (7.0, 7.0), (7.0, 3.0), (3.0, 3.0)],
/// ]);
///
/// assert!(polygon_contains(&square, &Point::new(1.0, 1.0)));
/// assert!(!polygon_contains(&square, &Point::new(5.0, 5.0)));
/// assert!(!polygon_contains(&square, &Point::new(15.0, 5.0)));
/// ```
pub fn polygon_contains(polygon: &Polygon<f64>, point: &Point<f64>) -> bool {
    let p = point.0;
    let mut inside = false;

    for ring in rings(polygon) {
        let coords = &ring.0;
        let Some(&last) = coords.last() else {
            continue;
        };

        let mut prev = last;
        for &current in coords {
            if ray_crosses(p, current, prev) {
                inside = !inside;
            }
            prev = current;
        }
    }
    inside
}
