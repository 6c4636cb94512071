use geo::{Coord, Rect};
use serde::{Deserialize, Serialize};

/// A 2D axis-aligned bounding box.
///
/// Coordinates are kept as raw fields rather than a `geo::Rect` so that the
/// empty box (min = +∞, max = −∞) can be represented. The empty box is the
/// identity element of [`BoundingBox::union`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Minimum x coordinate (longitude)
    pub min_x: f64,
    /// Minimum y coordinate (latitude)
    pub min_y: f64,
    /// Maximum x coordinate (longitude)
    pub max_x: f64,
    /// Maximum y coordinate (latitude)
    pub max_y: f64,
}

impl BoundingBox {
    /// Create a new bounding box from minimum and maximum coordinates.
    ///
    /// # Arguments
    ///
    /// * `min_x` - Minimum longitude/x coordinate
    /// * `min_y` - Minimum latitude/y coordinate
    /// * `max_x` - Maximum longitude/x coordinate
    /// * `max_y` - Maximum latitude/y coordinate
    ///
    /// # Examples
    ///
    /// ```
    /// use polylocate_types::bbox::BoundingBox;
    ///
    /// let bbox = BoundingBox::new(-74.0, 40.7, -73.9, 40.8);
    /// assert!(!bbox.is_empty());
    /// ```
    #[inline]
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// The empty box: every union with it returns the other operand.
    ///
    /// # Examples
    ///
    /// ```
    /// use polylocate_types::bbox::BoundingBox;
    ///
    /// let b = BoundingBox::new(1.0, 2.0, 3.0, 4.0);
    /// assert_eq!(BoundingBox::empty().union(&b), b);
    /// assert!(BoundingBox::empty().is_empty());
    /// ```
    #[inline]
    pub const fn empty() -> Self {
        Self::new(
            f64::INFINITY,
            f64::INFINITY,
            f64::NEG_INFINITY,
            f64::NEG_INFINITY,
        )
    }

    /// A degenerate box covering a single point.
    #[inline]
    pub const fn from_point(x: f64, y: f64) -> Self {
        Self::new(x, y, x, y)
    }

    /// Tight box around a sequence of coordinates, empty if there are none.
    pub fn from_coords<I>(coords: I) -> Self
    where
        I: IntoIterator<Item = Coord<f64>>,
    {
        coords.into_iter().fold(Self::empty(), |mut acc, c| {
            acc.min_x = acc.min_x.min(c.x);
            acc.min_y = acc.min_y.min(c.y);
            acc.max_x = acc.max_x.max(c.x);
            acc.max_y = acc.max_y.max(c.y);
            acc
        })
    }

    /// Returns true if the box encloses no point at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        !(self.min_x <= self.max_x && self.min_y <= self.max_y)
    }

    /// Get the width of the bounding box.
    #[inline]
    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    /// Get the height of the bounding box.
    #[inline]
    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    /// Smallest box covering both operands.
    #[inline]
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        let mut out = *self;
        out.extend(other);
        out
    }

    /// Grow this box in place so it also covers `other`.
    #[inline]
    pub fn extend(&mut self, other: &BoundingBox) {
        self.min_x = self.min_x.min(other.min_x);
        self.min_y = self.min_y.min(other.min_y);
        self.max_x = self.max_x.max(other.max_x);
        self.max_y = self.max_y.max(other.max_y);
    }

    #[inline]
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }

    /// Half perimeter: `width + height`.
    #[inline]
    pub fn margin(&self) -> f64 {
        self.width() + self.height()
    }

    /// Area of `self ∪ other`, computed without building the union.
    #[inline]
    pub fn enlarged_area(&self, other: &BoundingBox) -> f64 {
        (other.max_x.max(self.max_x) - other.min_x.min(self.min_x))
            * (other.max_y.max(self.max_y) - other.min_y.min(self.min_y))
    }

    /// Area shared by both boxes, zero when they are disjoint.
    #[inline]
    pub fn intersection_area(&self, other: &BoundingBox) -> f64 {
        let min_x = self.min_x.max(other.min_x);
        let min_y = self.min_y.max(other.min_y);
        let max_x = self.max_x.min(other.max_x);
        let max_y = self.max_y.min(other.max_y);

        (max_x - min_x).max(0.0) * (max_y - min_y).max(0.0)
    }

    /// Check if `other` lies fully inside this box (boundaries inclusive).
    #[inline]
    pub fn contains(&self, other: &BoundingBox) -> bool {
        self.min_x <= other.min_x
            && self.min_y <= other.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }

    /// Check if a point is contained within this bounding box.
    #[inline]
    pub fn contains_point(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    /// Check if this bounding box intersects with another. Touching edges count.
    #[inline]
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        other.min_x <= self.max_x
            && other.min_y <= self.max_y
            && other.max_x >= self.min_x
            && other.max_y >= self.min_y
    }

    /// Convert to a `geo::Rect`, or `None` for the empty box.
    pub fn to_rect(&self) -> Option<Rect<f64>> {
        if self.is_empty() {
            return None;
        }
        Some(Rect::new(
            geo::coord! { x: self.min_x, y: self.min_y },
            geo::coord! { x: self.max_x, y: self.max_y },
        ))
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Rect<f64>> for BoundingBox {
    fn from(rect: Rect<f64>) -> Self {
        Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y)
    }
}
