//! # polylocate-types
//!
//! Geometric value types shared by the `polylocate` index.
//!
//! - **Bounding boxes**: [`bbox::BoundingBox`], the rectangle arithmetic the R-tree runs on
//! - **Geometry**: [`geo::Point`] and [`geo::Polygon`], re-exported from the `geo` crate
//! - **Properties**: [`geo::Properties`], the string map attached to every indexed polygon
//!
//! ## Examples
//!
//! ```rust
//! use polylocate_types::bbox::BoundingBox;
//!
//! let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
//! let b = BoundingBox::new(5.0, 5.0, 15.0, 15.0);
//!
//! assert!(a.intersects(&b));
//! assert_eq!(a.intersection_area(&b), 25.0);
//! assert_eq!(a.union(&b), BoundingBox::new(0.0, 0.0, 15.0, 15.0));
//! ```

pub mod bbox;
pub mod geo;
