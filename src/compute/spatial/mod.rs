//! Spatial indexing primitives.

pub mod pip;
pub mod rtree;
pub mod select;

pub use pip::polygon_contains;
pub use rtree::{Entry, Node, RTree, TreeShape};
