//! Canonical domain types used across all mapview crates.

pub mod geometry;
pub mod shape;

pub use geometry::{
    BoundingBox, EXPORT_FRAME_PADDING, FOCUS_FRAME_PADDING, INITIAL_FRAME_PADDING,
};
pub use shape::{Point, Shape, ShapeCategory, ShapeSet};
