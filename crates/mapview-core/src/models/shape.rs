//! Shape and shape-set types.
//!
//! These are the normalized records the rest of the system consumes. Raw
//! document records (with their legacy field locations) live in
//! [`crate::document`] and are resolved into these types exactly once, at
//! ingestion.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Substituted for a missing shape name at normalization time.
pub const UNNAMED: &str = "Unnamed";

/// A single map coordinate, in the export's planar coordinate system.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    #[serde(rename = "X")]
    pub x: f64,
    #[serde(rename = "Y")]
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

impl From<Point> for geo::Coord {
    fn from(p: Point) -> Self {
        geo::Coord { x: p.x, y: p.y }
    }
}

impl From<Point> for geo::Point {
    fn from(p: Point) -> Self {
        geo::Point::new(p.x, p.y)
    }
}

impl From<geo::Coord> for Point {
    fn from(c: geo::Coord) -> Self {
        Self { x: c.x, y: c.y }
    }
}

/// The closed set of map element categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShapeCategory {
    Aoz,
    Road,
    Reference,
    Obstacle,
    Station,
    Load,
    Dump,
    Drivable,
}

impl ShapeCategory {
    /// All categories, in bucket order.
    pub const ALL: [ShapeCategory; 8] = [
        ShapeCategory::Aoz,
        ShapeCategory::Road,
        ShapeCategory::Reference,
        ShapeCategory::Obstacle,
        ShapeCategory::Station,
        ShapeCategory::Load,
        ShapeCategory::Dump,
        ShapeCategory::Drivable,
    ];

    /// The discriminator marker for this category.
    ///
    /// Matching is substring containment against the raw `$type` value, which
    /// tolerates versioned and namespace-qualified discriminators. The markers
    /// are mutually exclusive by construction (`EdgeDumpShapeDto` is the full
    /// dump marker, so it cannot collide with the others).
    pub fn marker(&self) -> &'static str {
        match self {
            ShapeCategory::Aoz => "AozShapeDto",
            ShapeCategory::Road => "RoadShapeDto",
            ShapeCategory::Reference => "ReferenceShapeDto",
            ShapeCategory::Obstacle => "ObstacleShapeDto",
            ShapeCategory::Station => "StationShapeDto",
            ShapeCategory::Load => "LoadShapeDto",
            ShapeCategory::Dump => "EdgeDumpShapeDto",
            ShapeCategory::Drivable => "DrivableShapeDto_V1",
        }
    }

    /// Display label, matching the filter names the host UI uses.
    pub fn label(&self) -> &'static str {
        match self {
            ShapeCategory::Aoz => "AOZ",
            ShapeCategory::Road => "Road",
            ShapeCategory::Reference => "Reference",
            ShapeCategory::Obstacle => "Obstacle",
            ShapeCategory::Station => "Station",
            ShapeCategory::Load => "Load",
            ShapeCategory::Dump => "Dump",
            ShapeCategory::Drivable => "Drivable",
        }
    }

    fn bucket_index(&self) -> usize {
        ShapeCategory::ALL.iter().position(|c| c == self).unwrap_or(0)
    }
}

/// A normalized map element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub category: ShapeCategory,
    pub name: String,
    /// Polygon vertices, insertion order significant (winding).
    pub points: Vec<Point>,
    /// Speed limit in meters per second. Display-time defaulting is a
    /// presentation concern; analysis never substitutes a default.
    pub speed_limit_mps: Option<f64>,
    pub utc_time: Option<DateTime<Utc>>,
    /// For dual-edge roads: `points[0..idx)` is the left edge and
    /// `points[idx..idx + idx)` the positionally paired right edge.
    pub second_edge_start: Option<usize>,
}

impl Shape {
    pub fn new(category: ShapeCategory, name: impl Into<String>) -> Self {
        Self {
            category,
            name: name.into(),
            points: Vec::new(),
            speed_limit_mps: None,
            utc_time: None,
            second_edge_start: None,
        }
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = points;
        self
    }

    pub fn with_speed_limit(mut self, mps: f64) -> Self {
        self.speed_limit_mps = Some(mps);
        self
    }

    pub fn with_utc_time(mut self, time: DateTime<Utc>) -> Self {
        self.utc_time = Some(time);
        self
    }

    pub fn with_second_edge_start(mut self, idx: usize) -> Self {
        self.second_edge_start = Some(idx);
        self
    }
}

/// The classified collection of all shapes in one loaded document.
///
/// All eight category buckets are always present (possibly empty), and each
/// bucket preserves the order shapes appeared in the source document. A
/// `ShapeSet` is replaced wholesale on each new upload, never partially
/// mutated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShapeSet {
    buckets: [Vec<Shape>; 8],
}

impl ShapeSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, shape: Shape) {
        self.buckets[shape.category.bucket_index()].push(shape);
    }

    pub fn get(&self, category: ShapeCategory) -> &[Shape] {
        &self.buckets[category.bucket_index()]
    }

    /// Iterate buckets in category order.
    pub fn iter(&self) -> impl Iterator<Item = (ShapeCategory, &[Shape])> {
        ShapeCategory::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    /// Iterate all shapes across buckets, in category then insertion order.
    pub fn shapes(&self) -> impl Iterator<Item = &Shape> {
        self.buckets.iter().flatten()
    }

    /// Total shape count across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.iter().all(Vec::is_empty)
    }

    /// Empty every bucket, for the explicit clear action.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear();
        }
    }

    /// Flatten the points of every shape, in bucket then insertion order.
    pub fn all_points(&self) -> Vec<Point> {
        self.shapes().flat_map(|s| s.points.iter().copied()).collect()
    }
}
