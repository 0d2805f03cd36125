//! Axis-aligned bounding boxes and framing paddings.

use geo::algorithm::bounding_rect::BoundingRect;
use geo::MultiPoint;
use serde::{Deserialize, Serialize};

use super::shape::Point;

/// Padding around the full document extent when framing the initial view.
pub const INITIAL_FRAME_PADDING: f64 = 1000.0;
/// Padding around a name-filtered subset when zooming to focus.
pub const FOCUS_FRAME_PADDING: f64 = 100.0;
/// Export regions are clipped exactly, with no padding.
pub const EXPORT_FRAME_PADDING: f64 = 0.0;

/// An axis-aligned rectangle in map coordinates.
///
/// Derived, never authoritative: recomputed whenever its input point set
/// changes. Width and height are always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Compute the padded bounds of a point set.
    ///
    /// Returns `None` for an empty set; callers must treat that as a no-op
    /// rather than an error.
    pub fn around(points: &[Point], padding: f64) -> Option<Self> {
        if points.is_empty() {
            return None;
        }

        let multi = MultiPoint::from(
            points.iter().map(|p| geo::Point::from(*p)).collect::<Vec<_>>(),
        );
        let rect = multi.bounding_rect()?;

        Some(Self {
            x: rect.min().x - padding,
            y: rect.min().y - padding,
            width: rect.width() + 2.0 * padding,
            height: rect.height() + 2.0 * padding,
        })
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    pub fn contains(&self, p: Point) -> bool {
        p.x >= self.x && p.x <= self.max_x() && p.y >= self.y && p.y <= self.max_y()
    }

    /// Two boxes intersect when they overlap in both x and y.
    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.x <= other.max_x()
            && self.max_x() >= other.x
            && self.y <= other.max_y()
            && self.max_y() >= other.y
    }
}
