//! Geometric analysis passes.
//!
//! Three independent, stateless passes over a classified [`ShapeSet`]: narrow
//! road detection (paired-edge width), staleness (timestamp age), and
//! low-speed flagging. Each pass is a pure function of its inputs; `now` is
//! always injected rather than read from the wall clock, so every pass is
//! deterministic and independently testable. A shape may be flagged by more
//! than one pass; precedence between conflicting highlights is a rendering
//! policy, not decided here.

use chrono::{DateTime, Duration, Utc};
use geo::algorithm::centroid::Centroid;
use geo::{Distance, Euclidean, MultiPoint};

use crate::models::{Point, Shape, ShapeCategory, ShapeSet};

/// Categories the low-speed pass inspects.
pub const LOW_SPEED_CATEGORIES: [ShapeCategory; 4] = [
    ShapeCategory::Reference,
    ShapeCategory::Road,
    ShapeCategory::Load,
    ShapeCategory::Dump,
];

/// Meters per second to kilometers per hour.
pub fn mps_to_kph(mps: f64) -> f64 {
    mps * 3.6
}

/// The paired left/right edge points of a dual-edge road.
///
/// Pairs `points[i]` with `points[second_edge_start + i]` for `i` in
/// `[0, second_edge_start - 1)`. Pairs whose right point falls outside the
/// point list are skipped, not treated as zero-width. Shapes without a second
/// edge index, or with fewer than two points, yield nothing.
fn edge_pairs(shape: &Shape) -> impl Iterator<Item = (Point, Point)> + '_ {
    let split = match shape.second_edge_start {
        Some(split) if shape.points.len() > 1 => split,
        _ => 0,
    };

    (0..split.saturating_sub(1)).filter_map(move |i| {
        let left = shape.points.get(i)?;
        let right = shape.points.get(split + i)?;
        Some((*left, *right))
    })
}

fn pair_width(left: Point, right: Point) -> f64 {
    Euclidean.distance(geo::Point::from(left), geo::Point::from(right))
}

/// True when any paired edge distance is strictly below `threshold`.
///
/// This is an existence test: the scan stops at the first violating pair. Use
/// [`min_width`] when the actual minimum is needed for diagnostics.
pub fn is_narrow(shape: &Shape, threshold: f64) -> bool {
    edge_pairs(shape).any(|(left, right)| pair_width(left, right) < threshold)
}

/// The minimum paired edge width, across all resolvable pairs.
///
/// `None` when the shape has no resolvable pairs.
pub fn min_width(shape: &Shape) -> Option<f64> {
    edge_pairs(shape)
        .map(|(left, right)| pair_width(left, right))
        .fold(None, |acc, w| Some(acc.map_or(w, |m: f64| m.min(w))))
}

/// Road shapes flagged narrow against `threshold`.
pub fn narrow_roads<'a>(shapes: &'a ShapeSet, threshold: f64) -> Vec<&'a Shape> {
    shapes
        .get(ShapeCategory::Road)
        .iter()
        .filter(|shape| is_narrow(shape, threshold))
        .collect()
}

/// True when the shape's timestamp is strictly older than `max_age`.
///
/// Shapes without a timestamp are never stale.
pub fn is_stale(shape: &Shape, now: DateTime<Utc>, max_age: Duration) -> bool {
    match shape.utc_time {
        Some(time) => now - time > max_age,
        None => false,
    }
}

/// Reference shapes whose timestamp is older than `max_age`.
pub fn stale_references<'a>(
    shapes: &'a ShapeSet,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Vec<&'a Shape> {
    shapes
        .get(ShapeCategory::Reference)
        .iter()
        .filter(|shape| is_stale(shape, now, max_age))
        .collect()
}

/// True when the shape's speed limit converts to strictly under
/// `threshold_kph`.
///
/// A shape without a speed limit is never flagged; the global display default
/// is deliberately not substituted in this pass.
pub fn is_low_speed(shape: &Shape, threshold_kph: f64) -> bool {
    match shape.speed_limit_mps {
        Some(mps) => mps_to_kph(mps) < threshold_kph,
        None => false,
    }
}

/// Low-speed shapes across the reference, road, load, and dump categories.
pub fn low_speed_shapes<'a>(shapes: &'a ShapeSet, threshold_kph: f64) -> Vec<&'a Shape> {
    LOW_SPEED_CATEGORIES
        .iter()
        .flat_map(|category| shapes.get(*category))
        .filter(|shape| is_low_speed(shape, threshold_kph))
        .collect()
}

/// True when the shape was updated within `max_age` of `now` (inclusive).
pub fn is_recent(shape: &Shape, now: DateTime<Utc>, max_age: Duration) -> bool {
    match shape.utc_time {
        Some(time) => now - time <= max_age,
        None => false,
    }
}

/// Shapes in any category updated within `max_age` of `now`.
pub fn recent_shapes<'a>(
    shapes: &'a ShapeSet,
    now: DateTime<Utc>,
    max_age: Duration,
) -> Vec<&'a Shape> {
    shapes.shapes().filter(|shape| is_recent(shape, now, max_age)).collect()
}

/// Vertex centroid of a shape, `None` for empty geometry.
pub fn centroid(shape: &Shape) -> Option<Point> {
    let multi = MultiPoint::from(
        shape.points.iter().map(|p| geo::Point::from(*p)).collect::<Vec<_>>(),
    );
    multi.centroid().map(|c| Point::new(c.x(), c.y()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Shape;
    use chrono::TimeZone;

    fn road(points: Vec<Point>, split: usize) -> Shape {
        Shape::new(ShapeCategory::Road, "road")
            .with_points(points)
            .with_second_edge_start(split)
    }

    #[test]
    fn test_narrow_boundary_is_strict() {
        // Left edge [(0,0),(0,0)], right edge [(10,0),(10,0)]: width exactly 10.
        let at_threshold = road(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(10.0, 0.0),
                Point::new(10.0, 0.0),
            ],
            2,
        );
        assert!(!is_narrow(&at_threshold, 10.0));
        assert_eq!(min_width(&at_threshold), Some(10.0));

        let below = road(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 0.0),
                Point::new(9.0, 0.0),
                Point::new(9.0, 0.0),
            ],
            2,
        );
        assert!(is_narrow(&below, 10.0));
        assert_eq!(min_width(&below), Some(9.0));
    }

    #[test]
    fn test_no_second_edge_never_narrow() {
        let shape = Shape::new(ShapeCategory::Road, "r")
            .with_points(vec![Point::new(0.0, 0.0), Point::new(1.0, 0.0)]);
        assert!(!is_narrow(&shape, 10.0));
        assert!(min_width(&shape).is_none());
    }

    #[test]
    fn test_single_point_never_narrow() {
        let shape = road(vec![Point::new(0.0, 0.0)], 1);
        assert!(!is_narrow(&shape, 10.0));
    }

    #[test]
    fn test_out_of_range_pairs_skipped() {
        // split = 3 asks for right points at 3 and 4, only index 3 exists.
        let shape = road(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 5.0),
                Point::new(0.0, 10.0),
                Point::new(4.0, 0.0),
            ],
            3,
        );
        assert!(is_narrow(&shape, 10.0));
        assert_eq!(min_width(&shape), Some(4.0));
    }

    #[test]
    fn test_min_width_scans_all_pairs() {
        let shape = road(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 10.0),
                Point::new(0.0, 20.0),
                Point::new(50.0, 0.0),
                Point::new(3.0, 10.0),
                Point::new(50.0, 20.0),
            ],
            3,
        );
        assert_eq!(min_width(&shape), Some(3.0));
        assert!(is_narrow(&shape, 10.0));
    }

    #[test]
    fn test_narrow_roads_only_inspects_roads() {
        let mut shapes = ShapeSet::new();
        shapes.push(road(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ],
            2,
        ));
        let mut not_a_road = road(
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 1.0),
                Point::new(1.0, 0.0),
                Point::new(1.0, 1.0),
            ],
            2,
        );
        not_a_road.category = ShapeCategory::Reference;
        shapes.push(not_a_road);

        assert_eq!(narrow_roads(&shapes, 10.0).len(), 1);
    }

    #[test]
    fn test_staleness_boundary_is_exclusive() {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let max_age = Duration::hours(24);

        let stale = Shape::new(ShapeCategory::Reference, "old")
            .with_utc_time(now - Duration::hours(25));
        let fresh = Shape::new(ShapeCategory::Reference, "fresh")
            .with_utc_time(now - Duration::hours(23));
        let boundary = Shape::new(ShapeCategory::Reference, "edge")
            .with_utc_time(now - Duration::hours(24));
        let untimed = Shape::new(ShapeCategory::Reference, "untimed");

        assert!(is_stale(&stale, now, max_age));
        assert!(!is_stale(&fresh, now, max_age));
        assert!(!is_stale(&boundary, now, max_age));
        assert!(!is_stale(&untimed, now, max_age));
    }

    #[test]
    fn test_stale_references_ignores_other_categories() {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let mut shapes = ShapeSet::new();
        shapes.push(
            Shape::new(ShapeCategory::Reference, "old")
                .with_utc_time(now - Duration::hours(30)),
        );
        shapes.push(
            Shape::new(ShapeCategory::Road, "old road")
                .with_utc_time(now - Duration::hours(30)),
        );

        let stale = stale_references(&shapes, now, Duration::hours(24));
        assert_eq!(stale.len(), 1);
        assert_eq!(stale[0].name, "old");
    }

    #[test]
    fn test_low_speed_boundary_is_strict() {
        // 8.5 m/s = 30.6 kph, 8.611 m/s = 30.9996 kph (just under 31).
        let flagged = Shape::new(ShapeCategory::Road, "slow").with_speed_limit(8.5);
        assert!(is_low_speed(&flagged, 31.0));

        // Exactly 31 kph must not be flagged.
        let at_boundary =
            Shape::new(ShapeCategory::Road, "boundary").with_speed_limit(31.0 / 3.6);
        assert!(!is_low_speed(&at_boundary, 31.0));

        let unlimited = Shape::new(ShapeCategory::Road, "unset");
        assert!(!is_low_speed(&unlimited, 31.0));
    }

    #[test]
    fn test_low_speed_pass_categories() {
        let mut shapes = ShapeSet::new();
        for category in
            [ShapeCategory::Reference, ShapeCategory::Road, ShapeCategory::Load, ShapeCategory::Dump]
        {
            shapes.push(Shape::new(category, "slow").with_speed_limit(5.0));
        }
        // Slow, but not in a category this pass inspects.
        shapes.push(Shape::new(ShapeCategory::Obstacle, "slow obstacle").with_speed_limit(5.0));

        assert_eq!(low_speed_shapes(&shapes, 31.0).len(), 4);
    }

    #[test]
    fn test_recent_boundary_is_inclusive() {
        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        let max_age = Duration::hours(48);

        let at_boundary =
            Shape::new(ShapeCategory::Aoz, "edge").with_utc_time(now - Duration::hours(48));
        let older =
            Shape::new(ShapeCategory::Aoz, "older").with_utc_time(now - Duration::hours(49));

        assert!(is_recent(&at_boundary, now, max_age));
        assert!(!is_recent(&older, now, max_age));
    }

    #[test]
    fn test_centroid() {
        let shape = Shape::new(ShapeCategory::Load, "l").with_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ]);
        assert_eq!(centroid(&shape), Some(Point::new(5.0, 5.0)));

        let empty = Shape::new(ShapeCategory::Load, "empty");
        assert!(centroid(&empty).is_none());
    }
}
