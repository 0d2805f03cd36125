//! Render planning.
//!
//! The DOM/SVG layer is an external collaborator; this module produces the
//! exact data it needs to draw one frame: which polygons to draw, what
//! highlight each carries, the speed label text, the tooltip payload, and the
//! dashed focus rectangle when a name filter is active. Highlight precedence
//! between passes that flag the same shape is decided here, as rendering
//! policy, not in the analysis passes.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;

use crate::analysis;
use crate::config::MapviewConfig;
use crate::models::{
    BoundingBox, Point, Shape, ShapeCategory, ShapeSet, FOCUS_FRAME_PADDING,
};

/// Categories whose speed limit is labeled when the toggle is on.
pub const SPEED_LABEL_CATEGORIES: [ShapeCategory; 5] = [
    ShapeCategory::Road,
    ShapeCategory::Dump,
    ShapeCategory::Load,
    ShapeCategory::Reference,
    ShapeCategory::Drivable,
];

/// Per-category visibility toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryFilters([bool; 8]);

impl Default for CategoryFilters {
    fn default() -> Self {
        Self::all()
    }
}

impl CategoryFilters {
    pub fn all() -> Self {
        Self([true; 8])
    }

    pub fn none() -> Self {
        Self([false; 8])
    }

    pub fn set(mut self, category: ShapeCategory, enabled: bool) -> Self {
        let idx = ShapeCategory::ALL.iter().position(|c| *c == category).unwrap_or(0);
        self.0[idx] = enabled;
        self
    }

    pub fn enabled(&self, category: ShapeCategory) -> bool {
        let idx = ShapeCategory::ALL.iter().position(|c| *c == category).unwrap_or(0);
        self.0[idx]
    }
}

/// Everything the host's frame redraw depends on.
#[derive(Debug, Clone, Default)]
pub struct RenderOptions {
    pub filters: CategoryFilters,
    /// Substring match against shape names; `None` renders everything.
    pub name_filter: Option<String>,
    pub show_speed_limits: bool,
    pub highlight_narrow: bool,
    pub highlight_stale: bool,
    pub highlight_low_speed: bool,
    pub highlight_recent: bool,
}

impl RenderOptions {
    /// Interpret a raw host filter value, where `"None"` or an empty string
    /// means no filtering.
    pub fn with_raw_name_filter(mut self, raw: &str) -> Self {
        self.name_filter = match raw {
            "" | "None" => None,
            other => Some(other.to_string()),
        };
        self
    }
}

/// Overlay highlight for one polygon, highest precedence first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Highlight {
    Narrow,
    Stale,
    LowSpeed,
    Recent,
    None,
}

/// The speed text drawn at a shape's centroid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpeedLabel {
    pub text: String,
    pub at: Point,
    pub is_error: bool,
}

/// Hover payload for one polygon.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tooltip {
    pub category: &'static str,
    pub name: String,
    pub speed_text: String,
}

/// One polygon the host should draw.
#[derive(Debug, Clone, Serialize)]
pub struct PolygonItem {
    pub category: ShapeCategory,
    pub name: String,
    pub points: Vec<Point>,
    pub highlight: Highlight,
    pub speed_label: Option<SpeedLabel>,
    pub tooltip: Tooltip,
}

/// One planned frame.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderPlan {
    pub items: Vec<PolygonItem>,
    /// Dashed rectangle around the name-filtered subset, when one matched.
    pub focus_box: Option<BoundingBox>,
    /// Set when a name filter was active but matched nothing; the host should
    /// surface a warning and draw nothing further.
    pub unmatched_name_filter: bool,
    /// Shapes skipped for having no geometry after the fallback chain.
    pub skipped_empty: usize,
}

/// Plan one frame from the current shapes, options, and thresholds.
pub fn plan_render(
    shapes: &ShapeSet,
    options: &RenderOptions,
    config: &MapviewConfig,
    now: DateTime<Utc>,
) -> RenderPlan {
    let mut plan = RenderPlan::default();

    // Resolve the name-filtered focus region first; it restricts everything
    // else that gets drawn.
    if let Some(filter) = &options.name_filter {
        let matched: Vec<Point> = shapes
            .shapes()
            .filter(|shape| shape.name.contains(filter.as_str()))
            .flat_map(|shape| shape.points.iter().copied())
            .collect();

        match BoundingBox::around(&matched, FOCUS_FRAME_PADDING) {
            Some(focus) => plan.focus_box = Some(focus),
            None => {
                tracing::warn!("Name filter '{}' matched no shapes", filter);
                plan.unmatched_name_filter = true;
                return plan;
            }
        }
    }

    for (category, bucket) in shapes.iter() {
        if !options.filters.enabled(category) {
            continue;
        }

        for shape in bucket {
            if shape.points.is_empty() {
                tracing::warn!("Shape '{}' has no points, skipping", shape.name);
                plan.skipped_empty += 1;
                continue;
            }

            if let Some(focus) = &plan.focus_box {
                if !shape.points.iter().any(|p| focus.contains(*p)) {
                    continue;
                }
            }

            plan.items.push(plan_polygon(shape, options, config, now));
        }
    }

    plan
}

fn plan_polygon(
    shape: &Shape,
    options: &RenderOptions,
    config: &MapviewConfig,
    now: DateTime<Utc>,
) -> PolygonItem {
    let display_mps = shape.speed_limit_mps.unwrap_or(config.default_speed_mps.value);
    let kph = analysis::mps_to_kph(display_mps).round();
    let is_error = kph > config.error_display_kph.value;
    let speed_text = if is_error {
        "Error".to_string()
    } else {
        format!("{} kph", kph as i64)
    };

    let speed_label = if options.show_speed_limits
        && SPEED_LABEL_CATEGORIES.contains(&shape.category)
    {
        analysis::centroid(shape).map(|at| SpeedLabel {
            text: speed_text.clone(),
            at,
            is_error,
        })
    } else {
        None
    };

    PolygonItem {
        category: shape.category,
        name: shape.name.clone(),
        points: shape.points.clone(),
        highlight: highlight_for(shape, options, config, now),
        speed_label,
        tooltip: Tooltip {
            category: shape.category.label(),
            name: shape.name.clone(),
            speed_text,
        },
    }
}

/// Apply the highlight precedence order: narrow beats stale beats low-speed
/// beats recent.
fn highlight_for(
    shape: &Shape,
    options: &RenderOptions,
    config: &MapviewConfig,
    now: DateTime<Utc>,
) -> Highlight {
    if options.highlight_narrow
        && shape.category == ShapeCategory::Road
        && analysis::is_narrow(shape, config.narrow_threshold.value)
    {
        return Highlight::Narrow;
    }
    if options.highlight_stale
        && shape.category == ShapeCategory::Reference
        && analysis::is_stale(shape, now, Duration::hours(config.stale_max_age_hours.value))
    {
        return Highlight::Stale;
    }
    if options.highlight_low_speed
        && analysis::LOW_SPEED_CATEGORIES.contains(&shape.category)
        && analysis::is_low_speed(shape, config.low_speed_kph.value)
    {
        return Highlight::LowSpeed;
    }
    if options.highlight_recent
        && analysis::is_recent(shape, now, Duration::hours(config.recent_max_age_hours.value))
    {
        return Highlight::Recent;
    }
    Highlight::None
}
