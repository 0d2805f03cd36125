//! Serializable output structures for JSON mode

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct InspectOutput {
    pub file: String,
    pub total: usize,
    pub categories: Vec<CategoryCount>,
    pub skipped: Vec<SkippedShape>,
}

#[derive(Debug, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct SkippedShape {
    pub index: usize,
    pub reason: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeOutput {
    pub file: String,
    pub as_of: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub narrow_roads: Option<Vec<NarrowRoad>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stale_references: Option<Vec<TimedShape>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub low_speed_shapes: Option<Vec<LowSpeedShape>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recent_shapes: Option<Vec<TimedShape>>,
}

#[derive(Debug, Serialize)]
pub struct NarrowRoad {
    pub name: String,
    /// `None` when the road has no resolvable edge pairs.
    pub min_width: Option<f64>,
}

#[derive(Debug, Serialize)]
pub struct TimedShape {
    pub name: String,
    pub category: String,
    pub updated: String,
}

#[derive(Debug, Serialize)]
pub struct LowSpeedShape {
    pub name: String,
    pub category: String,
    pub speed_kph: f64,
}

#[derive(Debug, Serialize)]
pub struct FrameOutput {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name_filter: Option<String>,
    pub frame: RectOutput,
    pub view: RectOutput,
}

#[derive(Debug, Serialize)]
pub struct RectOutput {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}
