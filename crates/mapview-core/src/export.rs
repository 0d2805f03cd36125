//! Clipped export planning.
//!
//! PDF rasterization and page writing are external collaborators; the core
//! decides what they receive: the output file name, the fixed page placement,
//! and which planned polygons survive clipping to the requested region.
//! Exports are exclusive per invocation: a second request while one is
//! pending is rejected rather than interleaved, since both would read the
//! same live canvas.

use serde::Serialize;

use crate::error::{MapviewError, Result};
use crate::models::{BoundingBox, EXPORT_FRAME_PADDING};
use crate::render::PolygonItem;

/// File name used when no label is supplied.
pub const DEFAULT_EXPORT_NAME: &str = "AOZ_Export.pdf";

/// Image placement on an A4 landscape page, in millimeters.
pub const A4_LANDSCAPE_PLACEMENT: PagePlacement =
    PagePlacement { x: 10.0, y: 10.0, width: 277.0, height: 190.0 };

/// Where the rendered image lands on the output page.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PagePlacement {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A user-initiated export of one map region.
#[derive(Debug, Clone)]
pub struct ExportRequest {
    pub region: BoundingBox,
    /// Usually the active name filter; `None` maps to the default file name.
    pub label: Option<String>,
}

impl ExportRequest {
    /// Interpret a raw host label, where `"None"` or empty means unlabeled.
    pub fn new(region: BoundingBox, raw_label: &str) -> Self {
        let label = match raw_label {
            "" | "None" => None,
            other => Some(other.to_string()),
        };
        Self { region, label }
    }

    pub fn file_name(&self) -> String {
        match &self.label {
            None => DEFAULT_EXPORT_NAME.to_string(),
            Some(label) => format!("{}_Export.pdf", label),
        }
    }
}

/// Everything the PDF collaborator needs for one export.
#[derive(Debug, Clone, Serialize)]
pub struct ExportPlan {
    pub file_name: String,
    pub region: BoundingBox,
    pub page: PagePlacement,
    /// Indices into the source render plan's items that survive clipping.
    pub kept: Vec<usize>,
}

/// Serializes export requests: at most one in flight at a time.
#[derive(Debug, Default)]
pub struct Exporter {
    in_flight: bool,
}

impl Exporter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    /// Start an export, clipping `items` to the requested region.
    ///
    /// Fails with [`MapviewError::ExportBusy`] while another export is
    /// pending. An item is kept when its own bounds intersect the region.
    pub fn begin(&mut self, request: &ExportRequest, items: &[PolygonItem]) -> Result<ExportPlan> {
        if self.in_flight {
            return Err(MapviewError::ExportBusy);
        }
        self.in_flight = true;

        let kept = items
            .iter()
            .enumerate()
            .filter_map(|(idx, item)| {
                let bbox = BoundingBox::around(&item.points, EXPORT_FRAME_PADDING)?;
                bbox.intersects(&request.region).then_some(idx)
            })
            .collect();

        Ok(ExportPlan {
            file_name: request.file_name(),
            region: request.region,
            page: A4_LANDSCAPE_PLACEMENT,
            kept,
        })
    }

    /// Mark the pending export finished.
    pub fn complete(&mut self) {
        self.in_flight = false;
    }

    /// Mark the pending export failed at the image-decode step.
    ///
    /// Decode failures are observable errors, never an indefinite hang.
    pub fn fail_decode(&mut self, reason: impl Into<String>) -> MapviewError {
        self.in_flight = false;
        MapviewError::ExportDecode { reason: reason.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MapviewConfig;
    use crate::models::{Point, Shape, ShapeCategory, ShapeSet};
    use crate::render::{plan_render, RenderOptions};
    use chrono::{TimeZone, Utc};

    fn items() -> Vec<PolygonItem> {
        let mut shapes = ShapeSet::new();
        shapes.push(Shape::new(ShapeCategory::Road, "inside").with_points(vec![
            Point::new(0.0, 0.0),
            Point::new(10.0, 0.0),
            Point::new(10.0, 10.0),
        ]));
        shapes.push(Shape::new(ShapeCategory::Road, "outside").with_points(vec![
            Point::new(500.0, 500.0),
            Point::new(510.0, 500.0),
            Point::new(510.0, 510.0),
        ]));

        let now = Utc.with_ymd_and_hms(2025, 6, 2, 12, 0, 0).unwrap();
        plan_render(&shapes, &RenderOptions::default(), &MapviewConfig::with_defaults(), now)
            .items
    }

    #[test]
    fn test_file_name_rules() {
        let region = BoundingBox::new(0.0, 0.0, 100.0, 100.0);
        assert_eq!(ExportRequest::new(region, "None").file_name(), "AOZ_Export.pdf");
        assert_eq!(ExportRequest::new(region, "").file_name(), "AOZ_Export.pdf");
        assert_eq!(ExportRequest::new(region, "Haul").file_name(), "Haul_Export.pdf");
    }

    #[test]
    fn test_clipping_keeps_intersecting_items() {
        let request = ExportRequest::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), "None");
        let mut exporter = Exporter::new();

        let plan = exporter.begin(&request, &items()).unwrap();
        assert_eq!(plan.kept, vec![0]);
        assert_eq!(plan.page, A4_LANDSCAPE_PLACEMENT);
    }

    #[test]
    fn test_second_export_rejected_while_pending() {
        let request = ExportRequest::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), "None");
        let mut exporter = Exporter::new();

        exporter.begin(&request, &items()).unwrap();
        let err = exporter.begin(&request, &items()).unwrap_err();
        assert!(matches!(err, MapviewError::ExportBusy));

        exporter.complete();
        assert!(exporter.begin(&request, &items()).is_ok());
    }

    #[test]
    fn test_decode_failure_releases_exporter() {
        let request = ExportRequest::new(BoundingBox::new(0.0, 0.0, 100.0, 100.0), "None");
        let mut exporter = Exporter::new();

        exporter.begin(&request, &items()).unwrap();
        let err = exporter.fail_decode("bad image data");
        assert!(matches!(err, MapviewError::ExportDecode { .. }));
        assert!(!exporter.is_busy());
    }
}
