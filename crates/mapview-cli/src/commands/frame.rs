//! Frame command implementation

use anyhow::Result;

use mapview_core::models::{
    BoundingBox, Point, FOCUS_FRAME_PADDING, INITIAL_FRAME_PADDING,
};
use mapview_view::{Viewport, ViewportConfig};

use crate::cli::FrameArgs;
use crate::output::OutputWriter;
use crate::output_types::{FrameOutput, RectOutput};

pub fn execute(args: FrameArgs, output: &OutputWriter) -> Result<()> {
    let classification = super::load_and_classify(&args.file)?;
    let shapes = &classification.shapes;

    // A name filter frames only the matching subset, with the tighter padding
    // used for the dashed focus rectangle.
    let frame = match &args.name {
        Some(filter) => {
            let matched: Vec<Point> = shapes
                .shapes()
                .filter(|shape| shape.name.contains(filter.as_str()))
                .flat_map(|shape| shape.points.iter().copied())
                .collect();
            BoundingBox::around(&matched, FOCUS_FRAME_PADDING)
        }
        None => BoundingBox::around(&shapes.all_points(), INITIAL_FRAME_PADDING),
    };

    let Some(frame) = frame else {
        match &args.name {
            Some(filter) => output.warning(format!("Name filter '{}' matched no shapes", filter)),
            None => output.warning("Document contains no geometry to frame"),
        }
        return Ok(());
    };

    // The view the interactive host would open with, after zoom clamping.
    let mut viewport = Viewport::new(ViewportConfig::default());
    viewport.initialize(frame);
    let view = viewport.view();

    if output.is_json() {
        let json_output = FrameOutput {
            file: args.file.display().to_string(),
            name_filter: args.name.clone(),
            frame: RectOutput { x: frame.x, y: frame.y, width: frame.width, height: frame.height },
            view: RectOutput { x: view.x, y: view.y, width: view.width, height: view.height },
        };
        output.result(json_output)?;
        return Ok(());
    }

    output.section("Frame");
    output.kv("Origin", format!("({:.1}, {:.1})", frame.x, frame.y));
    output.kv("Size", format!("{:.1} x {:.1}", frame.width, frame.height));
    if let Some(filter) = &args.name {
        output.kv("Name Filter", filter);
    }

    output.section("Initial View");
    output.kv("Origin", format!("({:.1}, {:.1})", view.x, view.y));
    output.kv("Size", format!("{:.1} x {:.1}", view.width, view.height));

    Ok(())
}
