//! Export command implementation

use anyhow::Result;
use chrono::Utc;
use tabled::Tabled;

use mapview_core::config::MapviewConfig;
use mapview_core::export::{ExportRequest, Exporter};
use mapview_core::models::BoundingBox;
use mapview_core::render::{plan_render, RenderOptions};

use crate::cli::ExportArgs;
use crate::output::OutputWriter;

#[derive(Tabled)]
struct KeptRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: &'static str,
}

pub fn execute(args: ExportArgs, config: &MapviewConfig, output: &OutputWriter) -> Result<()> {
    let classification = super::load_and_classify(&args.file)?;

    let rendered = plan_render(
        &classification.shapes,
        &RenderOptions::default(),
        config,
        Utc::now(),
    );

    let region = BoundingBox::new(args.min_x, args.min_y, args.width, args.height);
    let request = ExportRequest::new(region, args.name.as_deref().unwrap_or(""));

    let mut exporter = Exporter::new();
    let plan = exporter.begin(&request, &rendered.items)?;

    if output.is_json() {
        output.result(&plan)?;
        return Ok(());
    }

    output.section("Export Plan");
    output.kv("File", &plan.file_name);
    output.kv(
        "Region",
        format!(
            "({:.1}, {:.1}) {:.1} x {:.1}",
            plan.region.x, plan.region.y, plan.region.width, plan.region.height
        ),
    );
    output.kv(
        "Page",
        format!(
            "A4 landscape, image at ({}, {}) {} x {} mm",
            plan.page.x, plan.page.y, plan.page.width, plan.page.height
        ),
    );

    output.section("Clipped Shapes");
    let rows: Vec<KeptRow> = plan
        .kept
        .iter()
        .filter_map(|idx| rendered.items.get(*idx))
        .map(|item| KeptRow { name: item.name.clone(), category: item.category.label() })
        .collect();
    output.table(rows);

    if plan.kept.is_empty() {
        output.warning("No shapes intersect the requested region");
    } else {
        output.success(format!("{} shape(s) would be exported", plan.kept.len()));
    }

    Ok(())
}
