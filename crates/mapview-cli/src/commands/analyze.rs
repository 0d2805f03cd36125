//! Analyze command implementation

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use tabled::Tabled;

use mapview_core::analysis;
use mapview_core::config::MapviewConfig;
use mapview_core::models::Shape;

use crate::cli::AnalyzeArgs;
use crate::output::OutputWriter;
use crate::output_types::{AnalyzeOutput, LowSpeedShape, NarrowRoad, TimedShape};

#[derive(Tabled)]
struct NarrowRow {
    #[tabled(rename = "Road")]
    name: String,
    #[tabled(rename = "Min Width")]
    min_width: String,
}

#[derive(Tabled)]
struct TimedRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Updated")]
    updated: String,
}

#[derive(Tabled)]
struct LowSpeedRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Speed (kph)")]
    speed_kph: String,
}

fn format_time(shape: &Shape) -> String {
    match shape.utc_time {
        Some(time) => time.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "-".to_string(),
    }
}

fn timed(shape: &Shape) -> TimedShape {
    TimedShape {
        name: shape.name.clone(),
        category: shape.category.label().to_string(),
        updated: format_time(shape),
    }
}

pub fn execute(args: AnalyzeArgs, config: &MapviewConfig, output: &OutputWriter) -> Result<()> {
    let classification = super::load_and_classify(&args.file)?;
    let shapes = &classification.shapes;

    let now: DateTime<Utc> = match &args.as_of {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --as-of timestamp '{}'", raw))?
            .with_timezone(&Utc),
        None => Utc::now(),
    };

    // No flags means every pass.
    let run_all = !(args.narrow || args.stale || args.low_speed || args.recent);

    let narrow = (run_all || args.narrow)
        .then(|| analysis::narrow_roads(shapes, config.narrow_threshold.value));
    let stale = (run_all || args.stale).then(|| {
        analysis::stale_references(shapes, now, Duration::hours(config.stale_max_age_hours.value))
    });
    let low_speed = (run_all || args.low_speed)
        .then(|| analysis::low_speed_shapes(shapes, config.low_speed_kph.value));
    let recent = (run_all || args.recent).then(|| {
        analysis::recent_shapes(shapes, now, Duration::hours(config.recent_max_age_hours.value))
    });

    if output.is_json() {
        let json_output = AnalyzeOutput {
            file: args.file.display().to_string(),
            as_of: now.to_rfc3339(),
            narrow_roads: narrow.map(|roads| {
                roads
                    .iter()
                    .map(|shape| NarrowRoad {
                        name: shape.name.clone(),
                        min_width: analysis::min_width(shape),
                    })
                    .collect()
            }),
            stale_references: stale.map(|refs| refs.iter().map(|s| timed(s)).collect()),
            low_speed_shapes: low_speed.map(|flagged| {
                flagged
                    .iter()
                    .map(|shape| LowSpeedShape {
                        name: shape.name.clone(),
                        category: shape.category.label().to_string(),
                        speed_kph: analysis::mps_to_kph(shape.speed_limit_mps.unwrap_or(0.0)),
                    })
                    .collect()
            }),
            recent_shapes: recent.map(|updated| updated.iter().map(|s| timed(s)).collect()),
        };
        output.result(json_output)?;
        return Ok(());
    }

    if let Some(roads) = narrow {
        output.section(format!("Narrow Roads (< {} units)", config.narrow_threshold.value));
        let rows: Vec<NarrowRow> = roads
            .iter()
            .map(|shape| NarrowRow {
                name: shape.name.clone(),
                min_width: match analysis::min_width(shape) {
                    Some(width) => format!("{:.1}", width),
                    None => "-".to_string(),
                },
            })
            .collect();
        output.table(rows);
    }

    if let Some(refs) = stale {
        output.section(format!("Stale References (> {}h)", config.stale_max_age_hours.value));
        let rows: Vec<TimedRow> = refs
            .iter()
            .map(|shape| TimedRow {
                name: shape.name.clone(),
                category: shape.category.label(),
                updated: format_time(shape),
            })
            .collect();
        output.table(rows);
    }

    if let Some(flagged) = low_speed {
        output.section(format!("Low-Speed Shapes (< {} kph)", config.low_speed_kph.value));
        let rows: Vec<LowSpeedRow> = flagged
            .iter()
            .map(|shape| LowSpeedRow {
                name: shape.name.clone(),
                category: shape.category.label(),
                speed_kph: format!(
                    "{:.1}",
                    analysis::mps_to_kph(shape.speed_limit_mps.unwrap_or(0.0))
                ),
            })
            .collect();
        output.table(rows);
    }

    if let Some(updated) = recent {
        output.section(format!("Recent Updates (<= {}h)", config.recent_max_age_hours.value));
        let rows: Vec<TimedRow> = updated
            .iter()
            .map(|shape| TimedRow {
                name: shape.name.clone(),
                category: shape.category.label(),
                updated: format_time(shape),
            })
            .collect();
        output.table(rows);
    }

    Ok(())
}
