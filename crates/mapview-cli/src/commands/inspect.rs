//! Inspect command implementation

use anyhow::Result;
use tabled::Tabled;

use mapview_core::classify::SkipReason;
use mapview_core::models::ShapeCategory;

use crate::cli::InspectArgs;
use crate::output::OutputWriter;
use crate::output_types::{CategoryCount, InspectOutput, SkippedShape};

#[derive(Tabled)]
struct CategoryRow {
    #[tabled(rename = "Category")]
    category: &'static str,
    #[tabled(rename = "Count")]
    count: usize,
}

#[derive(Tabled)]
struct SkippedRow {
    #[tabled(rename = "Index")]
    index: usize,
    #[tabled(rename = "Reason")]
    reason: String,
}

fn describe_skip(reason: &SkipReason) -> String {
    match reason {
        SkipReason::MalformedRecord(e) => format!("undecodable record: {}", e),
        SkipReason::MissingDiscriminator => "missing '$type'".to_string(),
        SkipReason::UnknownDiscriminator(d) => format!("unknown type '{}'", d),
    }
}

pub fn execute(args: InspectArgs, output: &OutputWriter) -> Result<()> {
    let classification = super::load_and_classify(&args.file)?;

    if output.is_json() {
        let json_output = InspectOutput {
            file: args.file.display().to_string(),
            total: classification.total(),
            categories: ShapeCategory::ALL
                .iter()
                .map(|c| CategoryCount {
                    category: c.label().to_string(),
                    count: classification.shapes.get(*c).len(),
                })
                .collect(),
            skipped: classification
                .skipped
                .iter()
                .map(|s| SkippedShape { index: s.index, reason: describe_skip(&s.reason) })
                .collect(),
        };
        output.result(json_output)?;
        return Ok(());
    }

    output.section("Document");
    output.kv("File", args.file.display());
    output.kv("Records", classification.total());
    output.kv("Classified", classification.shapes.len());

    output.section("Categories");
    let rows: Vec<CategoryRow> = ShapeCategory::ALL
        .iter()
        .map(|c| CategoryRow { category: c.label(), count: classification.shapes.get(*c).len() })
        .collect();
    output.table(rows);

    if !classification.skipped.is_empty() {
        output.section("Skipped Records");
        let rows: Vec<SkippedRow> = classification
            .skipped
            .iter()
            .map(|s| SkippedRow { index: s.index, reason: describe_skip(&s.reason) })
            .collect();
        output.table(rows);
        output.warning(format!("{} record(s) could not be classified", classification.skipped.len()));
    } else {
        output.success("All records classified");
    }

    Ok(())
}
