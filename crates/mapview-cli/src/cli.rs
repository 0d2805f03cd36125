use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Mapview - viewer tooling for autonomous-operations map exports
#[derive(Parser, Debug)]
#[command(name = "mapview")]
#[command(about = "Inspect and analyze planning-tool map exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Output results in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Path to a mapview.toml overriding the default thresholds
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Classify a document and report per-category counts
    Inspect(InspectArgs),

    /// Run the analysis passes over a document
    Analyze(AnalyzeArgs),

    /// Print the view framing for a document or a name-filtered subset
    Frame(FrameArgs),

    /// Plan a clipped PDF export of a map region
    Export(ExportArgs),
}

#[derive(Parser, Debug)]
pub struct InspectArgs {
    /// Path to the exported map JSON
    pub file: PathBuf,
}

#[derive(Parser, Debug)]
pub struct AnalyzeArgs {
    /// Path to the exported map JSON
    pub file: PathBuf,

    /// Flag dual-edge roads narrower than the configured threshold
    #[arg(long)]
    pub narrow: bool,

    /// Flag reference shapes older than the configured maximum age
    #[arg(long)]
    pub stale: bool,

    /// Flag shapes with speed limits under the configured threshold
    #[arg(long)]
    pub low_speed: bool,

    /// Flag shapes updated within the configured recent window
    #[arg(long)]
    pub recent: bool,

    /// Evaluate time-based passes as of this RFC 3339 instant (default: now)
    #[arg(long, value_name = "TIMESTAMP")]
    pub as_of: Option<String>,
}

#[derive(Parser, Debug)]
pub struct FrameArgs {
    /// Path to the exported map JSON
    pub file: PathBuf,

    /// Frame only shapes whose name contains this substring
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Parser, Debug)]
pub struct ExportArgs {
    /// Path to the exported map JSON
    pub file: PathBuf,

    /// Region origin x, in map units
    #[arg(long)]
    pub min_x: f64,

    /// Region origin y, in map units
    #[arg(long)]
    pub min_y: f64,

    /// Region width, in map units
    #[arg(long)]
    pub width: f64,

    /// Region height, in map units
    #[arg(long)]
    pub height: f64,

    /// Label used to derive the output file name
    #[arg(long)]
    pub name: Option<String>,
}
