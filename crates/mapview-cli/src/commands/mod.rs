//! Command implementations

mod analyze;
mod export;
mod frame;
mod inspect;

use std::fs::File;
use std::path::Path;

use anyhow::{Context, Result};
use mapview_core::classify::{classify, Classification};
use mapview_core::config::MapviewConfig;
use mapview_core::document::MapDocument;

use crate::cli::{Cli, Commands};
use crate::output::OutputWriter;

/// Execute a CLI command
pub fn execute(cli: Cli) -> Result<()> {
    let output = OutputWriter::new(cli.json);
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Inspect(args) => inspect::execute(args, &output),
        Commands::Analyze(args) => analyze::execute(args, &config, &output),
        Commands::Frame(args) => frame::execute(args, &output),
        Commands::Export(args) => export::execute(args, &config, &output),
    }
}

/// Defaults, then the optional TOML file, then `MAPVIEW_*` variables.
fn load_config(path: Option<&Path>) -> Result<MapviewConfig> {
    let config = MapviewConfig::with_defaults();
    let config = match path {
        Some(path) => {
            tracing::debug!("Loading config overrides from {}", path.display());
            config
                .load_from_file(path)
                .with_context(|| format!("Failed to load config from {}", path.display()))?
        }
        None => config,
    };
    Ok(config.load_from_env())
}

/// Open, parse, and classify a map document.
fn load_and_classify(path: &Path) -> Result<Classification> {
    let file =
        File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let document = MapDocument::from_reader(file)
        .with_context(|| format!("Failed to parse {}", path.display()))?;
    tracing::debug!("Parsed {} record(s) from {}", document.len(), path.display());
    Ok(classify(&document))
}
