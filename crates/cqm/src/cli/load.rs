//! Load command implementation

use super::{output, read};
use anyhow::{Context, Result};
use std::path::PathBuf;

use crate::pipeline::MeasureLoader;
use super::output::OutputFormat;

/// Configuration for load command
pub struct LoadConfig {
    pub elm: Vec<PathBuf>,
    pub main: String,
    pub measure: Option<PathBuf>,
    pub value_sets: Option<PathBuf>,
    pub components: Vec<PathBuf>,
    pub verbose: bool,
    pub format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
}

/// Run the whole measure loading pipeline and write every derived artifact
pub fn run(config: LoadConfig) -> Result<()> {
    let libraries = read::read_libraries(&config.elm)?;
    let components = config
        .components
        .iter()
        .map(|path| read::read_component(path))
        .collect::<Result<Vec<_>>>()?;

    let mut loader = MeasureLoader::new(config.main.as_str(), libraries).with_components(components);
    if let Some(path) = &config.measure {
        loader = loader.with_measure(read::read_measure(path)?);
    }
    if let Some(path) = &config.value_sets {
        loader = loader.with_value_sets(read::read_value_sets(path)?);
    }

    let loaded = loader
        .load()
        .with_context(|| format!("Failed to load measure with main library {}", config.main))?;
    output::report_diagnostics(&loaded.warnings, config.verbose);

    let content = match config.format.unwrap_or(OutputFormat::JsonPretty) {
        OutputFormat::Json => output::format_json(&loaded, false)?,
        OutputFormat::JsonPretty => output::format_json(&loaded, true)?,
        OutputFormat::Table => {
            let mut table = output::dependency_table(&loaded.dependencies);
            if !loaded.measure_logic.is_empty() {
                table.push_str("\n\n");
                table.push_str(&output::logic_table(&loaded.measure_logic));
            }
            table
        }
    };

    output::write_output(&content, config.output_file.as_deref())
}
