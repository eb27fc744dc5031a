//! Logic command implementation

use super::{output, read};
use anyhow::Result;
use std::path::PathBuf;

use cqm_logic::{LogicExtractor, measure_logic_text};
use cqm_terminology::{ValueSetCatalog, extract_direct_reference_codes, normalize_measure};
use super::output::OutputFormat;

/// Configuration for logic command
pub struct LogicConfig {
    pub measure: PathBuf,
    pub value_sets: Option<PathBuf>,
    /// ELM libraries whose direct reference codes name inline-coded criteria
    pub elm: Vec<PathBuf>,
    pub format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
}

/// Render the population logic of a measure
///
/// Without an explicit format the logic is written as plain text.
pub fn run(config: LogicConfig) -> Result<()> {
    let mut measure = read::read_measure(&config.measure)?;
    let mut catalog = match &config.value_sets {
        Some(path) => read::read_value_sets(path)?,
        None => ValueSetCatalog::new(),
    };

    if !config.elm.is_empty() {
        let libraries = read::read_libraries(&config.elm)?;
        let drcs = extract_direct_reference_codes(&libraries);
        normalize_measure(&mut measure, &drcs);
        catalog = catalog.with_direct_reference_codes(&drcs);
    }

    let logic = LogicExtractor::new(&measure).with_value_sets(&catalog).measure_logic();

    let content = match config.format {
        None => measure_logic_text(&logic),
        Some(OutputFormat::Json) => output::format_json(&logic, false)?,
        Some(OutputFormat::JsonPretty) => output::format_json(&logic, true)?,
        Some(OutputFormat::Table) => output::logic_table(&logic),
    };

    output::write_output(&content, config.output_file.as_deref())
}
