//! Diff command implementation

use super::{output, read};
use anyhow::Result;
use std::path::{Path, PathBuf};

use cqm_logic::{LogicExtractor, MeasureLogic, diff_measure_logic};
use cqm_terminology::ValueSetCatalog;
use super::output::OutputFormat;

/// Configuration for diff command
pub struct DiffConfig {
    pub current: PathBuf,
    pub other: PathBuf,
    pub by_population: bool,
    /// Inputs are rendered logic documents instead of HQMF measures
    pub logic_json: bool,
    pub value_sets: Option<PathBuf>,
    pub format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
}

/// Diff the logic of two versions of a measure
pub fn run(config: DiffConfig) -> Result<()> {
    let catalog = match &config.value_sets {
        Some(path) => read::read_value_sets(path)?,
        None => ValueSetCatalog::new(),
    };

    let (cms_id, current) = load_logic(&config.current, config.logic_json, &catalog)?;
    let (_, other) = load_logic(&config.other, config.logic_json, &catalog)?;

    let diff = diff_measure_logic(cms_id, &current, &other, config.by_population);
    if diff.totals.insertions + diff.totals.deletions == 0 {
        tracing::info!("Measure logic is unchanged");
    }

    let content = match config.format.unwrap_or(OutputFormat::JsonPretty) {
        OutputFormat::Json => output::format_json(&diff, false)?,
        OutputFormat::JsonPretty => output::format_json(&diff, true)?,
        OutputFormat::Table => output::diff_table(&diff),
    };

    output::write_output(&content, config.output_file.as_deref())
}

fn load_logic(path: &Path, logic_json: bool, catalog: &ValueSetCatalog) -> Result<(Option<String>, MeasureLogic)> {
    if logic_json {
        return Ok((None, read::read_logic(path)?));
    }
    let measure = read::read_measure(path)?;
    let logic = LogicExtractor::new(&measure).with_value_sets(catalog).measure_logic();
    Ok((measure.cms_id, logic))
}
