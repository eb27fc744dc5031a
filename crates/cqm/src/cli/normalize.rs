//! Normalize command implementation

use super::{output, read};
use anyhow::Result;
use std::path::PathBuf;

use cqm_terminology::{extract_direct_reference_codes, normalize_measure};
use super::output::OutputFormat;

/// Configuration for normalize command
pub struct NormalizeConfig {
    pub measure: PathBuf,
    pub elm: Vec<PathBuf>,
    /// Print the assignments instead of the normalized measure
    pub summary: bool,
    pub format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
}

/// Give inline-coded data criteria the id of their direct reference code
pub fn run(config: NormalizeConfig) -> Result<()> {
    let mut measure = read::read_measure(&config.measure)?;
    let libraries = read::read_libraries(&config.elm)?;

    let drcs = extract_direct_reference_codes(&libraries);
    let assignments = normalize_measure(&mut measure, &drcs);

    for (key, criteria) in &measure.data_criteria {
        if criteria.code_list_id.is_none() && criteria.inline_code_list.is_some() {
            eprintln!(
                "{}",
                output::format_warning(&format!("No direct reference code matches data criteria '{}'", key))
            );
        }
    }

    let format = config.format.unwrap_or(OutputFormat::JsonPretty);
    let content = match (config.summary, format) {
        (_, OutputFormat::Table) => output::assignment_table(&assignments),
        (true, format) => output::format_json(&assignments, format == OutputFormat::JsonPretty)?,
        (false, format) => output::format_json(&measure, format == OutputFormat::JsonPretty)?,
    };

    output::write_output(&content, config.output_file.as_deref())
}
