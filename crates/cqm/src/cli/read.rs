//! Reading JSON inputs from disk

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use cqm_dependencies::ComponentMeasure;
use cqm_diagnostics::{CQM0004, CqmError};
use cqm_elm::{JsonSerializer, Library};
use cqm_hqmf::Measure;
use cqm_logic::MeasureLogic;
use cqm_terminology::ValueSetCatalog;

fn read_file(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path.display()))
}

/// Read ELM libraries; each file holds one library or an array of them
pub fn read_libraries(files: &[impl AsRef<Path>]) -> Result<Vec<Library>> {
    let serializer = JsonSerializer::new();
    let mut libraries = Vec::new();

    for file in files {
        let path = file.as_ref();
        let content = read_file(path)?;
        let loaded = serializer
            .deserialize_many(&content)
            .map_err(CqmError::from)
            .with_context(|| format!("Failed to load ELM file: {}", path.display()))?;
        for library in &loaded {
            tracing::debug!(library = library.name(), file = %path.display(), "Loaded ELM library");
        }
        libraries.extend(loaded);
    }

    Ok(libraries)
}

pub fn read_measure(path: &Path) -> Result<Measure> {
    let content = read_file(path)?;
    Measure::from_json(&content).with_context(|| format!("Failed to load measure: {}", path.display()))
}

pub fn read_value_sets(path: &Path) -> Result<ValueSetCatalog> {
    let content = read_file(path)?;
    ValueSetCatalog::from_json(&content).with_context(|| format!("Failed to load value sets: {}", path.display()))
}

/// Read previously rendered measure logic
pub fn read_logic(path: &Path) -> Result<MeasureLogic> {
    let content = read_file(path)?;
    serde_json::from_str(&content)
        .map_err(|e| CqmError::input(CQM0004, e.to_string()))
        .with_context(|| format!("Failed to load measure logic: {}", path.display()))
}

pub fn read_component(path: &Path) -> Result<ComponentMeasure> {
    let content = read_file(path)?;
    serde_json::from_str(&content).with_context(|| format!("Failed to load component measure: {}", path.display()))
}
