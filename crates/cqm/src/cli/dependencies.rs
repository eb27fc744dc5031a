//! Dependencies command implementation

use super::{output, read};
use anyhow::{Context, Result};
use serde::Serialize;
use std::path::PathBuf;

use cqm_dependencies::{DependencyMap, DependencyResolver, ResolverOptions, StatementComplexity, statement_complexity};
use super::output::OutputFormat;

/// Configuration for dependencies command
pub struct DependenciesConfig {
    pub files: Vec<PathBuf>,
    pub main: String,
    pub complexity: bool,
    pub max_depth: Option<usize>,
    pub format: Option<OutputFormat>,
    pub output_file: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct DependencyReport {
    dependencies: DependencyMap,
    #[serde(skip_serializing_if = "Option::is_none")]
    complexity: Option<Vec<StatementComplexity>>,
}

/// Resolve the statement dependencies of the main library
pub fn run(config: DependenciesConfig) -> Result<()> {
    if config.files.is_empty() {
        anyhow::bail!("No ELM files specified");
    }

    let libraries = read::read_libraries(&config.files)?;

    let mut options = ResolverOptions::default();
    if let Some(max_depth) = config.max_depth {
        options = options.with_max_depth(max_depth);
    }
    let dependencies = DependencyResolver::new(&libraries)
        .with_options(options)
        .resolve(&config.main)
        .with_context(|| format!("Failed to resolve dependencies of {}", config.main))?;

    let complexity = if config.complexity {
        libraries
            .iter()
            .find(|library| library.name() == config.main)
            .map(statement_complexity)
    } else {
        None
    };

    let report = DependencyReport {
        dependencies,
        complexity,
    };
    let content = match config.format.unwrap_or(OutputFormat::JsonPretty) {
        OutputFormat::Json => output::format_json(&report, false)?,
        OutputFormat::JsonPretty => output::format_json(&report, true)?,
        OutputFormat::Table => {
            let mut table = output::dependency_table(&report.dependencies);
            if let Some(complexity) = &report.complexity {
                table.push_str("\n\n");
                table.push_str(&output::complexity_table(complexity));
            }
            table
        }
    };

    output::write_output(&content, config.output_file.as_deref())
}
