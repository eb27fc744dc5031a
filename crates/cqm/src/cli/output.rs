//! Output formatting utilities

use anyhow::{Context, Result, bail};
use colored::Colorize;
use serde::Serialize;
use std::fs::File;
use std::io::{IsTerminal, Write};
use std::path::Path;
use std::str::FromStr;
use tabled::{Table, Tabled, settings::Style};

use cqm_dependencies::{DependencyMap, StatementComplexity};
use cqm_diagnostics::{Diagnostic, Severity};
use cqm_logic::{MeasureDiff, PopulationLogic};
use cqm_terminology::DrcAssignment;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    JsonPretty,
    Table,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" | "json-pretty" => Ok(Self::JsonPretty),
            "table" => Ok(Self::Table),
            other => bail!("Unsupported output format: {}. Use 'json', 'pretty' or 'table'", other),
        }
    }
}

/// Set up color output based on user preference
pub fn setup_colors(mode: &str) {
    match mode.to_lowercase().as_str() {
        "always" => colored::control::set_override(true),
        "never" => colored::control::set_override(false),
        _ => colored::control::set_override(std::io::stdout().is_terminal()),
    }
}

/// Format an error for display
pub fn format_error(error: &anyhow::Error) -> String {
    format!("{} {:#}", "Error:".red().bold(), error)
}

/// Format a warning for display
pub fn format_warning(warning: &str) -> String {
    format!("{} {}", "Warning:".yellow().bold(), warning)
}

/// Format a success message for display
pub fn format_success(message: &str) -> String {
    format!("{} {}", "Success:".green().bold(), message)
}

/// Print diagnostics to stderr; informational ones only when `verbose`
pub fn report_diagnostics(diagnostics: &[Diagnostic], verbose: bool) {
    for diagnostic in diagnostics {
        if diagnostic.severity == Severity::Info && !verbose {
            continue;
        }
        eprintln!("{}", diagnostic.render_colored());
    }
}

/// Write output to a file or stdout
pub fn write_output(content: &str, output_file: Option<&Path>) -> Result<()> {
    if let Some(path) = output_file {
        let mut file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path.display()))?;
        file.write_all(content.as_bytes())
            .with_context(|| format!("Failed to write to output file: {}", path.display()))?;
        eprintln!("{}", format_success(&format!("Output written to {}", path.display())));
    } else {
        println!("{}", content);
    }
    Ok(())
}

/// Serialize a value as JSON
pub fn format_json<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Result<String> {
    if pretty {
        serde_json::to_string_pretty(value).context("Failed to serialize JSON")
    } else {
        serde_json::to_string(value).context("Failed to serialize JSON")
    }
}

fn render<R: Tabled>(rows: Vec<R>) -> String {
    if rows.is_empty() {
        return "(empty list)".to_string();
    }
    Table::new(rows).with(Style::modern()).to_string()
}

#[derive(Tabled)]
struct DependencyRow {
    #[tabled(rename = "Library")]
    library: String,
    #[tabled(rename = "Statement")]
    statement: String,
    #[tabled(rename = "Depends on")]
    dependencies: String,
}

/// One row per resolved statement
pub fn dependency_table(dependencies: &DependencyMap) -> String {
    let rows: Vec<DependencyRow> = dependencies
        .iter()
        .flat_map(|(library, statements)| {
            statements.iter().map(move |(statement, references)| DependencyRow {
                library: library.clone(),
                statement: statement.clone(),
                dependencies: references
                    .iter()
                    .map(|r| format!("{}.{}", r.library_name, r.statement_name))
                    .collect::<Vec<_>>()
                    .join("\n"),
            })
        })
        .collect();
    render(rows)
}

#[derive(Tabled)]
struct ComplexityRow {
    #[tabled(rename = "Statement")]
    name: String,
    #[tabled(rename = "Complexity")]
    complexity: usize,
}

pub fn complexity_table(complexity: &[StatementComplexity]) -> String {
    render(
        complexity
            .iter()
            .map(|c| ComplexityRow {
                name: c.name.clone(),
                complexity: c.complexity,
            })
            .collect(),
    )
}

#[derive(Tabled)]
struct LogicRow {
    #[tabled(rename = "Population")]
    code: String,
    #[tabled(rename = "Logic")]
    text: String,
}

pub fn logic_table(logic: &[PopulationLogic]) -> String {
    render(
        logic
            .iter()
            .map(|population| LogicRow {
                code: population.code.clone(),
                text: population.lines.concat().trim().to_string(),
            })
            .collect(),
    )
}

#[derive(Tabled)]
struct DiffRow {
    #[tabled(rename = "Population")]
    code: String,
    #[tabled(rename = "Lines")]
    total: usize,
    #[tabled(rename = "Insertions")]
    insertions: usize,
    #[tabled(rename = "Deletions")]
    deletions: usize,
    #[tabled(rename = "Unchanged")]
    unchanged: usize,
}

/// Per-population totals followed by the measure totals
pub fn diff_table(diff: &MeasureDiff) -> String {
    let mut rows: Vec<DiffRow> = diff
        .populations
        .iter()
        .map(|population| DiffRow {
            code: population.code.clone(),
            total: population.totals.total,
            insertions: population.totals.insertions,
            deletions: population.totals.deletions,
            unchanged: population.totals.unchanged,
        })
        .collect();
    if diff.populations.len() > 1 {
        rows.push(DiffRow {
            code: "TOTAL".to_string(),
            total: diff.totals.total,
            insertions: diff.totals.insertions,
            deletions: diff.totals.deletions,
            unchanged: diff.totals.unchanged,
        });
    }
    render(rows)
}

#[derive(Tabled)]
struct AssignmentRow {
    #[tabled(rename = "Data criteria")]
    criteria_key: String,
    #[tabled(rename = "Code list id")]
    guid: String,
    #[tabled(rename = "Source updated")]
    source_updated: bool,
}

pub fn assignment_table(assignments: &[DrcAssignment]) -> String {
    render(
        assignments
            .iter()
            .map(|a| AssignmentRow {
                criteria_key: a.criteria_key.clone(),
                guid: a.guid.clone(),
                source_updated: a.source_updated,
            })
            .collect(),
    )
}
