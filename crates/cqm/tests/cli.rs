//! CLI commands run against files on disk
//!
//! Each command writes to a temporary output file which is then inspected.

#![cfg(feature = "cli")]

use cqm::cli::dependencies::{self, DependenciesConfig};
use cqm::cli::diff::{self, DiffConfig};
use cqm::cli::load::{self, LoadConfig};
use cqm::cli::logic::{self, LogicConfig};
use cqm::cli::normalize::{self, NormalizeConfig};
use cqm::cli::output::OutputFormat;
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Workspace {
    dir: TempDir,
}

impl Workspace {
    fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    fn write(&self, name: &str, value: &Value) -> PathBuf {
        let path = self.dir.path().join(name);
        fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
        path
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.path().join(name)
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

fn main_elm() -> Value {
    json!({"library": {
        "identifier": {"id": "Main", "version": "1.0.0"},
        "includes": {"def": [{"localIdentifier": "Common", "path": "CommonLib"}]},
        "codeSystems": {"def": [{"name": "LOINC", "id": "urn:oid:2.16.840.1.113883.6.1", "version": "2.46"}]},
        "codes": {"def": [{"name": "Birth date", "id": "21112-8", "codeSystem": {"name": "LOINC"}}]},
        "statements": {"def": [
            {"name": "Numerator", "expression": {"type": "ExpressionRef", "name": "Shared", "libraryName": "Common"}},
            {"name": "Denominator", "expression": {"type": "Or", "operand": [
                {"type": "ExpressionRef", "name": "Numerator"},
                {"type": "Literal", "value": "true"}
            ]}}
        ]}
    }})
}

fn common_elm() -> Value {
    json!({"identifier": {"id": "CommonLib"}, "statements": {"def": [{"name": "Shared", "expression": null}]}})
}

fn measure(conjunction: &str) -> Value {
    json!({
        "cms_id": "CMS9v1",
        "population_criteria": {
            "IPP": {"preconditions": [{
                "id": 1,
                "conjunction_code": conjunction,
                "preconditions": [{"id": 2, "reference": "BirthDate"}, {"id": 3, "reference": "Visit"}]
            }]}
        },
        "data_criteria": {
            "BirthDate": {
                "description": "Patient Characteristic Birthdate: Birth date",
                "inline_code_list": {"LOINC": ["21112-8"]}
            },
            "Visit": {"description": "Encounter, Performed: Office Visit", "code_list_id": "1.2.3"}
        }
    })
}

#[test]
fn test_dependencies_command_writes_map_and_complexity() {
    let ws = Workspace::new();
    let files = vec![ws.write("main.json", &main_elm()), ws.write("common.json", &common_elm())];
    let out = ws.path("deps.json");

    dependencies::run(DependenciesConfig {
        files,
        main: "Main".to_string(),
        complexity: true,
        max_depth: None,
        format: Some(OutputFormat::Json),
        output_file: Some(out.clone()),
    })
    .unwrap();

    let report = read_json(&out);
    assert_eq!(
        report["dependencies"]["Main"]["Numerator"],
        json!([{"library_name": "CommonLib", "statement_name": "Shared"}])
    );
    assert_eq!(report["dependencies"]["CommonLib"]["Shared"], json!([]));
    assert_eq!(
        report["complexity"],
        json!([{"name": "Numerator", "complexity": 1}, {"name": "Denominator", "complexity": 2}])
    );
}

#[test]
fn test_dependencies_command_reports_missing_library() {
    let ws = Workspace::new();
    let files = vec![ws.write("main.json", &main_elm())];

    let err = dependencies::run(DependenciesConfig {
        files,
        main: "Main".to_string(),
        complexity: false,
        max_depth: None,
        format: None,
        output_file: Some(ws.path("deps.json")),
    })
    .unwrap_err();

    assert!(format!("{:#}", err).contains("CommonLib"));
}

#[test]
fn test_logic_command_renders_text_by_default() {
    let ws = Workspace::new();
    let measure = ws.write("measure.json", &measure("allTrue"));
    let out = ws.path("logic.txt");

    logic::run(LogicConfig {
        measure,
        value_sets: None,
        elm: Vec::new(),
        format: None,
        output_file: Some(out.clone()),
    })
    .unwrap();

    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "\nInitial Patient Population\n\tAND: \nPatient Characteristic Birthdate: Birth date\n\tAND: \nEncounter, Performed: Office Visit\n"
    );
}

#[test]
fn test_normalize_command_assigns_ids() {
    let ws = Workspace::new();
    let measure = ws.write("measure.json", &measure("allTrue"));
    let elm = vec![ws.write("main.json", &main_elm())];
    let out = ws.path("normalized.json");

    normalize::run(NormalizeConfig {
        measure,
        elm,
        summary: false,
        format: None,
        output_file: Some(out.clone()),
    })
    .unwrap();

    let normalized = read_json(&out);
    let id = normalized["data_criteria"]["BirthDate"]["code_list_id"].as_str().unwrap();
    assert!(id.starts_with("drc-"));
    assert_eq!(normalized["data_criteria"]["Visit"]["code_list_id"], json!("1.2.3"));
}

#[test]
fn test_diff_command_compares_measures() {
    let ws = Workspace::new();
    let current = ws.write("current.json", &measure("allTrue"));
    let other = ws.write("other.json", &measure("atLeastOneTrue"));
    let out = ws.path("diff.json");

    diff::run(DiffConfig {
        current,
        other,
        by_population: true,
        logic_json: false,
        value_sets: None,
        format: Some(OutputFormat::Json),
        output_file: Some(out.clone()),
    })
    .unwrap();

    let diff = read_json(&out);
    assert_eq!(diff["cms_id"], json!("CMS9v1"));
    assert_eq!(diff["totals"]["insertions"], json!(2));
    assert_eq!(diff["totals"]["deletions"], json!(2));
    assert_eq!(diff["populations"][0]["code"], json!("IPP"));
}

#[test]
fn test_diff_command_reads_stored_logic() {
    let ws = Workspace::new();
    let stored = json!([{"code": "IPP", "lines": ["\nInitial Patient Population\n", "\tNone\n"]}]);
    let current = ws.write("current.json", &stored);
    let other = ws.write("other.json", &stored);
    let out = ws.path("diff.json");

    diff::run(DiffConfig {
        current,
        other,
        by_population: false,
        logic_json: true,
        value_sets: None,
        format: Some(OutputFormat::Json),
        output_file: Some(out.clone()),
    })
    .unwrap();

    let diff = read_json(&out);
    assert_eq!(diff["populations"][0]["code"], json!("ALL"));
    assert_eq!(diff["totals"]["unchanged"], json!(3));
    assert_eq!(diff["totals"]["total"], json!(3));
}

#[test]
fn test_load_command_writes_every_artifact() {
    let ws = Workspace::new();
    let elm = vec![ws.write("main.json", &main_elm()), ws.write("common.json", &common_elm())];
    let measure = ws.write("measure.json", &measure("allTrue"));
    let out = ws.path("loaded.json");

    load::run(LoadConfig {
        elm,
        main: "Main".to_string(),
        measure: Some(measure),
        value_sets: None,
        components: Vec::new(),
        verbose: false,
        format: Some(OutputFormat::JsonPretty),
        output_file: Some(out.clone()),
    })
    .unwrap();

    let loaded = read_json(&out);
    assert_eq!(loaded["main_library"], json!("Main"));
    assert_eq!(loaded["direct_reference_codes"].as_array().unwrap().len(), 1);
    assert_eq!(loaded["drc_assignments"][0]["criteria_key"], json!("BirthDate"));
    assert_eq!(loaded["measure_logic"][0]["code"], json!("IPP"));
}
