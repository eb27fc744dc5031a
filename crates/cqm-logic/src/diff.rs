//! Line diffs between two renderings of measure logic
//!
//! Lines are joined into text (appending a newline where one is missing) and
//! diffed line by line. Per-population diffs first align the two population
//! lists so that a population present on one side only is diffed against
//! empty text.

use serde::{Deserialize, Serialize};
use similar::{ChangeTag, TextDiff};

use cqm_hqmf::ALL_POPULATION_CODES;

use crate::extractor::{PopulationLogic, VARIABLES_CODE};

/// Code of the single entry of a whole-measure diff
pub const ALL_POPULATIONS_CODE: &str = "ALL";

/// Joined text of one population
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicText {
    pub code: String,
    pub text: String,
}

impl LogicText {
    fn empty(code: &str) -> Self {
        Self {
            code: code.to_string(),
            text: String::new(),
        }
    }
}

/// Classification of one output line of the diff
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineChange {
    /// Present only in the other version
    Ins,
    /// Present only in the current version
    Del,
    Unchanged,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffTotals {
    pub total: usize,
    pub deletions: usize,
    pub insertions: usize,
    pub unchanged: usize,
}

impl DiffTotals {
    fn record(&mut self, change: LineChange) {
        match change {
            LineChange::Ins => self.insertions += 1,
            LineChange::Del => self.deletions += 1,
            LineChange::Unchanged => self.unchanged += 1,
        }
        self.total += 1;
    }

    fn add(&mut self, other: &DiffTotals) {
        self.total += other.total;
        self.deletions += other.deletions;
        self.insertions += other.insertions;
        self.unchanged += other.unchanged;
    }
}

/// Diff of one population
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationDiff {
    pub code: String,
    pub lines: Vec<LineChange>,
    #[serde(flatten)]
    pub totals: DiffTotals,
}

/// Diff of two versions of a measure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MeasureDiff {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_id: Option<String>,
    pub populations: Vec<PopulationDiff>,
    pub totals: DiffTotals,
}

fn join_lines(lines: &[String]) -> String {
    let mut text = String::new();
    for line in lines {
        text.push_str(line);
        if !line.ends_with('\n') {
            text.push('\n');
        }
    }
    text
}

/// All populations' lines as one text
pub fn measure_logic_text(logic: &[PopulationLogic]) -> String {
    logic.iter().map(|population| join_lines(&population.lines)).collect()
}

/// Each population's lines as its own text
pub fn population_logic_text(logic: &[PopulationLogic]) -> Vec<LogicText> {
    logic
        .iter()
        .map(|population| LogicText {
            code: population.code.clone(),
            text: join_lines(&population.lines),
        })
        .collect()
}

/// Insert empty entries so both sides have a slot for every population either has
///
/// Walks the canonical population codes, then `VARIABLES`. Slots are counted
/// from the front, so both lists are expected in canonical order.
pub fn verify_populations(current: &mut Vec<LogicText>, other: &mut Vec<LogicText>) {
    let current_codes: Vec<String> = current.iter().map(|p| p.code.clone()).collect();
    let other_codes: Vec<String> = other.iter().map(|p| p.code.clone()).collect();
    let has = |codes: &[String], code: &str| codes.iter().any(|c| c == code);

    let mut index = 0;
    for code in ALL_POPULATION_CODES.iter().copied().chain([VARIABLES_CODE]) {
        let in_current = has(&current_codes, code);
        let in_other = has(&other_codes, code);
        if !in_current && !in_other {
            continue;
        }
        if !in_current {
            current.insert(index.min(current.len()), LogicText::empty(code));
        } else if !in_other {
            other.insert(index.min(other.len()), LogicText::empty(code));
        }
        index += 1;
    }
}

/// Line diff of `current` against `other`
pub fn compute_diff(code: &str, current: &str, other: &str) -> PopulationDiff {
    let diff = TextDiff::from_lines(current, other);
    let mut totals = DiffTotals::default();
    let lines = diff
        .iter_all_changes()
        .map(|change| {
            let line = match change.tag() {
                ChangeTag::Insert => LineChange::Ins,
                ChangeTag::Delete => LineChange::Del,
                ChangeTag::Equal => LineChange::Unchanged,
            };
            totals.record(line);
            line
        })
        .collect();

    PopulationDiff {
        code: code.to_string(),
        lines,
        totals,
    }
}

/// Diff two renderings of a measure, as a whole or population by population
pub fn diff_measure_logic(
    cms_id: Option<String>,
    current: &[PopulationLogic],
    other: &[PopulationLogic],
    by_population: bool,
) -> MeasureDiff {
    if !by_population {
        let diff = compute_diff(
            ALL_POPULATIONS_CODE,
            &measure_logic_text(current),
            &measure_logic_text(other),
        );
        return MeasureDiff {
            cms_id,
            totals: diff.totals,
            populations: vec![diff],
        };
    }

    let mut current_text = population_logic_text(current);
    let mut other_text = population_logic_text(other);
    verify_populations(&mut current_text, &mut other_text);

    let mut totals = DiffTotals::default();
    let mut populations = Vec::with_capacity(current_text.len());
    for index in 0..current_text.len().max(other_text.len()) {
        let mine = current_text.get(index);
        let theirs = other_text.get(index);
        let code = mine.or(theirs).map(|p| p.code.as_str()).unwrap_or_default();
        let diff = compute_diff(
            code,
            mine.map_or("", |p| p.text.as_str()),
            theirs.map_or("", |p| p.text.as_str()),
        );
        totals.add(&diff.totals);
        populations.push(diff);
    }

    tracing::debug!(
        populations = populations.len(),
        insertions = totals.insertions,
        deletions = totals.deletions,
        "Computed measure logic diff"
    );

    MeasureDiff {
        cms_id,
        populations,
        totals,
    }
}
