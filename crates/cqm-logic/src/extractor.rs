//! Population logic rendering
//!
//! Each population present in the measure becomes a title line followed by
//! the depth-first, pre-order rendering of its precondition tree. Lines are
//! tab-indented by nesting depth; a line ending in `\n` closes a paragraph.
//! Line order determines how stable diffs between measure versions are, so
//! traversal order must not change.

use serde::{Deserialize, Serialize};

use cqm_hqmf::{
    DataCriteria, MEASURE_PERIOD_REFERENCE, Measure, PopulationCriteria, Precondition, PreconditionNode,
    SubsetOperator, TemporalReference,
};
use cqm_terminology::ValueSetCatalog;

use crate::error::{ExtractError, ExtractResult};
use crate::tables;
use crate::value::{translate_oid, value_logic};

/// Code of the section listing variable definitions
pub const VARIABLES_CODE: &str = "VARIABLES";

/// Code of the single section substituted when extraction fails
pub const ERROR_POPULATION_CODE: &str = "ERROR";

/// Rendered lines of one population
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationLogic {
    pub code: String,
    pub lines: Vec<String>,
}

impl PopulationLogic {
    pub fn new(code: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            code: code.into(),
            lines,
        }
    }
}

/// Rendered logic of a whole measure, in population order
pub type MeasureLogic = Vec<PopulationLogic>;

/// The single error section rendered in place of a measure's logic
pub fn error_logic(err: &ExtractError) -> MeasureLogic {
    vec![PopulationLogic::new(
        ERROR_POPULATION_CODE,
        vec![format!("Error parsing measure logic: {}", err)],
    )]
}

/// Extractor configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorOptions {
    /// Maximum nesting of preconditions and derived criteria
    pub max_depth: usize,
}

impl Default for ExtractorOptions {
    fn default() -> Self {
        Self { max_depth: 64 }
    }
}

impl ExtractorOptions {
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

/// Renders the population logic of one measure
#[derive(Debug, Clone)]
pub struct LogicExtractor<'a> {
    measure: &'a Measure,
    catalog: Option<&'a ValueSetCatalog>,
    options: ExtractorOptions,
}

impl<'a> LogicExtractor<'a> {
    pub fn new(measure: &'a Measure) -> Self {
        Self {
            measure,
            catalog: None,
            options: ExtractorOptions::default(),
        }
    }

    /// Display value sets by name instead of OID
    pub fn with_value_sets(mut self, catalog: &'a ValueSetCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    pub fn with_options(mut self, options: ExtractorOptions) -> Self {
        self.options = options;
        self
    }

    /// Render every population, then the variables section if any
    pub fn population_logic(&self) -> ExtractResult<MeasureLogic> {
        let mut results = Vec::new();

        for code in self.measure.population_codes() {
            let Some(population) = self.measure.population_criteria.get(code) else {
                continue;
            };
            let mut lines = vec![format!("\n{}\n", tables::population_title(code).unwrap_or(code))];
            lines.extend(self.population_criteria_logic(population)?);
            results.push(PopulationLogic::new(code, lines));
        }

        let variables = self.variables_logic()?;
        if !variables.is_empty() {
            results.push(PopulationLogic::new(VARIABLES_CODE, variables));
        }

        Ok(results)
    }

    /// Render the measure, substituting a single error line on failure
    pub fn measure_logic(&self) -> MeasureLogic {
        match self.population_logic() {
            Ok(logic) => logic,
            Err(err) => {
                tracing::warn!(
                    cms_id = self.measure.cms_id.as_deref().unwrap_or_default(),
                    error = %err,
                    "Substituting error line for measure logic"
                );
                error_logic(&err)
            }
        }
    }

    fn population_criteria_logic(&self, population: &PopulationCriteria) -> ExtractResult<Vec<String>> {
        let root = population.root();
        let mut results: Vec<String> = Vec::new();
        for comment in root
            .and_then(|root| root.comments.as_deref())
            .unwrap_or_default()
            .iter()
            .chain(population.comments.as_deref().unwrap_or_default())
        {
            if !results.contains(comment) {
                results.push(comment.clone());
            }
        }

        let Some(root) = root else {
            results.push("\tNone\n".to_string());
            return Ok(results);
        };

        match &root.preconditions {
            Some(children) => {
                for child in children {
                    results.extend(self.precondition_logic(child, root, root.is_negated(), "", 0)?);
                }
            }
            None => {
                if let Some(aggregator) = population.aggregator.as_deref().filter(|a| !a.is_empty()) {
                    results.push(format!("\t{}\n", tables::aggregator(aggregator).unwrap_or_default()));
                }
                let reference = root.reference.as_deref().ok_or(ExtractError::EmptyPrecondition)?;
                results.extend(self.data_criteria_logic(reference, false, false, "", 0)?);
            }
        }

        Ok(results)
    }

    fn precondition_logic(
        &self,
        precondition: &Precondition,
        parent: &Precondition,
        parent_negation: bool,
        indent: &str,
        depth: usize,
    ) -> ExtractResult<Vec<String>> {
        self.check_depth(depth)?;

        let mut results = Vec::new();
        let mut conjunction = parent
            .conjunction_code
            .as_deref()
            .and_then(tables::conjunction)
            .unwrap_or_default();
        if parent_negation {
            conjunction = tables::flip_conjunction(conjunction).unwrap_or_default();
        }
        // a negated wrapper around a single child only carries the NOT
        let suppress = precondition.is_negated() && precondition.preconditions.as_ref().is_some_and(|c| c.len() == 1);
        let indent = format!("{}\t", indent);

        if !suppress {
            results.extend(precondition.comments.iter().flatten().cloned());
            if let Some(criteria) = precondition
                .reference
                .as_deref()
                .and_then(|reference| self.measure.data_criteria.get(reference))
            {
                results.extend(criteria.comments.iter().flatten().cloned());
            }

            let mut line = format!("{}{}", indent, conjunction);
            if parent_negation {
                line.push_str(" NOT");
            }
            line.push(':');
            results.push(line);
        }

        match precondition.node() {
            PreconditionNode::Internal(children) => {
                if let Some(last) = results.last_mut() {
                    last.push('\n');
                }
                for child in children {
                    results.extend(self.precondition_logic(
                        child,
                        precondition,
                        precondition.is_negated(),
                        &indent,
                        depth + 1,
                    )?);
                }
            }
            PreconditionNode::Leaf(reference) => {
                if let Some(last) = results.last_mut() {
                    last.push(' ');
                }
                results.extend(self.data_criteria_logic(reference, false, false, "", depth + 1)?);
            }
            PreconditionNode::Empty => return Err(ExtractError::EmptyPrecondition),
        }

        Ok(results)
    }

    fn data_criteria_logic(
        &self,
        reference: &str,
        expand_variable: bool,
        hide_title: bool,
        indent: &str,
        depth: usize,
    ) -> ExtractResult<Vec<String>> {
        self.check_depth(depth)?;

        let criteria = self.criteria(reference)?;
        let mut results: Vec<String> = criteria
            .subset_operators()
            .iter()
            .map(|subset| self.subset_operator_logic(subset))
            .collect();

        let is_satisfies = criteria
            .definition
            .as_deref()
            .and_then(tables::satisfies_operator)
            .is_some();
        let has_children = criteria.is_derived() && (!criteria.is_variable() || expand_variable);
        let operator = criteria.derivation_operator.as_deref().unwrap_or_default();
        let set_operator = tables::set_operator(operator);

        if has_children {
            if is_satisfies {
                results.extend(self.satisfies_logic(reference, criteria, &format!("{}\t", indent), depth)?);
            } else if let Some(children) = &criteria.children_criteria {
                if let Some(set_operator) = set_operator.filter(|_| !expand_variable) {
                    results.push(format!("\n{}\t\t{}:", indent, set_operator));
                }

                let child_indent = format!("{}\t", indent);
                let mut prefix = indent.to_string();
                for child in children {
                    if set_operator.is_none() {
                        prefix.push_str(tables::logic_operator(operator).unwrap_or_default());
                        prefix.push_str(" : ");
                    }
                    for line in self.data_criteria_logic(child, false, false, &child_indent, depth + 1)? {
                        results.push(format!("{}\t{}", prefix, line));
                    }
                }

                for temporal in criteria.temporal_references() {
                    results.push(format!("{}\t\t{}", indent, self.temporal_reference_logic(temporal, depth)?));
                }
            }
        } else {
            let mut line = if hide_title && !results.is_empty() {
                String::new()
            } else {
                indent.to_string()
            };

            if !hide_title {
                if let Some(occurrence) = &criteria.specific_occurrence {
                    line.push_str(&format!("Occurrence {}: ", occurrence));
                }
                if criteria.is_variable() {
                    line.push('$');
                }
                line.push_str(criteria.description());
            }
            if let Some(value) = criteria.value.as_ref().filter(|_| !criteria.is_characteristic()) {
                line.push_str(&format!("(result{})", value_logic(value, None, self.catalog)));
            }
            if let Some(fields) = &criteria.field_values {
                line.push_str(" ( ");
                for (key, field) in fields {
                    line.push_str(tables::field_title(key));
                    if let Some(field) = field {
                        line.push_str(&value_logic(field, None, self.catalog));
                    }
                }
                line.push_str(" )");
            }
            if criteria.is_negated() {
                line.push_str(&format!(
                    " ( Not Done : {} )",
                    translate_oid(self.catalog, criteria.negation_code_list_id.as_deref().unwrap_or_default())
                ));
            }
            results.push(line);

            let temporals = criteria.temporal_references();
            for temporal in temporals {
                let text = self.temporal_reference_logic(temporal, depth)?;
                if temporals.len() > 1 {
                    results.push(format!("{}{}", indent, text));
                } else {
                    results.push(text);
                }
            }
        }

        if let Some(last) = results.last_mut() {
            if !last.ends_with('\n') {
                last.push('\n');
            }
        }

        Ok(results)
    }

    fn satisfies_logic(
        &self,
        reference: &str,
        criteria: &DataCriteria,
        indent: &str,
        depth: usize,
    ) -> ExtractResult<Vec<String>> {
        let children = criteria.children();
        let root_key = children
            .first()
            .ok_or_else(|| ExtractError::SatisfiesWithoutChildren {
                reference: reference.to_string(),
            })?;
        let root = self.criteria(root_key)?;

        let mut line = String::new();
        if let Some(occurrence) = &root.specific_occurrence {
            line.push_str(&format!("Occurrence {}:", occurrence));
        }
        if root.is_variable() {
            line.push('$');
        }
        line.push_str(&format!(
            "{} {}\n",
            root.description(),
            criteria
                .definition
                .as_deref()
                .and_then(tables::satisfies_operator)
                .unwrap_or_default()
        ));

        let mut results = vec![line];
        let child_indent = format!("{}\t", indent);
        for child in children {
            results.push(
                self.data_criteria_logic(child, false, true, &child_indent, depth + 1)?
                    .concat(),
            );
        }
        for temporal in criteria.temporal_references() {
            results.push(format!("{}\t{}", indent, self.temporal_reference_logic(temporal, depth)?));
        }

        Ok(results)
    }

    fn temporal_reference_logic(&self, temporal: &TemporalReference, depth: usize) -> ExtractResult<String> {
        let mut line = temporal
            .range
            .as_ref()
            .map(|range| value_logic(range, None, self.catalog))
            .unwrap_or_default();

        let timing = tables::timing(&temporal.timing).ok_or_else(|| ExtractError::UnknownTiming {
            timing: temporal.timing.clone(),
        })?;
        line.push_str(&format!(" {} ", timing));

        if temporal.reference == MEASURE_PERIOD_REFERENCE {
            line.push_str("\"Measurement Period\"");
        } else {
            line.push_str(
                &self
                    .data_criteria_logic(&temporal.reference, false, false, "", depth + 1)?
                    .concat(),
            );
        }

        Ok(line)
    }

    fn subset_operator_logic(&self, subset: &SubsetOperator) -> String {
        let mut line = tables::subset(&subset.operator_type)
            .unwrap_or_default()
            .to_string();
        if let Some(value) = subset.value.as_ref().filter(|value| !value.is_any_non_null()) {
            line.push_str(&value_logic(value, None, self.catalog));
        }
        line.push_str(": ");
        line
    }

    fn variables_logic(&self) -> ExtractResult<Vec<String>> {
        let mut variables = self.measure.variables().peekable();
        if variables.peek().is_none() {
            return Ok(Vec::new());
        }

        let mut results = vec!["\nVariables\n".to_string()];
        for (key, variable) in variables {
            results.push(format!("\t${} = \n", variable.description()));
            let source = variable.source_data_criteria.as_deref().unwrap_or(key);
            results.extend(self.data_criteria_logic(source, true, false, "\t", 0)?);
        }

        Ok(results)
    }

    fn criteria(&self, reference: &str) -> ExtractResult<&'a DataCriteria> {
        self.measure
            .criteria(reference)
            .ok_or_else(|| ExtractError::CriteriaNotFound {
                reference: reference.to_string(),
            })
    }

    fn check_depth(&self, depth: usize) -> ExtractResult<()> {
        if depth > self.options.max_depth {
            return Err(ExtractError::MaxDepthExceeded {
                max_depth: self.options.max_depth,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqm_hqmf::CriteriaValue;
    use pretty_assertions::assert_eq;

    fn measure_with(criteria: Vec<(&str, DataCriteria)>) -> Measure {
        let mut measure = Measure::default();
        for (key, dc) in criteria {
            measure.data_criteria.insert(key.to_string(), dc);
        }
        measure
    }

    fn derived(operator: &str, children: &[&str]) -> DataCriteria {
        DataCriteria {
            criteria_type: Some("derived".to_string()),
            derivation_operator: Some(operator.to_string()),
            children_criteria: Some(children.iter().map(|c| c.to_string()).collect()),
            ..DataCriteria::described("Derived")
        }
    }

    #[test]
    fn test_xproduct_prefix_accumulates_per_child() {
        let measure = measure_with(vec![
            ("Both", derived("XPRODUCT", &["A", "B"])),
            ("A", DataCriteria::described("A")),
            ("B", DataCriteria::described("B")),
        ]);

        let lines = LogicExtractor::new(&measure)
            .data_criteria_logic("Both", false, false, "", 0)
            .unwrap();

        assert_eq!(lines, vec!["AND : \t\tA\n", "AND : AND : \t\tB\n"]);
    }

    #[test]
    fn test_union_header() {
        let measure = measure_with(vec![
            ("Either", derived("UNION", &["A", "B"])),
            ("A", DataCriteria::described("A")),
            ("B", DataCriteria::described("B")),
        ]);

        let lines = LogicExtractor::new(&measure)
            .data_criteria_logic("Either", false, false, "", 0)
            .unwrap();

        assert_eq!(lines, vec!["\n\t\tUnion of:", "\t\tA\n", "\t\tB\n"]);
    }

    #[test]
    fn test_unexpanded_variable_renders_as_reference() {
        let mut variable = derived("UNION", &["A"]);
        variable.variable = Some(true);
        variable.description = Some("Qualifying Encounters".to_string());
        let measure = measure_with(vec![("Var", variable), ("A", DataCriteria::described("A"))]);

        let lines = LogicExtractor::new(&measure)
            .data_criteria_logic("Var", false, false, "", 0)
            .unwrap();

        assert_eq!(lines, vec!["$Qualifying Encounters\n"]);
    }

    #[test]
    fn test_subset_operators_prefix_the_criteria() {
        let criteria = DataCriteria {
            subset_operators: Some(vec![SubsetOperator {
                operator_type: "RECENT".to_string(),
                value: None,
                extra: Default::default(),
            }]),
            value: Some(CriteriaValue::quantity_interval(
                None,
                Some(CriteriaValue::quantity("100", Some("mg/dL"), false)),
            )),
            ..DataCriteria::described("Laboratory Test, Performed: LDL-c")
        };
        let measure = measure_with(vec![("Ldl", criteria)]);

        let lines = LogicExtractor::new(&measure)
            .data_criteria_logic("Ldl", false, false, "", 0)
            .unwrap();

        assert_eq!(
            lines,
            vec!["MOST RECENT: ", "Laboratory Test, Performed: LDL-c(result < 100 mg/dL)\n"]
        );
    }

    #[test]
    fn test_negation_and_empty_fields() {
        let criteria = DataCriteria {
            negation: Some(true),
            negation_code_list_id: Some("2.16.840.1.113883.3.117.1.7.1.93".to_string()),
            field_values: Some(Default::default()),
            ..DataCriteria::described("Medication, Order: Statin")
        };
        let measure = measure_with(vec![("Statin", criteria)]);

        let lines = LogicExtractor::new(&measure)
            .data_criteria_logic("Statin", false, false, "\t", 0)
            .unwrap();

        assert_eq!(
            lines,
            vec!["\tMedication, Order: Statin (  ) ( Not Done : 2.16.840.1.113883.3.117.1.7.1.93 )\n"]
        );
    }

    #[test]
    fn test_multiple_temporal_references_are_indented() {
        let temporal = |timing: &str| TemporalReference {
            timing: timing.to_string(),
            reference: MEASURE_PERIOD_REFERENCE.to_string(),
            range: None,
            extra: Default::default(),
        };
        let criteria = DataCriteria {
            temporal_references: Some(vec![temporal("SBE"), temporal("EAS")]),
            ..DataCriteria::described("Encounter")
        };
        let measure = measure_with(vec![("Encounter", criteria)]);

        let lines = LogicExtractor::new(&measure)
            .data_criteria_logic("Encounter", false, false, "\t", 0)
            .unwrap();

        assert_eq!(
            lines,
            vec![
                "\tEncounter",
                "\t starts before end of \"Measurement Period\"",
                "\t ends after start of \"Measurement Period\"\n",
            ]
        );
    }

    #[test]
    fn test_self_referencing_criteria_hits_depth_limit() {
        let measure = measure_with(vec![("Loop", derived("XPRODUCT", &["Loop"]))]);

        let err = LogicExtractor::new(&measure)
            .with_options(ExtractorOptions::default().with_max_depth(8))
            .data_criteria_logic("Loop", false, false, "", 0)
            .unwrap_err();

        assert_eq!(err, ExtractError::MaxDepthExceeded { max_depth: 8 });
    }

    #[test]
    fn test_unknown_timing_is_an_error() {
        let criteria = DataCriteria {
            temporal_references: Some(vec![TemporalReference {
                timing: "SOMETIME".to_string(),
                reference: MEASURE_PERIOD_REFERENCE.to_string(),
                range: None,
                extra: Default::default(),
            }]),
            ..DataCriteria::described("Encounter")
        };
        let measure = measure_with(vec![("Encounter", criteria)]);

        let err = LogicExtractor::new(&measure)
            .data_criteria_logic("Encounter", false, false, "", 0)
            .unwrap_err();

        assert!(matches!(err, ExtractError::UnknownTiming { .. }));
    }

    #[test]
    fn test_error_logic_renders_the_error() {
        let logic = error_logic(&ExtractError::EmptyPrecondition);

        assert_eq!(logic.len(), 1);
        assert_eq!(logic[0].code, ERROR_POPULATION_CODE);
        assert_eq!(
            logic[0].lines,
            vec!["Error parsing measure logic: precondition has neither children nor a reference"]
        );
    }
}
