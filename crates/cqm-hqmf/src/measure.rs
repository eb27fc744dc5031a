//! Measure document, population criteria and precondition trees

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use cqm_diagnostics::{CQM0003, CqmError};

use crate::criteria::DataCriteria;

/// Canonical population codes in display order
pub const ALL_POPULATION_CODES: [&str; 10] = [
    "IPP",
    "DENOM",
    "NUMER",
    "NUMEX",
    "DENEXCEP",
    "DENEX",
    "MSRPOPL",
    "MSRPOPLEX",
    "OBSERV",
    "STRAT",
];

/// Temporal reference target meaning the measurement period
pub const MEASURE_PERIOD_REFERENCE: &str = "MeasurePeriod";

/// A parsed HQMF/QDM measure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hqmf_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hqmf_set_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cms_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Population code (possibly suffixed, e.g. `IPP_1`) -> criteria
    #[serde(default)]
    pub population_criteria: IndexMap<String, PopulationCriteria>,
    #[serde(default)]
    pub data_criteria: IndexMap<String, DataCriteria>,
    #[serde(default)]
    pub source_data_criteria: IndexMap<String, DataCriteria>,
    /// Population sets: population code -> criteria key
    #[serde(default)]
    pub populations: Vec<IndexMap<String, Value>>,
    /// Remaining fields, preserved as-is
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl Measure {
    /// Parse a measure from its JSON representation
    pub fn from_json(input: &str) -> Result<Self, CqmError> {
        serde_json::from_str(input).map_err(|e| CqmError::input(CQM0003, e.to_string()))
    }

    /// Look up a criteria in `data_criteria`, falling back to `source_data_criteria`
    pub fn criteria(&self, key: &str) -> Option<&DataCriteria> {
        self.data_criteria
            .get(key)
            .or_else(|| self.source_data_criteria.get(key))
    }

    /// Canonical population codes present in this measure, in canonical order
    pub fn population_codes(&self) -> Vec<&'static str> {
        ALL_POPULATION_CODES
            .iter()
            .copied()
            .filter(|code| self.population_criteria.contains_key(*code))
            .collect()
    }

    /// Source data criteria flagged as variables
    pub fn variables(&self) -> impl Iterator<Item = (&String, &DataCriteria)> {
        self.source_data_criteria
            .iter()
            .filter(|(_, criteria)| criteria.is_variable())
    }
}

/// One population's criteria
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PopulationCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub population_type: Option<String>,
    /// Root preconditions (at most the first one is the root)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<Vec<Precondition>>,
    /// Aggregator for continuous-variable observations (`MEAN`, `MEDIAN`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl PopulationCriteria {
    /// The root precondition, if any
    pub fn root(&self) -> Option<&Precondition> {
        self.preconditions.as_ref().and_then(|p| p.first())
    }
}

/// Node of a boolean precondition tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Precondition {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    /// `allTrue` or `atLeastOneTrue`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conjunction_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negation: Option<bool>,
    /// Children of an internal node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preconditions: Option<Vec<Precondition>>,
    /// Data criteria key of a leaf node
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
}

/// Shape of a precondition node
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PreconditionNode<'a> {
    /// Internal node with child preconditions
    Internal(&'a [Precondition]),
    /// Leaf referencing a data criteria
    Leaf(&'a str),
    /// Neither children nor reference
    Empty,
}

impl Precondition {
    /// Internal node combining children with a conjunction
    pub fn internal(conjunction_code: &str, children: Vec<Precondition>) -> Self {
        Self {
            conjunction_code: Some(conjunction_code.to_string()),
            preconditions: Some(children),
            ..Self::default()
        }
    }

    /// Leaf node referencing a data criteria
    pub fn leaf(reference: &str) -> Self {
        Self {
            reference: Some(reference.to_string()),
            ..Self::default()
        }
    }

    /// Mark the node as negated
    pub fn negated(mut self) -> Self {
        self.negation = Some(true);
        self
    }

    pub fn is_negated(&self) -> bool {
        self.negation.unwrap_or(false)
    }

    /// Classify the node; a present child list wins over a reference
    pub fn node(&self) -> PreconditionNode<'_> {
        match (&self.preconditions, &self.reference) {
            (Some(children), _) => PreconditionNode::Internal(children),
            (None, Some(reference)) => PreconditionNode::Leaf(reference),
            (None, None) => PreconditionNode::Empty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_codes_follow_canonical_order() {
        let mut measure = Measure::default();
        for code in ["NUMER", "IPP_1", "DENOM", "IPP"] {
            measure
                .population_criteria
                .insert(code.to_string(), PopulationCriteria::default());
        }

        assert_eq!(measure.population_codes(), vec!["IPP", "DENOM", "NUMER"]);
    }

    #[test]
    fn test_criteria_falls_back_to_source() {
        let mut measure = Measure::default();
        measure
            .source_data_criteria
            .insert("A_source".to_string(), DataCriteria::described("A"));

        assert!(measure.criteria("A_source").is_some());
        assert!(measure.criteria("A").is_none());
    }

    #[test]
    fn test_precondition_node_shape() {
        let leaf = Precondition::leaf("Encounter");
        let internal = Precondition::internal("allTrue", vec![leaf.clone()]);
        let both = Precondition {
            reference: Some("ignored".to_string()),
            ..internal.clone()
        };

        assert_eq!(leaf.node(), PreconditionNode::Leaf("Encounter"));
        assert!(matches!(internal.node(), PreconditionNode::Internal(c) if c.len() == 1));
        assert!(matches!(both.node(), PreconditionNode::Internal(_)));
        assert_eq!(Precondition::default().node(), PreconditionNode::Empty);
    }
}
