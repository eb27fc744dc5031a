//! Data criteria: the leaf clinical facts of a measure

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::CriteriaValue;

/// Inline code list: code system name -> codes
pub type InlineCodeList = IndexMap<String, Vec<String>>;

/// A data criteria (or source data criteria) entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataCriteria {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Human readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Criteria type (`derived`, `characteristic`, `encounters`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub criteria_type: Option<String>,
    /// QDM definition (`encounter`, `satisfies_all`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub definition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negation: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub negation_code_list_id: Option<String>,
    /// Value set OID (or synthetic direct reference code id)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_list_id: Option<String>,
    /// Codes referenced directly rather than through a value set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_code_list: Option<InlineCodeList>,
    /// Keys of child criteria for derived criteria
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children_criteria: Option<Vec<String>>,
    /// `UNION`, `INTERSECT` or `XPRODUCT`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub derivation_operator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subset_operators: Option<Vec<SubsetOperator>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temporal_references: Option<Vec<TemporalReference>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CriteriaValue>,
    /// Field key -> value; blank fields arrive as `null`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_values: Option<IndexMap<String, Option<CriteriaValue>>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_occurrence: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub specific_occurrence_const: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<bool>,
    /// Key of the source data criteria this entry derives from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_data_criteria: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<Vec<String>>,
    /// Remaining fields, preserved as-is
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl DataCriteria {
    /// Create a plain criteria with a description
    pub fn described(description: impl Into<String>) -> Self {
        Self {
            description: Some(description.into()),
            ..Self::default()
        }
    }

    pub fn description(&self) -> &str {
        self.description.as_deref().unwrap_or_default()
    }

    pub fn is_variable(&self) -> bool {
        self.variable.unwrap_or(false)
    }

    pub fn is_negated(&self) -> bool {
        self.negation.unwrap_or(false)
    }

    pub fn is_derived(&self) -> bool {
        self.criteria_type.as_deref() == Some("derived")
    }

    pub fn is_characteristic(&self) -> bool {
        self.criteria_type.as_deref() == Some("characteristic")
    }

    /// Child criteria keys, empty when absent
    pub fn children(&self) -> &[String] {
        self.children_criteria.as_deref().unwrap_or_default()
    }

    /// Temporal references, empty when absent
    pub fn temporal_references(&self) -> &[TemporalReference] {
        self.temporal_references.as_deref().unwrap_or_default()
    }

    /// Subset operators, empty when absent
    pub fn subset_operators(&self) -> &[SubsetOperator] {
        self.subset_operators.as_deref().unwrap_or_default()
    }

    /// All `(code system, code)` pairs of the inline code list
    pub fn inline_codes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.inline_code_list.iter().flat_map(|list| {
            list.iter().flat_map(|(system, codes)| {
                codes
                    .iter()
                    .map(move |code| (system.as_str(), code.as_str()))
            })
        })
    }
}

/// Subset operator applied to a criteria (`COUNT`, `FIRST`, `RECENT`, ...)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsetOperator {
    #[serde(rename = "type")]
    pub operator_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<CriteriaValue>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// Temporal relationship between a criteria and another criteria or the
/// measurement period
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalReference {
    /// Timing code (`DURING`, `SBS`, `EAE`, ...)
    #[serde(rename = "type")]
    pub timing: String,
    /// Referenced criteria key or `MeasurePeriod`
    pub reference: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<CriteriaValue>,
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_inline_codes_are_flattened() {
        let dc: DataCriteria = serde_json::from_value(json!({
            "description": "Laboratory Test, Performed: Urine Protein Tests",
            "inline_code_list": {"LOINC": ["5195-3", "5196-1"], "SNOMEDCT": ["123"]}
        }))
        .unwrap();

        let codes: Vec<_> = dc.inline_codes().collect();
        assert_eq!(
            codes,
            vec![("LOINC", "5195-3"), ("LOINC", "5196-1"), ("SNOMEDCT", "123")]
        );
    }

    #[test]
    fn test_null_flags_default_to_false() {
        let dc: DataCriteria = serde_json::from_value(json!({
            "description": "Patient Characteristic Birthdate",
            "variable": null,
            "negation": null,
            "type": "characteristic"
        }))
        .unwrap();

        assert!(!dc.is_variable());
        assert!(!dc.is_negated());
        assert!(dc.is_characteristic());
        assert!(dc.children().is_empty());
    }

    #[test]
    fn test_blank_field_values_are_kept() {
        let dc: DataCriteria = serde_json::from_value(json!({
            "field_values": {"FACILITY_LOCATION": null, "ORDINAL": {"type": "CD", "code_list_id": "1.2"}}
        }))
        .unwrap();

        let fields = dc.field_values.unwrap();
        assert!(fields["FACILITY_LOCATION"].is_none());
        assert!(fields["ORDINAL"].is_some());
    }
}
