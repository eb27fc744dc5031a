//! Criteria values: physical quantities, timestamps, intervals and codes

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// HQMF value type tags
pub mod value_types {
    pub const PQ: &str = "PQ";
    pub const TS: &str = "TS";
    pub const IVL_PQ: &str = "IVL_PQ";
    pub const IVL_TS: &str = "IVL_TS";
    pub const CD: &str = "CD";
    pub const ANY_NON_NULL: &str = "ANYNonNull";
}

/// A value attached to a data criteria, field, subset operator or temporal range
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CriteriaValue {
    /// Value type tag (`PQ`, `IVL_PQ`, `TS`, `CD`, `ANYNonNull`, ...)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub value_type: Option<String>,
    /// Scalar value, kept in its textual form
    #[serde(
        default,
        deserialize_with = "scalar_as_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<String>,
    /// Unit (UCUM or HQMF time unit)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Whether the bound is inclusive
    #[serde(rename = "inclusive?", default, skip_serializing_if = "Option::is_none")]
    pub inclusive: Option<bool>,
    /// Interval low bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub low: Option<Box<CriteriaValue>>,
    /// Interval high bound
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub high: Option<Box<CriteriaValue>>,
    /// Value set OID for coded values
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_list_id: Option<String>,
    /// Remaining fields, preserved as-is
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

impl CriteriaValue {
    /// Create a value of the given type
    pub fn of_type(value_type: impl Into<String>) -> Self {
        Self {
            value_type: Some(value_type.into()),
            ..Self::default()
        }
    }

    /// Physical quantity
    pub fn quantity(value: impl Into<String>, unit: Option<&str>, inclusive: bool) -> Self {
        Self {
            value: Some(value.into()),
            unit: unit.map(str::to_string),
            inclusive: Some(inclusive),
            ..Self::of_type(value_types::PQ)
        }
    }

    /// Physical quantity interval
    pub fn quantity_interval(low: Option<CriteriaValue>, high: Option<CriteriaValue>) -> Self {
        Self {
            low: low.map(Box::new),
            high: high.map(Box::new),
            ..Self::of_type(value_types::IVL_PQ)
        }
    }

    /// Type tag, empty when absent
    pub fn type_tag(&self) -> &str {
        self.value_type.as_deref().unwrap_or_default()
    }

    /// `IVL_PQ` or `IVL_TS`
    pub fn is_interval(&self) -> bool {
        matches!(self.type_tag(), value_types::IVL_PQ | value_types::IVL_TS)
    }

    /// `PQ` or `TS`
    pub fn is_scalar(&self) -> bool {
        matches!(self.type_tag(), value_types::PQ | value_types::TS)
    }

    pub fn is_any_non_null(&self) -> bool {
        self.type_tag() == value_types::ANY_NON_NULL
    }

    pub fn is_inclusive(&self) -> bool {
        self.inclusive.unwrap_or(false)
    }
}

/// Accept strings, numbers and booleans for scalar values
fn scalar_as_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        Some(Value::Bool(b)) => Some(b.to_string()),
        Some(other) => Some(other.to_string()),
    })
}
