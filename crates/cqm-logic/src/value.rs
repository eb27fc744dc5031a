//! Rendering of criteria values

use cqm_hqmf::{CriteriaValue, value_types};
use cqm_terminology::ValueSetCatalog;

use crate::tables;

/// Render a value as a comparison clause
///
/// Scalars render as `<comparison>[=] <value> <unit>` (timestamps without the
/// space before the value). An interval whose bounds are equal and both
/// inclusive renders as its low bound alone; otherwise as `>` low `and` `<`
/// high. Coded values render the display name of their value set.
pub fn value_logic(value: &CriteriaValue, range_comparison: Option<&str>, catalog: Option<&ValueSetCatalog>) -> String {
    if value.is_any_non_null() {
        return String::new();
    }

    if value.is_scalar() {
        let mut line = String::from(range_comparison.unwrap_or_default());
        if value.is_inclusive() {
            line.push('=');
        }
        let scalar = value.value.as_deref().unwrap_or_default();
        if value.type_tag() == value_types::TS {
            line.push_str(scalar);
        } else {
            line.push(' ');
            line.push_str(scalar);
        }
        line.push(' ');
        if let Some(unit) = value.unit.as_deref() {
            line.push_str(&tables::unit(unit, scalar));
        }
        return line;
    }

    if value.is_interval() {
        return match (value.low.as_deref(), value.high.as_deref()) {
            (Some(low), Some(high)) if is_equivalent(low, high) => value_logic(low, None, catalog),
            (Some(low), Some(high)) => format!(
                "{} and {}",
                value_logic(low, Some(">"), catalog),
                value_logic(high, Some("<"), catalog)
            ),
            (None, Some(high)) => format!(" {}", value_logic(high, Some("<"), catalog)),
            (Some(low), None) => format!(" {}", value_logic(low, Some(">"), catalog)),
            (None, None) => String::new(),
        };
    }

    if value.type_tag() == value_types::CD {
        return format!(": {}", translate_oid(catalog, value.code_list_id.as_deref().unwrap_or_default()));
    }

    String::new()
}

fn is_equivalent(low: &CriteriaValue, high: &CriteriaValue) -> bool {
    low.value == high.value && low.is_inclusive() && high.is_inclusive()
}

/// Display name of a value set, or the OID when it is not catalogued
pub(crate) fn translate_oid<'a>(catalog: Option<&'a ValueSetCatalog>, oid: &'a str) -> &'a str {
    catalog.map_or(oid, |catalog| catalog.translate_oid(oid))
}
