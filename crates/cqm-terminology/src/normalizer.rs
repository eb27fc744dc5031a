//! Assigning direct reference code identities to data criteria
//!
//! HQMF data criteria built from a direct reference code carry the code in an
//! inline code list instead of a `code_list_id`. The matching identity's guid
//! becomes their `code_list_id`, on the criteria and on its `<key>_source`
//! counterpart.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cqm_hqmf::{DataCriteria, Measure};

use crate::drc::DirectReferenceCode;

/// Suffix pairing a data criteria with its source data criteria
const SOURCE_SUFFIX: &str = "_source";

/// One `code_list_id` assigned by the normalizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrcAssignment {
    pub criteria_key: String,
    pub guid: String,
    /// Whether a `<key>_source` entry was updated as well
    pub source_updated: bool,
}

/// Set `code_list_id` on criteria whose inline codes match a known identity
///
/// Criteria that already have a `code_list_id` are left alone. Criteria with
/// no matching identity are left without one.
pub fn assign_direct_reference_code_ids(
    data_criteria: &mut IndexMap<String, DataCriteria>,
    source_data_criteria: &mut IndexMap<String, DataCriteria>,
    drcs: &[DirectReferenceCode],
) -> Vec<DrcAssignment> {
    let mut assignments = Vec::new();

    for (key, criteria) in data_criteria.iter_mut() {
        if criteria.code_list_id.is_some() || criteria.inline_code_list.is_none() {
            continue;
        }

        let Some(drc) = matching_identity(criteria, drcs) else {
            tracing::debug!(criteria = key.as_str(), "No direct reference code matches inline codes");
            continue;
        };

        criteria.code_list_id = Some(drc.guid.clone());
        let source_updated = match source_data_criteria.get_mut(&format!("{}{}", key, SOURCE_SUFFIX)) {
            Some(source) => {
                source.code_list_id = Some(drc.guid.clone());
                true
            }
            None => false,
        };

        assignments.push(DrcAssignment {
            criteria_key: key.clone(),
            guid: drc.guid.clone(),
            source_updated,
        });
    }

    tracing::debug!(assigned = assignments.len(), "Assigned direct reference code ids");
    assignments
}

/// Normalize a measure's data criteria in place
pub fn normalize_measure(measure: &mut Measure, drcs: &[DirectReferenceCode]) -> Vec<DrcAssignment> {
    assign_direct_reference_code_ids(&mut measure.data_criteria, &mut measure.source_data_criteria, drcs)
}

fn matching_identity<'a>(criteria: &DataCriteria, drcs: &'a [DirectReferenceCode]) -> Option<&'a DirectReferenceCode> {
    criteria
        .inline_codes()
        .find_map(|(system, code)| drcs.iter().find(|drc| drc.matches(system, code)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cqm_hqmf::InlineCodeList;
    use pretty_assertions::assert_eq;

    fn with_inline(system: &str, code: &str) -> DataCriteria {
        let mut list = InlineCodeList::new();
        list.insert(system.to_string(), vec![code.to_string()]);
        DataCriteria {
            inline_code_list: Some(list),
            ..DataCriteria::described("Patient Characteristic Expired: Dead")
        }
    }

    #[test]
    fn test_assigns_guid_to_criteria_and_source() {
        let drc = DirectReferenceCode::new("SNOMEDCT", "419099009", "Dead", "2016-03");
        let mut data = IndexMap::from([("Dead".to_string(), with_inline("SNOMED-CT", "419099009"))]);
        let mut source = IndexMap::from([("Dead_source".to_string(), with_inline("SNOMED-CT", "419099009"))]);

        let assignments = assign_direct_reference_code_ids(&mut data, &mut source, &[drc.clone()]);

        assert_eq!(data["Dead"].code_list_id.as_deref(), Some(drc.guid.as_str()));
        assert_eq!(source["Dead_source"].code_list_id.as_deref(), Some(drc.guid.as_str()));
        assert_eq!(
            assignments,
            vec![DrcAssignment {
                criteria_key: "Dead".to_string(),
                guid: drc.guid,
                source_updated: true,
            }]
        );
    }

    #[test]
    fn test_no_match_is_a_no_op() {
        let drc = DirectReferenceCode::new("LOINC", "21112-8", "Birth date", "");
        let mut data = IndexMap::from([("Dead".to_string(), with_inline("SNOMEDCT", "419099009"))]);
        let mut source = IndexMap::new();

        let assignments = assign_direct_reference_code_ids(&mut data, &mut source, &[drc]);

        assert!(assignments.is_empty());
        assert_eq!(data["Dead"].code_list_id, None);
    }

    #[test]
    fn test_existing_code_list_id_is_kept() {
        let drc = DirectReferenceCode::new("SNOMEDCT", "419099009", "Dead", "");
        let mut criteria = with_inline("SNOMEDCT", "419099009");
        criteria.code_list_id = Some("2.16.840.1.113883.3.117.1.7.1.309".to_string());
        let mut data = IndexMap::from([("Dead".to_string(), criteria)]);

        assign_direct_reference_code_ids(&mut data, &mut IndexMap::new(), &[drc]);

        assert_eq!(
            data["Dead"].code_list_id.as_deref(),
            Some("2.16.840.1.113883.3.117.1.7.1.309")
        );
    }
}
