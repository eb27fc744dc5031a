//! Tests for loading measure documents as exported by the HQMF parser
//!
//! Covers:
//! - Population criteria with nested preconditions
//! - Data and source data criteria with values, fields and temporal references
//! - Preservation of fields the tooling does not interpret

use cqm_hqmf::{Measure, PreconditionNode, value_types};
use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::json;

fn measure_json() -> serde_json::Value {
    json!({
        "hqmf_id": "40280381-3D27-5493-013D-4DCA4B826AE4",
        "hqmf_set_id": "3FD13096-2C8F-40B5-9297-B714E8DE9133",
        "cms_id": "CMS104v2",
        "title": "Discharged on Antithrombotic Therapy",
        "measure_period": {"type": "IVL_TS"},
        "population_criteria": {
            "IPP": {
                "type": "IPP",
                "title": "Initial Patient Population",
                "preconditions": [{
                    "id": 1,
                    "conjunction_code": "allTrue",
                    "preconditions": [
                        {"id": 2, "reference": "EncounterInpatient"},
                        {"id": 3, "reference": "AgeOver18"}
                    ]
                }]
            },
            "DENOM": {"type": "DENOM", "title": "Denominator"}
        },
        "data_criteria": {
            "EncounterInpatient": {
                "title": "Encounter, Performed: Inpatient",
                "description": "Encounter, Performed: Inpatient",
                "code_list_id": "2.16.840.1.113883.3.666.5.307",
                "type": "encounters",
                "definition": "encounter",
                "status": "performed",
                "field_values": {
                    "LENGTH_OF_STAY": {
                        "type": "IVL_PQ",
                        "high": {"type": "PQ", "unit": "d", "value": "120", "inclusive?": true}
                    }
                },
                "temporal_references": [{"type": "EDU", "reference": "MeasurePeriod"}],
                "hqmf_template_id": "2.16.840.1.113883.10.20.28.3.5"
            },
            "AgeOver18": {
                "description": "Patient Characteristic Birthdate: birth date",
                "type": "characteristic",
                "value": {"type": "IVL_PQ", "low": {"type": "PQ", "value": 18, "unit": "a", "inclusive?": true}}
            }
        },
        "source_data_criteria": {
            "EncounterInpatient_source": {
                "description": "Encounter, Performed: Inpatient",
                "source_data_criteria": "EncounterInpatient_source"
            }
        },
        "populations": [{"IPP": "IPP", "DENOM": "DENOM"}]
    })
}

#[test]
fn test_load_measure_document() {
    let measure: Measure = serde_json::from_value(measure_json()).unwrap();

    assert_eq!(measure.cms_id.as_deref(), Some("CMS104v2"));
    assert_eq!(measure.population_codes(), vec!["IPP", "DENOM"]);
    assert_eq!(measure.data_criteria.len(), 2);
    assert_eq!(measure.populations.len(), 1);
}

#[test]
fn test_root_precondition_children() {
    let measure: Measure = serde_json::from_value(measure_json()).unwrap();
    let root = measure.population_criteria["IPP"].root().unwrap();

    match root.node() {
        PreconditionNode::Internal(children) => {
            let refs: Vec<_> = children.iter().filter_map(|c| c.reference.as_deref()).collect();
            assert_eq!(refs, vec!["EncounterInpatient", "AgeOver18"]);
        }
        other => panic!("expected internal node, got {:?}", other),
    }
    assert!(measure.population_criteria["DENOM"].root().is_none());
}

#[test]
fn test_field_and_temporal_details() {
    let measure: Measure = serde_json::from_value(measure_json()).unwrap();
    let encounter = &measure.data_criteria["EncounterInpatient"];

    let fields = encounter.field_values.as_ref().unwrap();
    let stay = fields["LENGTH_OF_STAY"].as_ref().unwrap();
    assert_eq!(stay.type_tag(), value_types::IVL_PQ);
    assert_eq!(encounter.temporal_references()[0].timing, "EDU");
    assert_eq!(encounter.temporal_references()[0].reference, "MeasurePeriod");
}

#[rstest]
#[case("measure_period")]
#[case("hqmf_set_id")]
fn test_unknown_measure_fields_are_preserved(#[case] key: &str) {
    let measure: Measure = serde_json::from_value(measure_json()).unwrap();
    let back = serde_json::to_value(&measure).unwrap();

    assert_eq!(back[key], measure_json()[key]);
}

#[test]
fn test_criteria_extra_fields_roundtrip() {
    let measure: Measure = serde_json::from_value(measure_json()).unwrap();
    let back = serde_json::to_value(&measure).unwrap();

    assert_eq!(
        back["data_criteria"]["EncounterInpatient"]["hqmf_template_id"],
        json!("2.16.840.1.113883.10.20.28.3.5")
    );
}

#[test]
fn test_invalid_document_is_an_input_error() {
    let err = Measure::from_json("{\"population_criteria\": 3}").unwrap_err();

    assert!(err.code().is_input_error());
}
