//! Composite measure ELM merging

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use cqm_diagnostics::{CQM0110, Diagnostic};
use cqm_elm::{ElmAnnotations, Library};

/// The ELM libraries and annotations carried by one measure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ElmPackage {
    /// Libraries, each loaded bare or enveloped with `urn:oid:` prefixes stripped
    #[serde(default, deserialize_with = "cqm_elm::deserialize_libraries")]
    pub elm: Vec<Library>,
    #[serde(default)]
    pub elm_annotations: ElmAnnotations,
}

impl ElmPackage {
    pub fn new(elm: Vec<Library>) -> Self {
        Self {
            elm,
            elm_annotations: ElmAnnotations::new(),
        }
    }

    pub fn with_annotation(mut self, library: impl Into<String>, annotation: serde_json::Value) -> Self {
        self.elm_annotations.insert(library.into(), annotation);
        self
    }
}

/// A component of a composite measure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentMeasure {
    /// Set id of the component measure, used in collision warnings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hqmf_set_id: Option<String>,
    #[serde(flatten)]
    pub package: ElmPackage,
}

impl ComponentMeasure {
    pub fn new(hqmf_set_id: impl Into<String>, package: ElmPackage) -> Self {
        Self {
            hqmf_set_id: Some(hqmf_set_id.into()),
            package,
        }
    }

    fn label(&self, index: usize) -> String {
        self.hqmf_set_id
            .clone()
            .unwrap_or_else(|| format!("component #{}", index + 1))
    }
}

/// Result of merging a composite measure with its components
#[derive(Debug, Clone, Default)]
pub struct CompositeElm {
    /// Composite libraries followed by each component's libraries
    pub elm: Vec<Library>,
    pub elm_annotations: ElmAnnotations,
    /// Library name collisions between components
    pub warnings: Vec<Diagnostic>,
}

/// Merge component measures' ELM into the composite's library pool
///
/// Library order is preserved. Annotations are merged component by
/// component; the composite's own entries win on key conflicts. Components
/// declaring the same library name are reported but not rejected.
pub fn merge_component_elm(composite: &ElmPackage, components: &[ComponentMeasure]) -> CompositeElm {
    let mut elm = composite.elm.clone();
    let mut elm_annotations = ElmAnnotations::new();
    let mut warnings = Vec::new();
    let mut owners: IndexMap<String, String> = IndexMap::new();

    for (index, component) in components.iter().enumerate() {
        let label = component.label(index);
        for library in &component.package.elm {
            match owners.get(library.name()) {
                Some(owner) if *owner != label => {
                    tracing::warn!(
                        library = library.name(),
                        first = owner.as_str(),
                        second = label.as_str(),
                        "Components declare the same library"
                    );
                    warnings.push(
                        Diagnostic::warning(
                            CQM0110,
                            format!(
                                "library '{}' is declared by both {} and {}",
                                library.name(),
                                owner,
                                label
                            ),
                        )
                        .with_library(library.name()),
                    );
                }
                Some(_) => {}
                None => {
                    owners.insert(library.name().to_string(), label.clone());
                }
            }
        }

        elm.extend(component.package.elm.iter().cloned());
        for (key, annotation) in &component.package.elm_annotations {
            elm_annotations.insert(key.clone(), annotation.clone());
        }
    }

    for (key, annotation) in &composite.elm_annotations {
        elm_annotations.insert(key.clone(), annotation.clone());
    }

    tracing::debug!(
        libraries = elm.len(),
        components = components.len(),
        "Merged composite ELM"
    );

    CompositeElm {
        elm,
        elm_annotations,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn library(name: &str) -> Library {
        Library::new(name, Some("1.0"))
    }

    #[test]
    fn test_libraries_in_order() {
        let composite = ElmPackage::new(vec![library("Composite")]);
        let components = vec![
            ComponentMeasure::new("A", ElmPackage::new(vec![library("ComponentA"), library("Shared")])),
            ComponentMeasure::new("B", ElmPackage::new(vec![library("ComponentB")])),
        ];

        let merged = merge_component_elm(&composite, &components);
        let names: Vec<_> = merged.elm.iter().map(Library::name).collect();

        assert_eq!(names, vec!["Composite", "ComponentA", "Shared", "ComponentB"]);
        assert!(merged.warnings.is_empty());
    }

    #[test]
    fn test_composite_annotations_take_precedence() {
        let composite = ElmPackage::new(vec![]).with_annotation("Shared", json!({"from": "composite"}));
        let components = vec![ComponentMeasure::new(
            "A",
            ElmPackage::new(vec![])
                .with_annotation("Shared", json!({"from": "component"}))
                .with_annotation("ComponentA", json!({"from": "component"})),
        )];

        let merged = merge_component_elm(&composite, &components);

        assert_eq!(merged.elm_annotations["Shared"], json!({"from": "composite"}));
        assert_eq!(merged.elm_annotations["ComponentA"], json!({"from": "component"}));
    }

    #[test]
    fn test_collision_between_components_warns() {
        let components = vec![
            ComponentMeasure::new("A", ElmPackage::new(vec![library("Shared")])),
            ComponentMeasure::new("B", ElmPackage::new(vec![library("Shared")])),
        ];

        let merged = merge_component_elm(&ElmPackage::default(), &components);

        assert_eq!(merged.elm.len(), 2);
        assert_eq!(merged.warnings.len(), 1);
        assert_eq!(merged.warnings[0].code, CQM0110);
        assert!(merged.warnings[0].message.contains("'Shared'"));
    }

    #[test]
    fn test_component_libraries_load_enveloped_with_oids_stripped() {
        let component: ComponentMeasure = serde_json::from_value(json!({
            "hqmf_set_id": "component-a",
            "elm": [
                {"library": {
                    "identifier": {"id": "ComponentA", "version": "1.0"},
                    "valueSets": {"def": [{"name": "Visit", "id": "urn:oid:1.2.3"}]}
                }},
                {"identifier": {"id": "Bare"}, "codeSystems": {"def": [{"name": "LOINC", "id": "urn:oid:2.16.840.1.113883.6.1"}]}}
            ],
            "elm_annotations": {"ComponentA": {"x": 1}}
        }))
        .unwrap();

        let names: Vec<_> = component.package.elm.iter().map(Library::name).collect();
        assert_eq!(names, vec!["ComponentA", "Bare"]);
        assert_eq!(component.package.elm[0].value_sets()[0].id, "1.2.3");
        assert_eq!(component.package.elm[1].code_systems()[0].id, "2.16.840.1.113883.6.1");
        assert_eq!(component.package.elm_annotations["ComponentA"], json!({"x": 1}));
    }
}
