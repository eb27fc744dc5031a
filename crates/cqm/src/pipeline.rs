//! Measure loading pipeline
//!
//! Runs every derivation a measure package needs after its ELM and HQMF have
//! been parsed, in this order:
//!
//! 1. Composite merge, when component measures are given
//! 2. Statement dependency resolution for the main library
//! 3. Statement complexity of the main library
//! 4. Direct reference code extraction
//! 5. Data criteria normalization with the extracted codes
//! 6. Value set references
//! 7. Population logic rendering
//!
//! Resolution failures abort the load. Logic rendering failures do not: the
//! rendered logic degrades to a single error line and a warning is recorded.

use serde::{Deserialize, Serialize};

use cqm_dependencies::{
    ComponentMeasure, DependencyMap, DependencyResolver, ElmPackage, ResolverOptions, StatementComplexity,
    merge_component_elm, statement_complexity,
};
use cqm_diagnostics::{CQM0200, CQM0401, CqmError, Diagnostic, Result};
use cqm_elm::{ElmAnnotations, Library};
use cqm_hqmf::Measure;
use cqm_logic::{ExtractorOptions, LogicExtractor, MeasureDiff, MeasureLogic, diff_measure_logic, error_logic};
use cqm_terminology::{
    DirectReferenceCode, DrcAssignment, ValueSetCatalog, ValueSetReference, extract_direct_reference_codes,
    normalize_measure, value_set_references,
};

/// Everything derived from a measure package
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedMeasure {
    pub main_library: String,
    /// The library pool, composite libraries first
    pub elm: Vec<Library>,
    pub elm_annotations: ElmAnnotations,
    pub dependencies: DependencyMap,
    pub complexity: Vec<StatementComplexity>,
    pub direct_reference_codes: Vec<DirectReferenceCode>,
    pub drc_assignments: Vec<DrcAssignment>,
    pub value_set_references: Vec<ValueSetReference>,
    /// The normalized measure
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measure: Option<Measure>,
    #[serde(default)]
    pub measure_logic: MeasureLogic,
    #[serde(default)]
    pub warnings: Vec<Diagnostic>,
}

impl LoadedMeasure {
    /// Diff this measure's logic against another version of it
    pub fn diff_logic(&self, other: &LoadedMeasure, by_population: bool) -> MeasureDiff {
        let cms_id = self.measure.as_ref().and_then(|m| m.cms_id.clone());
        diff_measure_logic(cms_id, &self.measure_logic, &other.measure_logic, by_population)
    }
}

/// Builder for a measure load
#[derive(Debug, Clone, Default)]
pub struct MeasureLoader {
    main_library: String,
    package: ElmPackage,
    components: Vec<ComponentMeasure>,
    measure: Option<Measure>,
    value_sets: Option<ValueSetCatalog>,
    resolver_options: ResolverOptions,
    extractor_options: ExtractorOptions,
}

impl MeasureLoader {
    pub fn new(main_library: impl Into<String>, libraries: Vec<Library>) -> Self {
        Self {
            main_library: main_library.into(),
            package: ElmPackage::new(libraries),
            ..Self::default()
        }
    }

    pub fn with_annotations(mut self, annotations: ElmAnnotations) -> Self {
        self.package.elm_annotations = annotations;
        self
    }

    /// Treat the measure as a composite of `components`
    pub fn with_components(mut self, components: Vec<ComponentMeasure>) -> Self {
        self.components = components;
        self
    }

    pub fn with_measure(mut self, measure: Measure) -> Self {
        self.measure = Some(measure);
        self
    }

    /// Value sets used to render coded values by name
    pub fn with_value_sets(mut self, catalog: ValueSetCatalog) -> Self {
        self.value_sets = Some(catalog);
        self
    }

    pub fn with_resolver_options(mut self, options: ResolverOptions) -> Self {
        self.resolver_options = options;
        self
    }

    pub fn with_extractor_options(mut self, options: ExtractorOptions) -> Self {
        self.extractor_options = options;
        self
    }

    pub fn load(self) -> Result<LoadedMeasure> {
        if self.main_library.is_empty() {
            return Err(CqmError::system(CQM0401, "no main library given"));
        }

        let mut warnings = Vec::new();
        let (elm, elm_annotations) = if self.components.is_empty() {
            (self.package.elm, self.package.elm_annotations)
        } else {
            let composite = merge_component_elm(&self.package, &self.components);
            warnings.extend(composite.warnings);
            (composite.elm, composite.elm_annotations)
        };
        tracing::debug!(
            main_library = self.main_library.as_str(),
            libraries = elm.len(),
            components = self.components.len(),
            "Loading measure"
        );

        let dependencies = DependencyResolver::new(&elm)
            .with_options(self.resolver_options)
            .resolve(&self.main_library)?;

        let complexity = elm
            .iter()
            .find(|library| library.name() == self.main_library)
            .map(statement_complexity)
            .unwrap_or_default();

        let direct_reference_codes = extract_direct_reference_codes(&elm);
        let value_set_references = value_set_references(&elm, &direct_reference_codes);

        let mut measure = self.measure;
        let mut drc_assignments = Vec::new();
        let mut measure_logic = MeasureLogic::new();
        if let Some(measure) = measure.as_mut() {
            drc_assignments = normalize_measure(measure, &direct_reference_codes);
            warnings.extend(unmatched_inline_codes(measure));

            let catalog = self
                .value_sets
                .unwrap_or_default()
                .with_direct_reference_codes(&direct_reference_codes);
            let extractor = LogicExtractor::new(measure)
                .with_value_sets(&catalog)
                .with_options(self.extractor_options);
            measure_logic = match extractor.population_logic() {
                Ok(logic) => logic,
                Err(err) => {
                    tracing::warn!(error = %err, "Substituting error line for measure logic");
                    warnings.push(Diagnostic::warning(err.code(), err.to_string()));
                    error_logic(&err)
                }
            };
        }

        Ok(LoadedMeasure {
            main_library: self.main_library,
            elm,
            elm_annotations,
            dependencies,
            complexity,
            direct_reference_codes,
            drc_assignments,
            value_set_references,
            measure,
            measure_logic,
            warnings,
        })
    }
}

fn unmatched_inline_codes(measure: &Measure) -> Vec<Diagnostic> {
    measure
        .data_criteria
        .iter()
        .filter(|(_, criteria)| criteria.code_list_id.is_none() && criteria.inline_code_list.is_some())
        .map(|(key, _)| {
            Diagnostic::info(CQM0200, format!("data criteria '{}' keeps its inline codes", key))
        })
        .collect()
}
