//! Value set references and the value set catalogue

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

use cqm_diagnostics::{CQM0003, CqmError};
use cqm_elm::Library;

use crate::drc::DirectReferenceCode;

/// A value set the measure depends on
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ValueSetReference {
    pub oid: String,
    /// Empty for direct reference codes and unversioned declarations
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Distinct value sets declared by `libraries`, then one per direct reference code
pub fn value_set_references(libraries: &[Library], drcs: &[DirectReferenceCode]) -> Vec<ValueSetReference> {
    let declared = libraries
        .iter()
        .flat_map(Library::value_sets)
        .map(|value_set| ValueSetReference {
            oid: value_set.id.clone(),
            version: value_set.version.clone().unwrap_or_default(),
            profile: value_set.profile.clone(),
        });
    let direct = drcs.iter().map(|drc| ValueSetReference {
        oid: drc.guid.clone(),
        version: String::new(),
        profile: None,
    });

    declared
        .chain(direct)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}

/// A code inside a value set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Concept {
    pub code: String,
    pub code_system_name: String,
    #[serde(default)]
    pub code_system_version: String,
    #[serde(default)]
    pub display_name: String,
}

/// An expanded value set as returned by the terminology service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSet {
    pub oid: String,
    pub display_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub concepts: Vec<Concept>,
}

impl ValueSet {
    /// Single-concept value set standing for a direct reference code
    pub fn from_direct_reference_code(drc: &DirectReferenceCode) -> Self {
        Self {
            oid: drc.guid.clone(),
            display_name: drc.display_name.clone(),
            version: String::new(),
            concepts: vec![Concept {
                code: drc.code.clone(),
                code_system_name: drc.code_system_name.clone(),
                code_system_version: drc.code_system_version.clone(),
                display_name: drc.display_name.clone(),
            }],
        }
    }
}

/// Value sets by OID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValueSetCatalog {
    value_sets: IndexMap<String, ValueSet>,
}

impl ValueSetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a JSON array of value sets
    pub fn from_json(input: &str) -> Result<Self, CqmError> {
        let value_sets: Vec<ValueSet> = serde_json::from_str(input)
            .map_err(|e| CqmError::input(CQM0003, format!("invalid value set list: {}", e)))?;
        Ok(value_sets.into_iter().collect())
    }

    /// Add a value set; a later entry for the same OID replaces the earlier one
    pub fn insert(&mut self, value_set: ValueSet) {
        self.value_sets.insert(value_set.oid.clone(), value_set);
    }

    pub fn with_direct_reference_codes(mut self, drcs: &[DirectReferenceCode]) -> Self {
        for drc in drcs {
            self.insert(ValueSet::from_direct_reference_code(drc));
        }
        self
    }

    pub fn get(&self, oid: &str) -> Option<&ValueSet> {
        self.value_sets.get(oid)
    }

    pub fn len(&self) -> usize {
        self.value_sets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.value_sets.is_empty()
    }

    /// Display name of `oid`, or the OID itself when it is not catalogued
    pub fn translate_oid<'a>(&'a self, oid: &'a str) -> &'a str {
        self.get(oid).map_or(oid, |value_set| value_set.display_name.as_str())
    }
}

impl FromIterator<ValueSet> for ValueSetCatalog {
    fn from_iter<I: IntoIterator<Item = ValueSet>>(iter: I) -> Self {
        let mut catalog = Self::new();
        for value_set in iter {
            catalog.insert(value_set);
        }
        catalog
    }
}
