//! Direct reference codes
//!
//! A code referenced directly in CQL (`code "Birthdate": '21112-8' from "LOINC"`)
//! has no value set OID. It is given a synthetic one derived from its content,
//! so loading the same logic twice yields the same identifier.

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use cqm_elm::{CodeDef, CodeSystemDef, Library};

use crate::code_system::normalize_code_system_name;

/// Prefix of every direct reference code identifier
pub const DRC_PREFIX: &str = "drc-";

/// A single code referenced directly from CQL
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DirectReferenceCode {
    /// Synthetic value set OID
    pub guid: String,
    pub code_system_name: String,
    pub code: String,
    pub display_name: String,
    pub code_system_version: String,
}

impl DirectReferenceCode {
    pub fn new(
        code_system_name: impl Into<String>,
        code: impl Into<String>,
        display_name: impl Into<String>,
        code_system_version: impl Into<String>,
    ) -> Self {
        let code_system_name = code_system_name.into();
        let code = code.into();
        let display_name = display_name.into();
        let code_system_version = code_system_version.into();
        let guid = Self::guid_for(&code_system_name, &code, &display_name, &code_system_version);

        Self {
            guid,
            code_system_name,
            code,
            display_name,
            code_system_version,
        }
    }

    /// Identifier of a `(system, code, display name, system version)` tuple
    pub fn guid_for(code_system_name: &str, code: &str, display_name: &str, code_system_version: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(
            format!("{} {} {} {}", code_system_name, code, display_name, code_system_version).as_bytes(),
        );
        format!("{}{}", DRC_PREFIX, hex::encode(hasher.finalize()))
    }

    /// Whether this identity covers `code` in `code_system`
    ///
    /// Code system names are compared after normalization.
    pub fn matches(&self, code_system: &str, code: &str) -> bool {
        self.code == code
            && normalize_code_system_name(&self.code_system_name) == normalize_code_system_name(code_system)
    }
}

/// Collect the direct reference codes declared by `libraries`, without duplicates
pub fn extract_direct_reference_codes(libraries: &[Library]) -> Vec<DirectReferenceCode> {
    let mut seen = IndexSet::new();
    let mut codes = Vec::new();

    for library in libraries {
        for code in library.codes() {
            let Some(system) = code_system_of(code, library, libraries) else {
                tracing::debug!(
                    library = library.name(),
                    code = code.name.as_str(),
                    code_system = code.code_system.name.as_str(),
                    "Code references an undeclared code system"
                );
                continue;
            };

            let drc = DirectReferenceCode::new(
                system.name.as_str(),
                code.id.as_str(),
                code.name.as_str(),
                system.version.as_deref().unwrap_or_default(),
            );
            if seen.insert(drc.guid.clone()) {
                codes.push(drc);
            }
        }
    }

    codes
}

/// The code system a code belongs to, following an include alias when the
/// system is declared in another library
fn code_system_of<'a>(code: &CodeDef, owning: &'a Library, libraries: &'a [Library]) -> Option<&'a CodeSystemDef> {
    match code.code_system.library_name.as_deref() {
        None | Some("") => owning.code_system(&code.code_system.name),
        Some(alias) => {
            let path = &owning.include(alias)?.path;
            libraries
                .iter()
                .find(|library| library.name() == path)?
                .code_system(&code.code_system.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guid_is_deterministic() {
        let first = DirectReferenceCode::new("LOINC", "21112-8", "Birth date", "2.46");
        let second = DirectReferenceCode::new("LOINC", "21112-8", "Birth date", "2.46");

        assert_eq!(first.guid, second.guid);
        assert!(first.guid.starts_with(DRC_PREFIX));
        assert_eq!(first.guid.len(), DRC_PREFIX.len() + 64);
    }

    #[test]
    fn test_guid_depends_on_every_component() {
        let base = DirectReferenceCode::guid_for("LOINC", "21112-8", "Birth date", "2.46");

        assert_ne!(base, DirectReferenceCode::guid_for("SNOMEDCT", "21112-8", "Birth date", "2.46"));
        assert_ne!(base, DirectReferenceCode::guid_for("LOINC", "21112-9", "Birth date", "2.46"));
        assert_ne!(base, DirectReferenceCode::guid_for("LOINC", "21112-8", "Birthdate", "2.46"));
        assert_ne!(base, DirectReferenceCode::guid_for("LOINC", "21112-8", "Birth date", ""));
    }

    #[test]
    fn test_guid_of_known_input() {
        assert_eq!(
            DirectReferenceCode::guid_for("LOINC", "21112-8", "Birth date", "2.46"),
            "drc-033cc1af35c8a0839e1e144292784cc2b1e39fdd88b9637e6dd6d15f3184d6e7"
        );
    }

    #[test]
    fn test_matches_normalizes_code_system() {
        let drc = DirectReferenceCode::new("SNOMEDCT", "419099009", "Dead", "");

        assert!(drc.matches("SNOMED-CT", "419099009"));
        assert!(drc.matches("SNOMEDCT", "419099009"));
        assert!(!drc.matches("LOINC", "419099009"));
        assert!(!drc.matches("SNOMEDCT", "419099008"));
    }
}
