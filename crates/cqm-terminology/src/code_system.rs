//! Code system name normalization
//!
//! Authoring tools spell the same code system several ways (`ICD-9`,
//! `ICD9CM`, ...). Names are mapped onto one canonical spelling before codes
//! from different sources are compared.

use std::collections::HashMap;
use std::sync::LazyLock;

static CANONICAL_NAMES: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("ICD-9", "ICD-9-CM"),
        ("ICD9CM", "ICD-9-CM"),
        ("ICD9PCS", "ICD-9-PCS"),
        ("ICD-10", "ICD-10-CM"),
        ("ICD10CM", "ICD-10-CM"),
        ("ICD10PCS", "ICD-10-PCS"),
        ("HL7 (2.16.840.1.113883.5.1)", "HL7"),
        ("SNOMEDCT", "SNOMED-CT"),
        ("CDCREC", "CDC Race"),
        ("RXNORM", "RxNorm"),
    ])
});

/// Grouping systems whose codes never identify clinical concepts
const IGNORED_CODE_SYSTEMS: &[&str] = &["Grouping", "GROUPING", "HL7", "Administrative Sex", "CDC"];

/// Canonical spelling of a code system name; unknown names are returned as-is
pub fn normalize_code_system_name(name: &str) -> &str {
    CANONICAL_NAMES.get(name).copied().unwrap_or(name)
}

pub fn is_ignored_code_system(name: &str) -> bool {
    IGNORED_CODE_SYSTEMS.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("ICD-9", "ICD-9-CM")]
    #[case("ICD9CM", "ICD-9-CM")]
    #[case("ICD10PCS", "ICD-10-PCS")]
    #[case("SNOMEDCT", "SNOMED-CT")]
    #[case("RXNORM", "RxNorm")]
    #[case("LOINC", "LOINC")]
    #[case("SNOMED-CT", "SNOMED-CT")]
    fn test_normalize_code_system_name(#[case] name: &str, #[case] expected: &str) {
        assert_eq!(normalize_code_system_name(name), expected);
    }

    #[test]
    fn test_ignored_systems() {
        assert!(is_ignored_code_system("GROUPING"));
        assert!(is_ignored_code_system("Administrative Sex"));
        assert!(!is_ignored_code_system("LOINC"));
    }
}
