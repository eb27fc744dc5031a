//! Library alias resolution

use cqm_elm::Library;

use crate::error::{ResolutionError, ResolutionResult};

/// Resolve an include alias used inside `owning` to the included library's name
///
/// A missing or empty alias is a reference into `owning` itself.
pub fn alias_to_library_name(alias: Option<&str>, owning: &Library) -> ResolutionResult<String> {
    match alias.filter(|a| !a.is_empty()) {
        None => Ok(owning.name().to_string()),
        Some(alias) => owning
            .include(alias)
            .map(|include| include.path.clone())
            .ok_or_else(|| ResolutionError::unknown_alias(alias, owning.name())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StructureIssue;
    use rstest::rstest;

    fn main_library() -> Library {
        Library::new("Main", Some("1.0.0"))
            .with_include("Global", "MATGlobalCommonFunctions")
            .with_include("Hospice", "Hospice")
    }

    #[rstest]
    #[case(None, "Main")]
    #[case(Some(""), "Main")]
    #[case(Some("Global"), "MATGlobalCommonFunctions")]
    #[case(Some("Hospice"), "Hospice")]
    fn test_resolves_alias(#[case] alias: Option<&str>, #[case] expected: &str) {
        assert_eq!(alias_to_library_name(alias, &main_library()).unwrap(), expected);
    }

    #[test]
    fn test_unknown_alias_is_unexpected_structure() {
        let err = alias_to_library_name(Some("SDE"), &main_library()).unwrap_err();

        assert_eq!(err.issue(), Some(StructureIssue::UnknownAlias));
        assert!(err.to_string().contains("'SDE'"));
    }
}
