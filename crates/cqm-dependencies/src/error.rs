//! Resolution errors

use cqm_diagnostics::{CQM0101, CQM0102, CQM0103, CQM0104, CqmError, ErrorCode};
use std::fmt;
use thiserror::Error;

/// What made an ELM structure unresolvable
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureIssue {
    /// An alias is not declared in the library's includes
    UnknownAlias,
    /// A library named by an include is not part of the loaded set
    LibraryNotLoaded,
    /// A referenced statement is not defined in its library
    StatementNotFound,
}

impl StructureIssue {
    fn code(self) -> ErrorCode {
        match self {
            Self::UnknownAlias => CQM0101,
            Self::LibraryNotLoaded => CQM0102,
            Self::StatementNotFound => CQM0103,
        }
    }
}

impl fmt::Display for StructureIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownAlias => write!(f, "unknown alias"),
            Self::LibraryNotLoaded => write!(f, "library not loaded"),
            Self::StatementNotFound => write!(f, "statement not found"),
        }
    }
}

/// Errors raised while resolving statement dependencies
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ResolutionError {
    /// Malformed or incomplete ELM input
    #[error("Unexpected structure ({issue}): {message}")]
    UnexpectedStructure {
        issue: StructureIssue,
        message: String,
        library: String,
        statement: Option<String>,
    },

    /// Statement references nest deeper than the configured limit
    #[error("Maximum resolution depth {max_depth} exceeded at '{library}'.'{statement}'")]
    MaxDepthExceeded {
        library: String,
        statement: String,
        max_depth: usize,
    },
}

/// Resolution result
pub type ResolutionResult<T> = Result<T, ResolutionError>;

impl ResolutionError {
    pub fn unknown_alias(alias: &str, library: &str) -> Self {
        Self::UnexpectedStructure {
            issue: StructureIssue::UnknownAlias,
            message: format!("alias '{}' is not included by library '{}'", alias, library),
            library: library.to_string(),
            statement: None,
        }
    }

    pub fn library_not_loaded(name: &str) -> Self {
        Self::UnexpectedStructure {
            issue: StructureIssue::LibraryNotLoaded,
            message: format!("library '{}' is not loaded", name),
            library: name.to_string(),
            statement: None,
        }
    }

    pub fn statement_not_found(library: &str, statement: &str) -> Self {
        Self::UnexpectedStructure {
            issue: StructureIssue::StatementNotFound,
            message: format!("statement '{}' is not defined in library '{}'", statement, library),
            library: library.to_string(),
            statement: Some(statement.to_string()),
        }
    }

    /// Attach the statement being resolved when the error was raised
    pub fn within_statement(self, name: &str) -> Self {
        match self {
            Self::UnexpectedStructure {
                issue,
                message,
                library,
                statement: None,
            } => Self::UnexpectedStructure {
                issue,
                message: format!("{} (while resolving '{}')", message, name),
                library,
                statement: Some(name.to_string()),
            },
            other => other,
        }
    }

    /// The structural issue, for unexpected structure errors
    pub fn issue(&self) -> Option<StructureIssue> {
        match self {
            Self::UnexpectedStructure { issue, .. } => Some(*issue),
            Self::MaxDepthExceeded { .. } => None,
        }
    }
}

impl From<ResolutionError> for CqmError {
    fn from(err: ResolutionError) -> Self {
        let message = err.to_string();
        match err {
            ResolutionError::UnexpectedStructure {
                issue,
                library,
                statement,
                ..
            } => CqmError::Resolution {
                code: issue.code(),
                message,
                library: Some(library),
                statement,
            },
            ResolutionError::MaxDepthExceeded {
                library, statement, ..
            } => CqmError::Resolution {
                code: CQM0104,
                message,
                library: Some(library),
                statement: Some(statement),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_statement_fills_missing_statement() {
        let err = ResolutionError::unknown_alias("Global", "Main").within_statement("Numerator");

        match err {
            ResolutionError::UnexpectedStructure { statement, message, .. } => {
                assert_eq!(statement.as_deref(), Some("Numerator"));
                assert!(message.contains("while resolving 'Numerator'"));
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[test]
    fn test_conversion_keeps_names_and_code() {
        let err: CqmError = ResolutionError::statement_not_found("Hospice", "Has Hospice").into();

        assert_eq!(err.code(), CQM0103);
        assert_eq!(err.library(), Some("Hospice"));
        assert!(err.to_string().contains("Has Hospice"));
    }
}
