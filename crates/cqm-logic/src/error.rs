//! Logic extraction errors

use cqm_diagnostics::{CQM0301, CQM0302, CQM0303, CQM0304, CqmError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("data criteria '{reference}' not found")]
    CriteriaNotFound { reference: String },

    #[error("precondition has neither children nor a reference")]
    EmptyPrecondition,

    #[error("unknown temporal relationship '{timing}'")]
    UnknownTiming { timing: String },

    #[error("satisfies criteria '{reference}' has no children")]
    SatisfiesWithoutChildren { reference: String },

    #[error("logic nesting exceeds {max_depth} levels")]
    MaxDepthExceeded { max_depth: usize },
}

pub type ExtractResult<T> = Result<T, ExtractError>;

impl ExtractError {
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::CriteriaNotFound { .. } | Self::EmptyPrecondition => CQM0301,
            Self::UnknownTiming { .. } => CQM0302,
            Self::MaxDepthExceeded { .. } => CQM0303,
            Self::SatisfiesWithoutChildren { .. } => CQM0304,
        }
    }

    fn reference(&self) -> Option<&str> {
        match self {
            Self::CriteriaNotFound { reference } | Self::SatisfiesWithoutChildren { reference } => {
                Some(reference)
            }
            _ => None,
        }
    }
}

impl From<ExtractError> for CqmError {
    fn from(err: ExtractError) -> Self {
        CqmError::Logic {
            code: err.code(),
            message: err.to_string(),
            reference: err.reference().map(str::to_string),
        }
    }
}
