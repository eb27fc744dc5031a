//! Diagnostics and error handling for measure processing
//!
//! This crate provides the error handling infrastructure shared by the ELM
//! dependency resolver, the terminology normalizer and the logic extractor:
//! numbered error codes, non-fatal diagnostics and the umbrella [`CqmError`].

mod error;
mod error_code;

pub use error::*;
pub use error_code::*;

/// Result type for measure processing operations
pub type Result<T> = std::result::Result<T, CqmError>;
