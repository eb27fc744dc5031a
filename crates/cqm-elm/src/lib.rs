//! ELM (Expression Logical Model) libraries of a measure package
//!
//! This crate provides:
//! - The library header structures the measure tooling reads (identifier,
//!   includes, code systems, value sets, codes, statements)
//! - Statement expressions kept as raw JSON trees for generic traversal
//! - JSON loading that accepts the `{"library": ...}` envelope and strips
//!   `urn:oid:` prefixes from terminology identifiers

pub mod model;
pub mod serialize;

pub use model::*;
pub use serialize::{JsonSerializer, SerializeError, deserialize_libraries, strip_oid_prefix};
