//! CQL statement dependency resolution
//!
//! Given the ELM libraries of a measure, this crate discovers which named
//! statements each statement transitively uses, across included libraries:
//!
//! - [`alias`]: include alias -> library name resolution
//! - [`resolver`]: the memoized depth-first walk producing a [`DependencyMap`]
//! - [`composite`]: merging component measures' ELM into a composite's pool
//! - [`complexity`]: logical branch counts per statement
//!
//! # Example
//!
//! ```ignore
//! use cqm_dependencies::resolve;
//!
//! let map = resolve("Main", &libraries)?;
//! for (library, statements) in &map {
//!     println!("{library}: {} statements", statements.len());
//! }
//! ```

pub mod alias;
pub mod complexity;
pub mod composite;
pub mod error;
pub mod node;
pub mod resolver;

pub use alias::alias_to_library_name;
pub use complexity::{StatementComplexity, count_logical_branches, statement_complexity};
pub use composite::{CompositeElm, ComponentMeasure, ElmPackage, merge_component_elm};
pub use error::{ResolutionError, ResolutionResult, StructureIssue};
pub use node::{Node, RefKind, StatementRef, collect_references};
pub use resolver::{
    DependencyMap, DependencyResolver, ResolutionCache, ResolverOptions, StatementDependencies,
    StatementReference, resolve,
};
