//! Clinical quality measure logic processing for Rust
//!
//! This crate ties together the pieces needed to load an eCQM package:
//! - Statement dependency resolution across ELM libraries
//! - Composite measure ELM merging
//! - Direct reference code identities and data criteria normalization
//! - Human-readable population logic and line diffs between versions
//!
//! # Example
//!
//! ```ignore
//! use cqm::pipeline::MeasureLoader;
//!
//! let loaded = MeasureLoader::new("BreastCancerScreening", libraries)
//!     .with_measure(measure)
//!     .load()?;
//!
//! for population in &loaded.measure_logic {
//!     println!("{}", population.lines.concat());
//! }
//! ```

pub use cqm_dependencies as dependencies;
pub use cqm_diagnostics as diagnostics;
pub use cqm_elm as elm;
pub use cqm_hqmf as hqmf;
pub use cqm_logic as logic;
pub use cqm_terminology as terminology;

pub use cqm_dependencies::{DependencyMap, resolve};
pub use cqm_diagnostics::{CqmError, Diagnostic, Result};
pub use cqm_elm::Library;
pub use cqm_hqmf::Measure;

pub mod pipeline;

pub use pipeline::{LoadedMeasure, MeasureLoader};

// CLI module (only available with cli feature)
#[cfg(feature = "cli")]
pub mod cli;
