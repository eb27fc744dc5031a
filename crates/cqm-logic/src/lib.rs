//! Measure logic rendering and diffing
//!
//! [`LogicExtractor`] walks a measure's population criteria (preconditions,
//! data criteria, subset operators, temporal references) and renders one
//! ordered list of indented text lines per population. [`diff`] compares two
//! such renderings line by line, optionally population by population.
//!
//! # Example
//!
//! ```ignore
//! use cqm_logic::{LogicExtractor, diff_measure_logic};
//!
//! let current = LogicExtractor::new(&measure).measure_logic();
//! let prior = LogicExtractor::new(&previous).measure_logic();
//! let diff = diff_measure_logic(measure.cms_id.clone(), &current, &prior, true);
//! println!("{} insertions", diff.totals.insertions);
//! ```

pub mod diff;
pub mod error;
pub mod extractor;
pub mod tables;
pub mod value;

pub use diff::{
    ALL_POPULATIONS_CODE, DiffTotals, LineChange, LogicText, MeasureDiff, PopulationDiff, compute_diff,
    diff_measure_logic, measure_logic_text, population_logic_text, verify_populations,
};
pub use error::{ExtractError, ExtractResult};
pub use extractor::{
    ERROR_POPULATION_CODE, ExtractorOptions, LogicExtractor, MeasureLogic, PopulationLogic, VARIABLES_CODE, error_logic,
};
pub use value::value_logic;
