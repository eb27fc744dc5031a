//! HQMF/QDM measure model
//!
//! The parsed shape of a measure as produced by the HQMF/CQL parser and
//! persisted by the measure store: population criteria built from nested
//! preconditions, and data criteria describing clinical facts. Fields the
//! measure tooling does not interpret are preserved verbatim so a measure
//! can be rewritten (e.g. by the terminology normalizer) without loss.

pub mod criteria;
pub mod measure;
pub mod value;

pub use criteria::{DataCriteria, InlineCodeList, SubsetOperator, TemporalReference};
pub use measure::{
    ALL_POPULATION_CODES, MEASURE_PERIOD_REFERENCE, Measure, PopulationCriteria, Precondition,
    PreconditionNode,
};
pub use value::{CriteriaValue, value_types};
