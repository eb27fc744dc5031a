//! Terminology handling for measure loading
//!
//! - [`drc`]: content-addressed identities for codes referenced directly in CQL
//! - [`normalizer`]: assigning those identities to HQMF data criteria inline codes
//! - [`value_set`]: value set references and the catalogue used to display them
//! - [`code_system`]: code system name normalization

pub mod code_system;
pub mod drc;
pub mod normalizer;
pub mod value_set;

pub use code_system::{is_ignored_code_system, normalize_code_system_name};
pub use drc::{DRC_PREFIX, DirectReferenceCode, extract_direct_reference_codes};
pub use normalizer::{DrcAssignment, assign_direct_reference_code_ids, normalize_measure};
pub use value_set::{Concept, ValueSet, ValueSetCatalog, ValueSetReference, value_set_references};
