//! ELM JSON loading
//!
//! Translated libraries arrive either as the bare library object or wrapped
//! in the standard `{"library": ...}` envelope. Terminology identifiers are
//! normalized on load: `urn:oid:` prefixes are stripped so value-set and
//! code-system ids compare equal to the OIDs used by HQMF data criteria.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use cqm_diagnostics::{CQM0001, CQM0002, CqmError};

use crate::model::{ElmDocument, Library};

const OID_PREFIX: &str = "urn:oid:";

/// Errors that can occur while loading ELM
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Library without an identifier id
    #[error("ELM library has an empty identifier")]
    MissingIdentifier,
}

impl From<SerializeError> for CqmError {
    fn from(err: SerializeError) -> Self {
        match err {
            SerializeError::Json(e) => CqmError::input(CQM0001, e.to_string()),
            SerializeError::MissingIdentifier => {
                CqmError::input(CQM0002, "ELM library has an empty identifier")
            }
        }
    }
}

/// Strip a leading `urn:oid:` from an identifier
pub fn strip_oid_prefix(id: &str) -> &str {
    id.strip_prefix(OID_PREFIX).unwrap_or(id)
}

/// JSON loader for ELM libraries
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonSerializer;

impl JsonSerializer {
    pub fn new() -> Self {
        Self
    }

    /// Deserialize a library from a string
    pub fn deserialize(&self, input: &str) -> Result<Library, SerializeError> {
        let value: Value = serde_json::from_str(input)?;
        self.deserialize_value(value)
    }

    /// Deserialize a library from an already parsed JSON value
    pub fn deserialize_value(&self, value: Value) -> Result<Library, SerializeError> {
        let mut library = if value.get("library").is_some() {
            serde_json::from_value::<ElmDocument>(value)?.library
        } else {
            serde_json::from_value::<Library>(value)?
        };

        if library.identifier.id.is_empty() {
            return Err(SerializeError::MissingIdentifier);
        }
        normalize_oids(&mut library);
        Ok(library)
    }

    /// Deserialize a document holding one library or a JSON array of them
    pub fn deserialize_many(&self, input: &str) -> Result<Vec<Library>, SerializeError> {
        match serde_json::from_str(input)? {
            Value::Array(values) => values
                .into_iter()
                .map(|value| self.deserialize_value(value))
                .collect(),
            value => Ok(vec![self.deserialize_value(value)?]),
        }
    }
}

/// Serde adapter loading each element of a library list through [`JsonSerializer`]
///
/// Use with `#[serde(deserialize_with = "cqm_elm::deserialize_libraries")]`.
pub fn deserialize_libraries<'de, D>(deserializer: D) -> Result<Vec<Library>, D::Error>
where
    D: Deserializer<'de>,
{
    let serializer = JsonSerializer::new();
    Vec::<Value>::deserialize(deserializer)?
        .into_iter()
        .map(|value| serializer.deserialize_value(value).map_err(serde::de::Error::custom))
        .collect()
}

fn normalize_oids(library: &mut Library) {
    if let Some(value_sets) = library.value_sets.as_mut() {
        for vs in &mut value_sets.defs {
            vs.id = strip_oid_prefix(&vs.id).to_string();
        }
    }
    if let Some(code_systems) = library.code_systems.as_mut() {
        for cs in &mut code_systems.defs {
            cs.id = strip_oid_prefix(&cs.id).to_string();
        }
    }
}
