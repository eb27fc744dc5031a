//! ELM library structures
//!
//! Only the parts of the HL7 ELM schema that measure loading reads are typed.
//! Statement expressions stay as [`serde_json::Value`] trees: the dependency
//! resolver and the complexity counter walk them generically.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ============================================================================
// Library Structure
// ============================================================================

/// ELM Library - one compiled CQL library
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Library {
    /// Library identifier
    pub identifier: VersionedIdentifier,
    /// Include definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub includes: Option<IncludeDefs>,
    /// Code systems
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code_systems: Option<CodeSystemDefs>,
    /// Value sets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value_sets: Option<ValueSetDefs>,
    /// Codes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codes: Option<CodeDefs>,
    /// Statements (expression and function definitions)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub statements: Option<Statements>,
}

impl Library {
    /// Create a new empty library
    pub fn new(id: impl Into<String>, version: Option<impl Into<String>>) -> Self {
        Self {
            identifier: VersionedIdentifier {
                id: id.into(),
                version: version.map(Into::into),
            },
            includes: None,
            code_systems: None,
            value_sets: None,
            codes: None,
            statements: None,
        }
    }

    /// Library name (identifier id)
    pub fn name(&self) -> &str {
        &self.identifier.id
    }

    /// All include definitions
    pub fn includes(&self) -> &[IncludeDef] {
        self.includes.as_ref().map_or(&[], |i| i.defs.as_slice())
    }

    /// All code system definitions
    pub fn code_systems(&self) -> &[CodeSystemDef] {
        self.code_systems.as_ref().map_or(&[], |c| c.defs.as_slice())
    }

    /// All value set definitions
    pub fn value_sets(&self) -> &[ValueSetDef] {
        self.value_sets.as_ref().map_or(&[], |v| v.defs.as_slice())
    }

    /// All code definitions
    pub fn codes(&self) -> &[CodeDef] {
        self.codes.as_ref().map_or(&[], |c| c.defs.as_slice())
    }

    /// All statement definitions in declaration order
    pub fn statements(&self) -> &[ExpressionDef] {
        self.statements.as_ref().map_or(&[], |s| s.defs.as_slice())
    }

    /// Find the first statement with the given name
    pub fn statement(&self, name: &str) -> Option<&ExpressionDef> {
        self.statements().iter().find(|s| s.name == name)
    }

    /// Find an include by its local identifier (alias)
    pub fn include(&self, alias: &str) -> Option<&IncludeDef> {
        self.includes().iter().find(|i| i.local_identifier == alias)
    }

    /// Find a code system by its declared name
    pub fn code_system(&self, name: &str) -> Option<&CodeSystemDef> {
        self.code_systems().iter().find(|c| c.name == name)
    }

    /// Add an include definition
    pub fn with_include(mut self, alias: impl Into<String>, path: impl Into<String>) -> Self {
        self.includes
            .get_or_insert_with(|| IncludeDefs { defs: Vec::new() })
            .defs
            .push(IncludeDef {
                local_identifier: alias.into(),
                path: path.into(),
                version: None,
            });
        self
    }

    /// Add a statement definition
    pub fn with_statement(mut self, name: impl Into<String>, expression: Value) -> Self {
        self.statements
            .get_or_insert_with(|| Statements { defs: Vec::new() })
            .defs
            .push(ExpressionDef::new(name, expression));
        self
    }
}

/// Versioned identifier for libraries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VersionedIdentifier {
    /// Identifier
    pub id: String,
    /// Version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// JSON envelope of a translated library: `{"library": {...}}`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ElmDocument {
    pub library: Library,
}

/// Opaque annotation metadata per library, keyed by library name
///
/// Produced from the ELM XML export (library identifier plus source
/// locators); measure loading only carries it along.
pub type ElmAnnotations = IndexMap<String, Value>;

// ============================================================================
// Definition Containers
// ============================================================================

/// Container for include definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncludeDefs {
    #[serde(rename = "def", default)]
    pub defs: Vec<IncludeDef>,
}

/// Container for code system definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeSystemDefs {
    #[serde(rename = "def", default)]
    pub defs: Vec<CodeSystemDef>,
}

/// Container for value set definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueSetDefs {
    #[serde(rename = "def", default)]
    pub defs: Vec<ValueSetDef>,
}

/// Container for code definitions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CodeDefs {
    #[serde(rename = "def", default)]
    pub defs: Vec<CodeDef>,
}

/// Container for statements
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Statements {
    #[serde(rename = "def", default)]
    pub defs: Vec<ExpressionDef>,
}

// ============================================================================
// Definitions
// ============================================================================

/// Include definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncludeDef {
    /// Local identifier (alias used inside expressions)
    pub local_identifier: String,
    /// Library path (the included library's name)
    pub path: String,
    /// Library version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Code system definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemDef {
    /// Name
    pub name: String,
    /// Code system identifier (OID or URI)
    pub id: String,
    /// Version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Value set definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueSetDef {
    /// Name
    pub name: String,
    /// Value set identifier (OID)
    pub id: String,
    /// Version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    /// Expansion profile
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile: Option<String>,
}

/// Code definition (a direct reference code)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeDef {
    /// Name
    pub name: String,
    /// The code itself
    pub id: String,
    /// Display text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
    /// Code system reference
    pub code_system: CodeSystemRef,
}

/// Reference to a code system definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeSystemRef {
    /// Code system name
    pub name: String,
    /// Library alias, when the code system lives in an included library
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub library_name: Option<String>,
}

/// Expression or function definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpressionDef {
    /// Name
    pub name: String,
    /// Definition kind (`ExpressionDef`, `FunctionDef`)
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    /// Context (`Patient`, `Unfiltered`, ...)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Access level
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<String>,
    /// Expression tree
    #[serde(default)]
    pub expression: Value,
}

impl ExpressionDef {
    /// Create a new expression definition
    pub fn new(name: impl Into<String>, expression: Value) -> Self {
        Self {
            name: name.into(),
            kind: None,
            context: None,
            access_level: None,
            expression,
        }
    }

    /// Whether this is a function definition
    pub fn is_function(&self) -> bool {
        self.kind.as_deref() == Some("FunctionDef")
    }
}
