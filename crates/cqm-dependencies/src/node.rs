//! Generic traversal of ELM expression trees
//!
//! Statement expressions are heterogeneous JSON: objects nest arrays which
//! nest objects. Rather than special-casing each ELM node type, every value is
//! classified into one of three shapes and descended uniformly.

use serde_json::{Map, Value};

/// Shape of a JSON value during traversal
#[derive(Debug, Clone, Copy)]
pub enum Node<'a> {
    Object(&'a Map<String, Value>),
    Array(&'a [Value]),
    Scalar,
}

impl<'a> From<&'a Value> for Node<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Object(map) => Node::Object(map),
            Value::Array(items) => Node::Array(items),
            _ => Node::Scalar,
        }
    }
}

/// Kind of statement reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    /// `ExpressionRef`
    Expression,
    /// `FunctionRef`
    Function,
}

/// A reference to a named statement found inside an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementRef {
    pub kind: RefKind,
    /// Referenced statement name
    pub name: String,
    /// Include alias (`libraryName`), absent for same-library references
    pub library_alias: Option<String>,
}

impl StatementRef {
    fn from_object(map: &Map<String, Value>) -> Option<Self> {
        let kind = match map.get("type").and_then(Value::as_str)? {
            "ExpressionRef" => RefKind::Expression,
            "FunctionRef" => RefKind::Function,
            _ => return None,
        };
        let name = map.get("name").and_then(Value::as_str)?;
        let library_alias = map
            .get("libraryName")
            .and_then(Value::as_str)
            .filter(|alias| !alias.is_empty())
            .map(str::to_string);

        Some(Self {
            kind,
            name: name.to_string(),
            library_alias,
        })
    }
}

/// Collect every statement reference in pre-order
///
/// Reference nodes are descended too: a `FunctionRef`'s operands may
/// themselves reference statements.
pub fn collect_references(expression: &Value) -> Vec<StatementRef> {
    let mut refs = Vec::new();
    visit(expression, &mut refs);
    refs
}

fn visit(value: &Value, refs: &mut Vec<StatementRef>) {
    match Node::from(value) {
        Node::Object(map) => {
            if let Some(reference) = StatementRef::from_object(map) {
                refs.push(reference);
            }
            for child in map.values() {
                visit(child, refs);
            }
        }
        Node::Array(items) => {
            for item in items {
                visit(item, refs);
            }
        }
        Node::Scalar => {}
    }
}
