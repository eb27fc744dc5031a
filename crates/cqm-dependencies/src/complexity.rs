//! Logical branch counts per statement

use serde::{Deserialize, Serialize};
use serde_json::Value;

use cqm_elm::Library;

use crate::node::Node;

/// Complexity of one named statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatementComplexity {
    pub name: String,
    pub complexity: usize,
}

/// Count the logical branches of an expression
///
/// `And`/`Or`/`Not` contribute the count of their operands, a `Query` the
/// count of its `where` clause plus its relationships. Any other node is a
/// single branch; arrays sum their elements.
pub fn count_logical_branches(expression: &Value) -> usize {
    match Node::from(expression) {
        Node::Array(items) => items.iter().map(count_logical_branches).sum(),
        Node::Object(map) => match map.get("type").and_then(Value::as_str) {
            Some("And" | "Or" | "Not") => map.get("operand").map_or(0, count_logical_branches),
            Some("Query") => {
                map.get("where").map_or(0, count_logical_branches)
                    + map.get("relationship").map_or(0, count_logical_branches)
            }
            _ => 1,
        },
        Node::Scalar => 0,
    }
}

/// Complexity of every statement in `library`, in definition order
pub fn statement_complexity(library: &Library) -> Vec<StatementComplexity> {
    library
        .statements()
        .iter()
        .map(|statement| StatementComplexity {
            name: statement.name.clone(),
            complexity: count_logical_branches(&statement.expression),
        })
        .collect()
}
