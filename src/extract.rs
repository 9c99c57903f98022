//! Response shape extraction for option lists
//!
//! Upstream endpoints return option lists in a handful of known shapes:
//! either the body itself is a JSON array, or the array sits under a
//! well-known top-level field. Rules are tried in a fixed order and the
//! first match wins; two fields can both be present on one body, so the
//! order is load-bearing.

use serde_json::Value;

/// A single named extraction rule applied to a response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeRule {
    /// The body itself is the sequence.
    Body,
    /// The sequence lives under a named top-level field.
    Field(&'static str),
}

impl ShapeRule {
    /// Apply this rule, returning the matched sequence if any.
    pub fn extract<'a>(&self, body: &'a Value) -> Option<&'a Vec<Value>> {
        match self {
            ShapeRule::Body => body.as_array(),
            ShapeRule::Field(name) => body.get(*name).and_then(Value::as_array),
        }
    }

    /// Rule name for diagnostics.
    pub fn name(&self) -> &'static str {
        match *self {
            ShapeRule::Body => "body",
            ShapeRule::Field(name) => name,
        }
    }
}

/// Recognized response shapes, in precedence order.
pub const DEFAULT_RULES: &[ShapeRule] = &[
    ShapeRule::Body,
    ShapeRule::Field("results"),
    ShapeRule::Field("roles"),
    ShapeRule::Field("choices"),
    ShapeRule::Field("categories"),
    ShapeRule::Field("departments"),
    ShapeRule::Field("priorities"),
    ShapeRule::Field("statuses"),
    ShapeRule::Field("channels"),
];

/// Extract an option sequence from a response body using the default rules.
///
/// A body matching no rule yields an empty sequence; an unrecognized shape
/// is not an error.
pub fn extract_items(body: &Value) -> Vec<Value> {
    extract_with(DEFAULT_RULES, body)
}

/// Extract using a caller-supplied ordered rule list.
pub fn extract_with(rules: &[ShapeRule], body: &Value) -> Vec<Value> {
    for rule in rules {
        if let Some(items) = rule.extract(body) {
            return items.clone();
        }
    }
    Vec::new()
}
