//! Backend-agnostic literal tree produced by every grammar.
//!
//! A [`ValueTree`] is what a command body (or any literal operand) parses
//! into. Placeholders are pure position markers here; they only receive a
//! value during materialization.

use serde_json::Value;

/// Where a `?` was found. Both kinds bind the same way and share one cursor;
/// the distinction only feeds the inventory counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlaceholderKind {
    /// Stands for a whole operand: a path segment, a command argument, a hint
    /// value or an entire body.
    Command,
    /// Sits inside an object or array literal.
    Nested,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectKey {
    Name(String),
    /// Key bound from an argument, stringified on materialization.
    Placeholder(PlaceholderKind),
}

#[derive(Debug, Clone, PartialEq)]
pub enum ValueTree {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Array(Vec<ValueTree>),
    /// Insertion ordered. Literal duplicate keys overwrite in place.
    Object(Vec<(ObjectKey, ValueTree)>),
    Placeholder(PlaceholderKind),
    /// Constructor call such as `ObjectId("...")`, resolved through a `FunctionTable`.
    Call { name: String, args: Vec<ValueTree> },
}

impl ValueTree {
    /// Classifies a numeric literal: anything with `.`, `e` or `E` is a float,
    /// as is an integer outside the `i64` range.
    pub fn from_number_literal(text: &str) -> Result<ValueTree, String> {
        if text.contains(['.', 'e', 'E']) {
            text.parse::<f64>()
                .map(ValueTree::Float)
                .map_err(|_| format!("invalid float literal: {}", text))
        } else {
            match text.parse::<i64>() {
                Ok(n) => Ok(ValueTree::Int(n)),
                // Beyond i64 the literal is still a JSON number.
                Err(_) => text
                    .parse::<f64>()
                    .map(ValueTree::Float)
                    .map_err(|_| format!("invalid integer literal: {}", text)),
            }
        }
    }

    pub fn object() -> ValueTree {
        ValueTree::Object(Vec::new())
    }

    /// Adds an entry to an object node. A literal key that already exists keeps
    /// its position and takes the new value.
    pub fn insert_entry(entries: &mut Vec<(ObjectKey, ValueTree)>, key: ObjectKey, value: ValueTree) {
        if let ObjectKey::Name(name) = &key {
            let existing = entries
                .iter_mut()
                .find(|(k, _)| matches!(k, ObjectKey::Name(n) if n == name));
            if let Some(entry) = existing {
                entry.1 = value;
                return;
            }
        }
        entries.push((key, value));
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, ValueTree::Placeholder(_))
    }

    /// Literal string content, if this node is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            ValueTree::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Looks up a literal key in an object node.
    pub fn get(&self, key: &str) -> Option<&ValueTree> {
        match self {
            ValueTree::Object(entries) => entries.iter().find_map(|(k, v)| match k {
                ObjectKey::Name(n) if n == key => Some(v),
                _ => None,
            }),
            _ => None,
        }
    }
}

/// Canonical string conversion for values bound into scalar-only positions
/// such as object keys and path segments.
///
/// Returns `None` for arrays and objects.
pub fn canonical_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Short type name for error messages.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
