use cmdbridge_core::{BridgeResult, MaterializedCommand, NativeFragment};
use serde::Serialize;
use serde_json::{Map, Value};

/// A statement with every literal substituted, ready for the server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MilvusQuery {
    pub sql: String,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub hints: Map<String, Value>,
}

pub fn emit_query(command: MaterializedCommand) -> BridgeResult<MilvusQuery> {
    let mut sql = String::new();
    for fragment in &command.target {
        match fragment {
            NativeFragment::Text(text) => sql.push_str(text),
            NativeFragment::Value(value) => render_literal(value, &mut sql),
        }
    }

    Ok(MilvusQuery {
        sql,
        hints: command.hints,
    })
}

/// Writes a value in filter-expression syntax: double-quoted strings, `[a, b]`
/// lists, JSON objects.
fn render_literal(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => {
            out.push('"');
            for ch in s.chars() {
                match ch {
                    '"' => out.push_str("\\\""),
                    '\\' => out.push_str("\\\\"),
                    c => out.push(c),
                }
            }
            out.push('"');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                render_literal(item, out);
            }
            out.push(']');
        }
        other => out.push_str(&other.to_string()),
    }
}
