use super::parser::{has_endpoint, NDJSON_ENDPOINTS};
use cmdbridge_core::{canonical_string, BridgeError, BridgeResult, MaterializedCommand, NativeFragment};
use serde::Serialize;
use serde_json::{Map, Value};

pub const HINT_FIND_LIMIT: &str = "overwrite_find_limit";
pub const HINT_FIND_SKIP: &str = "overwrite_find_skip";

/// Path segments of requests that write documents.
const DOCUMENT_WRITE_ENDPOINTS: [&str; 5] = [
    "_doc",
    "_create",
    "_update",
    "_update_by_query",
    "_delete_by_query",
];

/// One HTTP request for the search engine.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElasticRequest {
    pub method: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(skip_serializing_if = "Map::is_empty")]
    pub hints: Map<String, Value>,
}

impl ElasticRequest {
    /// Parsed body for single-document requests.
    pub fn json_body(&self) -> Option<Value> {
        self.body.as_deref().and_then(|b| serde_json::from_str(b).ok())
    }
}

pub fn emit_request(command: MaterializedCommand, index_refresh: bool) -> BridgeResult<ElasticRequest> {
    let mut path = build_path(&command.target)?;

    if index_refresh && is_document_write(&command.verb, &path) && !has_query_param(&path, "refresh") {
        let separator = if path.contains('?') { '&' } else { '?' };
        path.push(separator);
        path.push_str("refresh=true");
    }

    let (limit, skip) = find_hints(&command.hints)?;

    let body = match command.body {
        None => None,
        Some(body) if has_endpoint(&path, &NDJSON_ENDPOINTS) => {
            let mut lines = ndjson_lines(body)?;
            if has_endpoint(&path, &["_msearch"]) {
                // Header and query lines alternate; only queries take size/from.
                for line in lines.iter_mut().skip(1).step_by(2) {
                    rewrite_window(line, limit, skip);
                }
            }
            let mut out = String::new();
            for line in &lines {
                out.push_str(&serde_json::to_string(line)?);
                out.push('\n');
            }
            Some(out)
        }
        Some(mut body) => {
            if has_endpoint(&path, &["_search"]) {
                rewrite_window(&mut body, limit, skip);
            }
            Some(serde_json::to_string(&body)?)
        }
    };

    Ok(ElasticRequest {
        method: command.verb,
        path,
        body,
        hints: command.hints,
    })
}

/// Joins path text with bound values. Values are percent-encoded.
fn build_path(target: &[NativeFragment]) -> BridgeResult<String> {
    let mut path = String::new();
    for fragment in target {
        match fragment {
            NativeFragment::Text(text) => path.push_str(text),
            NativeFragment::Value(value) => {
                let raw = canonical_string(value).ok_or_else(|| {
                    BridgeError::Emit(format!("path value must be a scalar, got {}", value))
                })?;
                let encoded: String = url::form_urlencoded::byte_serialize(raw.as_bytes()).collect();
                if path.contains('?') {
                    path.push_str(&encoded);
                } else {
                    path.push_str(&encoded.replace('+', "%20"));
                }
            }
        }
    }
    Ok(path)
}

/// Splits an NDJSON body into its lines. A single array, such as one
/// placeholder bound to every line, is the line list itself.
fn ndjson_lines(body: Value) -> BridgeResult<Vec<Value>> {
    let mut lines = match body {
        Value::Array(lines) => lines,
        other => vec![other],
    };
    if lines.len() == 1 && lines[0].is_array() {
        if let Some(Value::Array(inner)) = lines.pop() {
            lines = inner;
        }
    }
    if let Some(bad) = lines.iter().find(|line| !line.is_object()) {
        return Err(BridgeError::Emit(format!(
            "NDJSON line must be an object, got {}",
            bad
        )));
    }
    Ok(lines)
}

fn is_document_write(method: &str, path: &str) -> bool {
    matches!(method, "PUT" | "POST" | "DELETE") && has_endpoint(path, &DOCUMENT_WRITE_ENDPOINTS)
}

fn has_query_param(path: &str, name: &str) -> bool {
    path.split_once('?').is_some_and(|(_, query)| {
        url::form_urlencoded::parse(query.as_bytes()).any(|(k, _)| k == name)
    })
}

fn find_hints(hints: &Map<String, Value>) -> BridgeResult<(Option<i64>, Option<i64>)> {
    let limit = hints.get(HINT_FIND_LIMIT).map(|v| hint_number(HINT_FIND_LIMIT, v)).transpose()?;
    let skip = hints.get(HINT_FIND_SKIP).map(|v| hint_number(HINT_FIND_SKIP, v)).transpose()?;
    Ok((limit, skip))
}

/// Overwrites `size`/`from` of a search document from the find-limit hints.
fn rewrite_window(doc: &mut Value, limit: Option<i64>, skip: Option<i64>) {
    if let Value::Object(map) = doc {
        if let Some(limit) = limit {
            map.insert("size".to_string(), Value::from(limit));
        }
        if let Some(skip) = skip {
            map.insert("from".to_string(), Value::from(skip));
        }
    }
}

fn hint_number(name: &str, value: &Value) -> BridgeResult<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .ok_or_else(|| BridgeError::Emit(format!("hint {} expects an integer, got {}", name, value)))
}
