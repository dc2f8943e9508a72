use super::parser::{ARGUMENTS_KEY, SHOW_VERB, USE_VERB};
use cmdbridge_core::{canonical_string, BridgeError, BridgeResult, MaterializedCommand};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// A database command document, addressed to `database` when one was
/// selected with `use`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MongoCommand {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<String>,
    pub command: Value,
}

/// Turns materialized shell calls into wire command documents.
///
/// `use` selects the database for the statements after it and produces no
/// command of its own.
pub fn emit_commands(
    commands: Vec<MaterializedCommand>,
    default_database: Option<String>,
) -> BridgeResult<Vec<MongoCommand>> {
    let mut database = default_database;
    let mut out = Vec::with_capacity(commands.len());

    for command in commands {
        let target = match command.target_values().next() {
            Some(value) => Some(name_string(value)?),
            None => None,
        };

        match command.verb.as_str() {
            USE_VERB => {
                database = target;
                continue;
            }
            SHOW_VERB => {
                let what = target.unwrap_or_default();
                let document = match what.as_str() {
                    "collections" | "tables" => json!({"listCollections": 1, "nameOnly": true}),
                    "dbs" | "databases" => json!({"listDatabases": 1, "nameOnly": true}),
                    other => {
                        return Err(BridgeError::Emit(format!("cannot show '{}'", other)));
                    }
                };
                out.push(MongoCommand {
                    database: database.clone(),
                    command: document,
                });
                continue;
            }
            _ => {}
        }

        let call = Call::from_command(&command);
        let document = match target {
            Some(collection) => collection_command(&command.verb, &collection, call)?,
            None => database_command(&command.verb, call)?,
        };
        out.push(MongoCommand {
            database: database.clone(),
            command: document,
        });
    }

    Ok(out)
}

fn name_string(value: &Value) -> BridgeResult<String> {
    match value {
        Value::Null => Err(BridgeError::Emit("name must not be null".to_string())),
        other => canonical_string(other)
            .ok_or_else(|| BridgeError::Emit(format!("name must be a string, got {}", other))),
    }
}

/// Call arguments plus trailing cursor modifiers.
struct Call {
    args: Vec<Value>,
    modifiers: Map<String, Value>,
}

impl Call {
    fn from_command(command: &MaterializedCommand) -> Self {
        let mut args = Vec::new();
        let mut modifiers = Map::new();
        if let Some(Value::Object(body)) = &command.body {
            for (key, value) in body {
                match (key.as_str(), value) {
                    (ARGUMENTS_KEY, Value::Array(items)) => args = items.clone(),
                    _ => {
                        modifiers.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        Self { args, modifiers }
    }

    fn arg(&self, i: usize) -> Option<&Value> {
        self.args.get(i)
    }

    fn document(&self, verb: &str, i: usize) -> BridgeResult<Map<String, Value>> {
        match self.arg(i) {
            None => Ok(Map::new()),
            Some(Value::Object(map)) => Ok(map.clone()),
            Some(other) => Err(BridgeError::Emit(format!(
                "{}() argument {} must be a document, got {}",
                verb,
                i + 1,
                other
            ))),
        }
    }
}

fn option_bool(options: &Map<String, Value>, key: &str) -> Option<bool> {
    options.get(key).and_then(Value::as_bool)
}

fn collection_command(verb: &str, collection: &str, call: Call) -> BridgeResult<Value> {
    let mut doc = Map::new();

    match verb {
        "find" | "findOne" => {
            doc.insert("find".into(), json!(collection));
            doc.insert("filter".into(), Value::Object(call.document(verb, 0)?));
            if let Some(projection) = call.arg(1) {
                doc.insert("projection".into(), projection.clone());
            }
            for (key, value) in &call.modifiers {
                doc.insert(key.clone(), value.clone());
            }
            if verb == "findOne" {
                doc.insert("limit".into(), json!(1));
                doc.insert("singleBatch".into(), json!(true));
            }
        }
        "insert" | "insertOne" | "insertMany" => {
            let documents = match call.arg(0) {
                Some(Value::Array(docs)) if verb != "insertOne" => docs.clone(),
                Some(Value::Object(d)) if verb != "insertMany" => vec![Value::Object(d.clone())],
                other => {
                    return Err(BridgeError::Emit(format!(
                        "{}() expects {}, got {}",
                        verb,
                        if verb == "insertMany" { "an array of documents" } else { "a document" },
                        other.cloned().unwrap_or(Value::Null)
                    )))
                }
            };
            if let Some(bad) = documents.iter().find(|d| !d.is_object()) {
                return Err(BridgeError::Emit(format!("{}() cannot insert {}", verb, bad)));
            }
            doc.insert("insert".into(), json!(collection));
            doc.insert("documents".into(), Value::Array(documents));
            let options = call.document(verb, 1)?;
            if let Some(ordered) = option_bool(&options, "ordered") {
                doc.insert("ordered".into(), json!(ordered));
            }
        }
        "update" | "updateOne" | "updateMany" | "replaceOne" => {
            let filter = call.document(verb, 0)?;
            let update = match call.arg(1) {
                Some(u @ Value::Object(_)) | Some(u @ Value::Array(_)) => u.clone(),
                other => {
                    return Err(BridgeError::Emit(format!(
                        "{}() expects an update document, got {}",
                        verb,
                        other.cloned().unwrap_or(Value::Null)
                    )))
                }
            };
            let options = call.document(verb, 2)?;
            let multi = match verb {
                "updateMany" => true,
                "update" => option_bool(&options, "multi").unwrap_or(false),
                _ => false,
            };
            let mut statement = Map::new();
            statement.insert("q".into(), Value::Object(filter));
            statement.insert("u".into(), update);
            statement.insert(
                "upsert".into(),
                json!(option_bool(&options, "upsert").unwrap_or(false)),
            );
            statement.insert("multi".into(), json!(multi));
            for key in ["arrayFilters", "collation", "hint"] {
                if let Some(v) = options.get(key) {
                    statement.insert(key.into(), v.clone());
                }
            }
            doc.insert("update".into(), json!(collection));
            doc.insert("updates".into(), json!([statement]));
        }
        "remove" | "deleteOne" | "deleteMany" => {
            let filter = call.document(verb, 0)?;
            let limit = match verb {
                "deleteOne" => 1,
                "deleteMany" => 0,
                _ => match call.arg(1) {
                    Some(Value::Bool(true)) => 1,
                    Some(Value::Object(o)) if o.get("justOne") == Some(&json!(true)) => 1,
                    _ => 0,
                },
            };
            doc.insert("delete".into(), json!(collection));
            doc.insert("deletes".into(), json!([{"q": filter, "limit": limit}]));
        }
        "count" | "countDocuments" => {
            doc.insert("count".into(), json!(collection));
            doc.insert("query".into(), Value::Object(call.document(verb, 0)?));
            for (key, value) in call.document(verb, 1)? {
                doc.insert(key, value);
            }
        }
        "distinct" => {
            let key = match call.arg(0) {
                Some(Value::String(k)) => k.clone(),
                other => {
                    return Err(BridgeError::Emit(format!(
                        "distinct() expects a field name, got {}",
                        other.cloned().unwrap_or(Value::Null)
                    )))
                }
            };
            doc.insert("distinct".into(), json!(collection));
            doc.insert("key".into(), json!(key));
            doc.insert("query".into(), Value::Object(call.document(verb, 1)?));
        }
        "aggregate" => {
            let pipeline = match call.arg(0) {
                Some(Value::Array(stages)) => stages.clone(),
                None => Vec::new(),
                Some(other) => {
                    return Err(BridgeError::Emit(format!(
                        "aggregate() expects a pipeline array, got {}",
                        other
                    )))
                }
            };
            doc.insert("aggregate".into(), json!(collection));
            doc.insert("pipeline".into(), Value::Array(pipeline));
            doc.insert("cursor".into(), json!({}));
            for (key, value) in call.document(verb, 1)? {
                doc.insert(key, value);
            }
        }
        "createIndex" => {
            let keys = call.document(verb, 0)?;
            let mut index = call.document(verb, 1)?;
            if !index.contains_key("name") {
                index.insert("name".into(), json!(index_name(&keys)));
            }
            index.insert("key".into(), Value::Object(keys));
            doc.insert("createIndexes".into(), json!(collection));
            doc.insert("indexes".into(), json!([index]));
        }
        "dropIndex" => {
            let index = call.arg(0).cloned().unwrap_or_else(|| json!("*"));
            doc.insert("dropIndexes".into(), json!(collection));
            doc.insert("index".into(), index);
        }
        "getIndexes" => {
            doc.insert("listIndexes".into(), json!(collection));
        }
        "drop" => {
            doc.insert("drop".into(), json!(collection));
        }
        other => {
            doc.insert(other.into(), json!(collection));
            doc.insert(ARGUMENTS_KEY.into(), Value::Array(call.args));
        }
    }

    Ok(Value::Object(doc))
}

fn database_command(verb: &str, call: Call) -> BridgeResult<Value> {
    let doc = match verb {
        "runCommand" | "adminCommand" => match call.arg(0) {
            Some(Value::Object(command)) => Value::Object(command.clone()),
            Some(Value::String(name)) => json!({ name.as_str(): 1 }),
            other => {
                return Err(BridgeError::Emit(format!(
                    "{}() expects a command document, got {}",
                    verb,
                    other.cloned().unwrap_or(Value::Null)
                )))
            }
        },
        "createCollection" => {
            let name = match call.arg(0) {
                Some(v) => name_string(v)?,
                None => return Err(BridgeError::Emit("createCollection() needs a name".to_string())),
            };
            let mut doc = Map::new();
            doc.insert("create".into(), json!(name));
            for (key, value) in call.document(verb, 1)? {
                doc.insert(key, value);
            }
            Value::Object(doc)
        }
        "dropDatabase" => json!({"dropDatabase": 1}),
        "getCollectionNames" | "listCollections" => json!({"listCollections": 1, "nameOnly": true}),
        "listDatabases" => json!({"listDatabases": 1}),
        other => json!({ other: 1, ARGUMENTS_KEY: call.args }),
    };
    Ok(doc)
}

/// Default index name as the server derives it: `field_dir` pairs joined by `_`.
fn index_name(keys: &Map<String, Value>) -> String {
    keys.iter()
        .map(|(field, dir)| {
            let dir = match dir {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!("{}_{}", field, dir)
        })
        .collect::<Vec<_>>()
        .join("_")
}
