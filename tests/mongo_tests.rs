//! Document-database backend tests
//! Shell calls, cursor modifiers, constructors and database selection

use cmdbridge::{Grammar, MongoCommand, MongoGrammar};
use cmdbridge_core::{BridgeError, DiagnosticKind};
use serde_json::{json, Value};

fn emit(grammar: &MongoGrammar, statement: &str, args: &[Value]) -> Vec<MongoCommand> {
    let result = grammar.parse(statement);
    assert!(result.is_ok(), "unexpected diagnostics: {:?}", result.diagnostics);
    grammar.materialize_and_emit(&result, args).unwrap()
}

// ==================== Queries ====================

#[test]
fn test_find_with_modifiers_and_arguments() {
    let grammar = MongoGrammar::new();
    let commands = emit(
        &grammar,
        "db.users.find({age: {$gt: ?}}, {name: 1}).sort({age: -1}).limit(?)",
        &[json!(30), json!(10)],
    );

    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].database, None);
    assert_eq!(
        commands[0].command,
        json!({
            "find": "users",
            "filter": {"age": {"$gt": 30}},
            "projection": {"name": 1},
            "sort": {"age": -1},
            "limit": 10
        })
    );
}

#[test]
fn test_find_one_limits_to_single_batch() {
    let grammar = MongoGrammar::new();
    let commands = emit(&grammar, "db.users.findOne({email: ?})", &[json!("a@b.c")]);
    assert_eq!(
        commands[0].command,
        json!({"find": "users", "filter": {"email": "a@b.c"}, "limit": 1, "singleBatch": true})
    );
}

#[test]
fn test_collection_placeholder() {
    let grammar = MongoGrammar::new();
    let commands = emit(
        &grammar,
        "db.getCollection(?).countDocuments({a: ?})",
        &[json!("logs"), json!(1)],
    );
    assert_eq!(commands[0].command, json!({"count": "logs", "query": {"a": 1}}));
}

#[test]
fn test_null_collection_name() {
    let grammar = MongoGrammar::new();
    let result = grammar.parse("db.getCollection(?).drop()");
    let err = grammar.materialize_and_emit(&result, &[Value::Null]).unwrap_err();
    assert!(matches!(err, BridgeError::Emit(_)));
}

// ==================== Writes ====================

#[test]
fn test_use_then_insert_with_constructors() {
    let grammar = MongoGrammar::new();
    let commands = emit(
        &grammar,
        "use shop\ndb.orders.insertOne({_id: ObjectId(?), placed: ISODate(?)})",
        &[json!("507f1f77bcf86cd799439011"), json!("2024-03-01")],
    );

    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].database.as_deref(), Some("shop"));
    assert_eq!(
        commands[0].command,
        json!({
            "insert": "orders",
            "documents": [{
                "_id": {"$oid": "507f1f77bcf86cd799439011"},
                "placed": {"$date": "2024-03-01T00:00:00.000Z"}
            }]
        })
    );
}

#[test]
fn test_bad_constructor_argument() {
    let grammar = MongoGrammar::new();
    let result = grammar.parse("db.c.find({_id: ObjectId(?)})");
    let err = grammar.materialize_and_emit(&result, &[json!("nope")]).unwrap_err();
    assert!(matches!(err, BridgeError::Function { ref name, .. } if name == "ObjectId"));
}

#[test]
fn test_update_many_and_delete_one() {
    let grammar = MongoGrammar::new();
    let commands = emit(
        &grammar,
        "db.users.updateMany({active: false}, {$set: {archived: ?}}, {upsert: true})\ndb.users.deleteOne({_id: ?})",
        &[json!(true), json!(5)],
    );

    assert_eq!(commands.len(), 2);
    assert_eq!(
        commands[0].command,
        json!({
            "update": "users",
            "updates": [{"q": {"active": false}, "u": {"$set": {"archived": true}}, "upsert": true, "multi": true}]
        })
    );
    assert_eq!(
        commands[1].command,
        json!({"delete": "users", "deletes": [{"q": {"_id": 5}, "limit": 1}]})
    );
}

#[test]
fn test_create_index_default_name() {
    let grammar = MongoGrammar::new();
    let commands = emit(&grammar, "db.users.createIndex({email: 1, age: -1}, {unique: true})", &[]);
    assert_eq!(
        commands[0].command,
        json!({
            "createIndexes": "users",
            "indexes": [{"unique": true, "name": "email_1_age_-1", "key": {"email": 1, "age": -1}}]
        })
    );
}

// ==================== Database ====================

#[test]
fn test_configured_database() {
    let grammar = MongoGrammar::new().with_database("app");
    let commands = emit(&grammar, "db.c.drop()", &[]);
    assert_eq!(
        serde_json::to_value(&commands[0]).unwrap(),
        json!({"database": "app", "command": {"drop": "c"}})
    );

    let unnamed = emit(&MongoGrammar::new(), "db.c.drop()", &[]);
    assert_eq!(
        serde_json::to_value(&unnamed[0]).unwrap(),
        json!({"command": {"drop": "c"}})
    );
}

#[test]
fn test_show_statements() {
    let grammar = MongoGrammar::new();
    let commands = emit(&grammar, "show dbs; show collections", &[]);
    assert_eq!(commands[0].command, json!({"listDatabases": 1, "nameOnly": true}));
    assert_eq!(commands[1].command, json!({"listCollections": 1, "nameOnly": true}));

    let result = grammar.parse("show users");
    assert!(matches!(
        grammar.materialize_and_emit(&result, &[]),
        Err(BridgeError::Emit(_))
    ));
}

#[test]
fn test_run_command() {
    let grammar = MongoGrammar::new();
    let commands = emit(&grammar, "db.runCommand({ping: 1}); db.runCommand('buildInfo')", &[]);
    assert_eq!(commands[0].command, json!({"ping": 1}));
    assert_eq!(commands[1].command, json!({"buildInfo": 1}));
}

// ==================== Statements ====================

#[test]
fn test_newline_separated_statements() {
    let grammar = MongoGrammar::new();
    let result = grammar.parse("db.a.find({x: ?})\ndb.b.find({y: ?})\n  .limit(?)");
    let inventory = grammar.inventory(&result);

    assert_eq!(inventory.command_count(), 2);
    assert_eq!(inventory.per_command, vec![1, 2]);
    assert_eq!(inventory.counts.nested, 2);
    assert_eq!(inventory.counts.command, 1);
}

#[test]
fn test_missing_value_position() {
    let grammar = MongoGrammar::new();
    let result = grammar.parse("db.c.insert({\"a\": })");

    assert_eq!(result.number_of_syntax_errors(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Syntax);
    assert_eq!(diagnostic.position.column, 19);
}

#[test]
fn test_cursor_method_on_write_is_rejected() {
    let grammar = MongoGrammar::new();
    let result = grammar.parse("db.c.deleteMany({a: ?}).limit(5)");

    assert_eq!(result.number_of_syntax_errors(), 1);
    let diagnostic = &result.diagnostics[0];
    assert_eq!(diagnostic.kind, DiagnosticKind::Syntax);
    assert_eq!(diagnostic.position.column, 25);
    assert!(grammar.materialize_and_emit(&result, &[json!(1)]).is_err());
}
