//! End-to-end pipeline tests
//! Parse, inventory, bind and emit through the backend-independent entry point

use cmdbridge::{Backend, Bridge, DispatchUnit, ParseCache};
use cmdbridge_core::{BindError, BridgeError};
use serde_json::{json, Value};

/// One statement per backend, each consuming exactly one argument.
fn single_placeholder_statements() -> Vec<(Backend, &'static str, Value)> {
    vec![
        (Backend::Elastic, "GET /users/_doc/?", json!("1")),
        (Backend::Mongo, "db.users.find({name: ?})", json!("ann")),
        (Backend::Redis, "GET ?", json!("k")),
        (Backend::Milvus, "SELECT * FROM c WHERE id = ?", json!(3)),
    ]
}

fn elastic_body(unit: &DispatchUnit) -> String {
    match unit {
        DispatchUnit::Elastic(request) => request.body.clone().unwrap_or_default(),
        other => panic!("expected an elastic request, got {:?}", other),
    }
}

// ==================== Inventory ====================

#[test]
fn test_inventory_is_idempotent() {
    let bridge = Bridge::new();
    for backend in Backend::ALL {
        let statement = match backend {
            Backend::Elastic => "PUT /?/_doc/1 {a: ?, b: [?]}",
            Backend::Mongo => "db.getCollection(?).find({a: ?, b: [?]})",
            Backend::Redis => "MSET ? ? ?",
            Backend::Milvus => "SELECT * FROM ? WHERE a = ? AND b IN [?]",
        };
        let result = bridge.parse(backend, statement);
        assert!(result.is_ok(), "{}: {:?}", backend, result.diagnostics);

        let first = bridge.inventory(backend, &result);
        let second = bridge.inventory(backend, &result);
        assert_eq!(first, second);
        assert_eq!(first.count(), 3, "{}", backend);
    }
}

#[test]
fn test_placeholder_kinds() {
    let bridge = Bridge::new();
    let result = bridge.parse(Backend::Elastic, "PUT /?/_doc/? {name: ?}");
    let inventory = bridge.inventory(Backend::Elastic, &result);
    assert_eq!(inventory.counts.command, 2);
    assert_eq!(inventory.counts.nested, 1);
}

// ==================== Binding ====================

#[test]
fn test_surplus_arguments_tolerated_by_default() {
    let bridge = Bridge::new();
    for (backend, statement, arg) in single_placeholder_statements() {
        let exact = bridge.execute(backend, statement, &[arg.clone()]).unwrap();
        let surplus = bridge.execute(backend, statement, &[arg, json!("extra")]).unwrap();
        assert_eq!(exact, surplus, "{}", backend);
    }
}

#[test]
fn test_surplus_arguments_rejected_when_strict() {
    let bridge = Bridge::new().with_strict_arguments(true);
    for (backend, statement, arg) in single_placeholder_statements() {
        assert!(bridge.execute(backend, statement, &[arg.clone()]).is_ok());
        let err = bridge.execute(backend, statement, &[arg, json!("extra")]).unwrap_err();
        assert!(
            matches!(err, BridgeError::Bind(BindError::ExtraArgument { expected: 1, supplied: 2 })),
            "{}: {:?}",
            backend,
            err
        );
    }
}

#[test]
fn test_missing_arguments() {
    let bridge = Bridge::new();
    for (backend, statement, _) in single_placeholder_statements() {
        let err = bridge.execute(backend, statement, &[]).unwrap_err();
        assert!(
            matches!(err, BridgeError::Bind(BindError::MissingArgument(1))),
            "{}: {:?}",
            backend,
            err
        );
    }
}

#[test]
fn test_cursor_is_shared_across_commands() {
    let bridge = Bridge::new();
    let units = bridge
        .execute(Backend::Redis, "SET a ?; SET b ?\nSET c ?", &[json!(1), json!(2), json!(3)])
        .unwrap();
    let last_args: Vec<String> = units
        .iter()
        .map(|unit| match unit {
            DispatchUnit::Redis(command) => command.args[1].clone(),
            other => panic!("unexpected unit {:?}", other),
        })
        .collect();
    assert_eq!(last_args, vec!["1", "2", "3"]);
}

// ==================== Literals ====================

#[test]
fn test_literal_coercion() {
    let bridge = Bridge::new();
    let units = bridge
        .execute(
            Backend::Elastic,
            r#"POST /c/_doc {i: 26, f: 26.0, e: 1e3, s: "26", t: true, n: null, neg: -4, big: 99999999999999999999}"#,
            &[],
        )
        .unwrap();
    let body: Value = serde_json::from_str(&elastic_body(&units[0])).unwrap();

    assert!(body["i"].is_i64());
    assert_eq!(body["i"], json!(26));
    assert!(body["f"].is_f64());
    assert_eq!(body["f"].as_f64(), Some(26.0));
    assert_eq!(body["e"].as_f64(), Some(1000.0));
    assert_eq!(body["s"], json!("26"));
    assert_eq!(body["t"], json!(true));
    assert!(body["n"].is_null());
    assert_eq!(body["neg"], json!(-4));
    assert_eq!(body["big"].as_f64(), Some(1e20));
}

#[test]
fn test_key_order_is_preserved() {
    let bridge = Bridge::new();
    let units = bridge
        .execute(Backend::Elastic, "POST /c/_doc {name: ?, age: ?}", &[json!("Ann"), json!(30)])
        .unwrap();
    assert_eq!(elastic_body(&units[0]), r#"{"name":"Ann","age":30}"#);
}

#[test]
fn test_placeholder_object_key() {
    let bridge = Bridge::new();
    let units = bridge
        .execute(Backend::Elastic, "POST /c/_doc {?: 1}", &[json!(42)])
        .unwrap();
    assert_eq!(elastic_body(&units[0]), r#"{"42":1}"#);

    let err = bridge
        .execute(Backend::Elastic, "POST /c/_doc {?: 1}", &[json!([1])])
        .unwrap_err();
    assert!(matches!(err, BridgeError::Emit(_)));
}

// ==================== Dispatch units ====================

#[test]
fn test_dispatch_units_are_tagged() {
    let bridge = Bridge::new();

    let redis = bridge.execute(Backend::Redis, "GET ?", &[json!("k")]).unwrap();
    assert_eq!(
        serde_json::to_value(&redis).unwrap(),
        json!([{"backend": "redis", "command": "GET", "args": ["k"]}])
    );

    let milvus = bridge.execute(Backend::Milvus, "SHOW COLLECTIONS", &[]).unwrap();
    assert_eq!(
        serde_json::to_value(&milvus).unwrap(),
        json!([{"backend": "milvus", "sql": "SHOW COLLECTIONS"}])
    );
}

#[test]
fn test_parse_failure_is_reported_not_emitted() {
    let bridge = Bridge::new();
    for backend in Backend::ALL {
        let statement = match backend {
            Backend::Redis => "'SET' k v",
            _ => "?? ((",
        };
        let result = bridge.parse(backend, statement);
        assert!(!result.is_ok(), "{}", backend);
        assert!(bridge.materialize_and_emit(backend, &result, &[]).is_err());
    }
}

// ==================== Cache ====================

#[test]
fn test_cached_parse_binds_fresh_arguments() {
    let bridge = Bridge::new().with_cache(ParseCache::new(8));
    let first = bridge.execute(Backend::Redis, "GET ?", &[json!("a")]).unwrap();
    let second = bridge.execute(Backend::Redis, "GET ?", &[json!("b")]).unwrap();

    assert_ne!(first, second);
    let stats = bridge.cache_stats().unwrap();
    assert_eq!(stats.entries, 1);
    assert_eq!(stats.hits, 1);
}

#[test]
fn test_cache_separates_backends() {
    let bridge = Bridge::new().with_cache(ParseCache::new(8));
    let statement = "SELECT * FROM c";
    bridge.parse(Backend::Redis, statement);
    let milvus = bridge.parse(Backend::Milvus, statement);
    assert!(milvus.is_ok());

    let stats = bridge.cache_stats().unwrap();
    assert_eq!(stats.entries, 2);
    assert_eq!(stats.misses, 2);
}
