//! Literal constructor functions available inside value trees.
//!
//! A grammar that accepts calls such as `ObjectId("...")` owns a
//! [`FunctionTable`] and hands it to the materialization pass. There is no
//! process-wide registry.

use crate::error::{BridgeError, BridgeResult};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a value from already materialized arguments.
pub type LiteralFn = Arc<dyn Fn(&[Value]) -> Result<Value, String> + Send + Sync>;

/// Name lookup is case-insensitive.
#[derive(Clone, Default)]
pub struct FunctionTable {
    functions: HashMap<String, LiteralFn>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register<F>(&mut self, name: &str, f: F)
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.functions.insert(name.to_ascii_lowercase(), Arc::new(f));
    }

    /// Builder form of [`register`](Self::register).
    pub fn with<F>(mut self, name: &str, f: F) -> Self
    where
        F: Fn(&[Value]) -> Result<Value, String> + Send + Sync + 'static,
    {
        self.register(name, f);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(&name.to_ascii_lowercase())
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }

    pub fn call(&self, name: &str, args: &[Value]) -> BridgeResult<Value> {
        let f = self
            .functions
            .get(&name.to_ascii_lowercase())
            .ok_or_else(|| BridgeError::Function {
                name: name.to_string(),
                message: "unknown function".to_string(),
            })?;
        f(args).map_err(|message| BridgeError::Function {
            name: name.to_string(),
            message,
        })
    }
}

impl std::fmt::Debug for FunctionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&String> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("FunctionTable").field("functions", &names).finish()
    }
}
