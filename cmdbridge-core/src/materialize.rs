//! Document materialization pass.
//!
//! Second walk over the command tree. Every placeholder takes the next value
//! from the caller's ordered argument list (one shared cursor across all
//! commands of a statement) and every literal is copied into a native
//! `serde_json::Value`, preserving key order.

use crate::ast::{CommandNode, Fragment, ParseResult};
use crate::error::{BindError, BridgeError, BridgeResult};
use crate::functions::FunctionTable;
use crate::token::Position;
use crate::value::{canonical_string, type_name, ObjectKey, ValueTree};
use serde_json::{Map, Number, Value};

/// What to do with supplied arguments that no placeholder consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ExtraArguments {
    /// Ignore them, logging a warning.
    #[default]
    Tolerate,
    /// Fail with [`BindError::ExtraArgument`].
    Reject,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NativeFragment {
    Text(String),
    Value(Value),
}

/// A command with every placeholder resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterializedCommand {
    pub verb: String,
    pub target: Vec<NativeFragment>,
    pub hints: Map<String, Value>,
    pub body: Option<Value>,
    pub position: Position,
}

impl MaterializedCommand {
    /// Target values in order, skipping raw text fragments.
    pub fn target_values(&self) -> impl Iterator<Item = &Value> {
        self.target.iter().filter_map(|f| match f {
            NativeFragment::Value(v) => Some(v),
            NativeFragment::Text(_) => None,
        })
    }
}

struct Binder<'a> {
    args: &'a [Value],
    /// 1-based index of the next argument to consume.
    cursor: usize,
    functions: &'a FunctionTable,
}

impl<'a> Binder<'a> {
    fn new(args: &'a [Value], functions: &'a FunctionTable) -> Self {
        Self {
            args,
            cursor: 1,
            functions,
        }
    }

    fn consumed(&self) -> usize {
        self.cursor - 1
    }

    fn next_argument(&mut self) -> Result<Value, BindError> {
        let value = self
            .args
            .get(self.cursor - 1)
            .cloned()
            .ok_or(BindError::MissingArgument(self.cursor))?;
        self.cursor += 1;
        Ok(value)
    }

    fn command(&mut self, node: &CommandNode) -> BridgeResult<MaterializedCommand> {
        let mut hints = Map::new();
        for hint in &node.hints {
            let value = self.tree(&hint.value)?;
            hints.insert(hint.name.clone(), value);
        }

        let mut target = Vec::with_capacity(node.target.len());
        for fragment in &node.target {
            target.push(match fragment {
                Fragment::Text(text) => NativeFragment::Text(text.clone()),
                Fragment::Value(tree) => NativeFragment::Value(self.tree(tree)?),
            });
        }

        let body = match &node.body {
            Some(tree) => Some(self.tree(tree)?),
            None => None,
        };

        Ok(MaterializedCommand {
            verb: node.verb.clone(),
            target,
            hints,
            body,
            position: node.position,
        })
    }

    fn tree(&mut self, tree: &ValueTree) -> BridgeResult<Value> {
        Ok(match tree {
            ValueTree::Null => Value::Null,
            ValueTree::Bool(b) => Value::Bool(*b),
            ValueTree::Int(i) => Value::Number((*i).into()),
            ValueTree::Float(f) => Number::from_f64(*f).map(Value::Number).ok_or_else(|| {
                BridgeError::Emit(format!("float literal {} has no JSON representation", f))
            })?,
            ValueTree::Str(s) => Value::String(s.clone()),
            ValueTree::Placeholder(_) => self.next_argument()?,
            ValueTree::Array(items) => {
                let mut out = Vec::with_capacity(items.len());
                for item in items {
                    out.push(self.tree(item)?);
                }
                Value::Array(out)
            }
            ValueTree::Object(entries) => {
                let mut map = Map::new();
                for (key, value) in entries {
                    let key = match key {
                        ObjectKey::Name(name) => name.clone(),
                        ObjectKey::Placeholder(_) => {
                            let bound = self.next_argument()?;
                            canonical_string(&bound).ok_or_else(|| {
                                BridgeError::Emit(format!(
                                    "object key bound to {} value",
                                    type_name(&bound)
                                ))
                            })?
                        }
                    };
                    let value = self.tree(value)?;
                    map.insert(key, value);
                }
                Value::Object(map)
            }
            ValueTree::Call { name, args } => {
                let mut values = Vec::with_capacity(args.len());
                for arg in args {
                    values.push(self.tree(arg)?);
                }
                self.functions.call(name, &values)?
            }
        })
    }
}

/// Resolves every placeholder of a parsed statement against `args`.
///
/// Refuses to run on a result that carries diagnostics. Either every command
/// materializes or none does.
pub fn materialize(
    result: &ParseResult,
    args: &[Value],
    functions: &FunctionTable,
    extra: ExtraArguments,
) -> BridgeResult<Vec<MaterializedCommand>> {
    if let Some(diagnostic) = result.diagnostics.first() {
        return Err(diagnostic.clone().into());
    }

    let mut binder = Binder::new(args, functions);
    let mut commands = Vec::with_capacity(result.commands.len());
    for node in &result.commands {
        commands.push(binder.command(node)?);
    }

    let consumed = binder.consumed();
    if args.len() > consumed {
        match extra {
            ExtraArguments::Reject => {
                return Err(BindError::ExtraArgument {
                    expected: consumed,
                    supplied: args.len(),
                }
                .into())
            }
            ExtraArguments::Tolerate => {
                tracing::warn!(
                    expected = consumed,
                    supplied = args.len(),
                    "ignoring surplus arguments"
                );
            }
        }
    }

    tracing::debug!(
        commands = commands.len(),
        arguments = consumed,
        "materialized statement"
    );

    Ok(commands)
}
